use clap::Parser;
mod app;
mod commands;
use commands::cli;
use llvm_tasks_core::api as core_api;
use llvm_tasks_core::error;
use llvm_tasks_core::runner::CancelSignal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, error::CliError> {
    let args = cli::Args::parse();
    let mut cfg = match &args.config {
        Some(path) => {
            let mut cfg = core_api::load_file(path)
                .map_err(|e| error::CliError::Config(e.to_string()))?;
            core_api::apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
            cfg
        }
        None => core_api::load_default().map_err(|e| error::CliError::Config(e.to_string()))?,
    };
    if let Some(n) = args.max_parallel {
        cfg.runner.max_parallel = n;
    }
    if let Some(ms) = args.timeout_ms {
        cfg.runner.timeout_ms = Some(ms);
    }
    init_tracing(&cfg.logging).map_err(error::CliError::Config)?;

    let cancel = CancelSignal::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling running tools");
            on_interrupt.cancel();
        }
    });

    let runner = llvm_tasks_plugins::factory::build_runner(&cfg);
    let ctx = core_api::TaskContext::new(cfg, runner).with_cancel(cancel);

    app::run_app(&args, &ctx).await
}

fn exit_code_for_error(e: &error::CliError) -> i32 {
    // 0: success
    // 1: a task failed (returned as a normal exit code, not as an error)
    // 11: config / plan error
    // 20: IO error while reporting
    // 50: internal/uncategorized
    match e {
        error::CliError::Config(_) => 11,
        error::CliError::Plan(_) => 11,
        error::CliError::Io(_) => 20,
        error::CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        // The build log is printed on stdout; keep it off the diagnostics stream.
        _ => EnvFilter::try_new(logging.level.clone())
            .map_err(|e| e.to_string())?
            .add_directive(
                "llvm_tasks::build=off"
                    .parse()
                    .map_err(|e| format!("invalid log directive: {e}"))?,
            ),
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("llvm-tasks"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("llvm-tasks.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
