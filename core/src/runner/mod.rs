mod cancel;
mod io_pump;
mod run;
mod traits;
pub mod types;

pub use cancel::CancelSignal;
pub use io_pump::{LineStream, LineTap};
pub use run::{run_command, RunCommandArgs, RunOptions};
pub use traits::{ProcessRunner, ProcessSession};
pub use types::{
    CommandInvocation, RunOutcome, RunStatus, CANCELLED_EXIT_CODE, LAUNCH_FAILED_EXIT_CODE,
    TIMED_OUT_EXIT_CODE,
};
