use async_trait::async_trait;

use crate::context::TaskContext;
use crate::error::TaskError;

use super::{PropertyValue, Task, TaskKind, TaskOutputs};

/// `Windows`, `Linux`, `OSX`, or the raw `std::env::consts::OS` name.
pub fn current_os_family() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "linux" => "Linux",
        "macos" => "OSX",
        other => other,
    }
}

/// Reports the host OS family as the `OSFamily` output.
#[derive(Debug, Clone, Default)]
pub struct OsFamilyTask {
    family: Option<&'static str>,
}

impl OsFamilyTask {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Task for OsFamilyTask {
    fn kind(&self) -> TaskKind {
        TaskKind::OsFamily
    }

    fn set_property(&mut self, name: &str, _value: PropertyValue) -> Result<(), TaskError> {
        Err(TaskError::UnknownProperty {
            task: "OsFamily",
            name: name.to_string(),
        })
    }

    async fn execute(&mut self, ctx: &TaskContext) -> bool {
        let family = current_os_family();
        ctx.log().info(format!("OS family: {family}"));
        self.family = Some(family);
        true
    }

    fn outputs(&self) -> TaskOutputs {
        let mut out = TaskOutputs::new();
        if let Some(family) = self.family {
            out.insert("OSFamily".to_string(), PropertyValue::from(family));
        }
        out
    }
}
