//! Launch a program detached from the engine.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vdock_core::{ActionConfig, ActionResult};

use crate::error::ActionError;
use crate::handler::{finish, parse_settings, ActionHandler};
use crate::services::Services;

#[derive(Debug, Deserialize)]
struct ProgramSettings {
    path: PathBuf,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    working_dir: Option<PathBuf>,
}

/// Starts the program at `path` with optional `args` and `working_dir`.
pub struct ProgramAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> ProgramAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn settings(&self) -> Result<ProgramSettings, ActionError> {
        let settings: ProgramSettings = parse_settings(&self.config)?;
        if settings.path.as_os_str().is_empty() {
            return Err(ActionError::MissingField("path"));
        }
        Ok(settings)
    }

    fn run(&self) -> Result<ActionResult, ActionError> {
        let settings = self.settings()?;
        if !settings.path.exists() {
            return Err(ActionError::PathNotFound(settings.path.display().to_string()));
        }
        if let Some(dir) = settings.working_dir.as_deref().filter(|d| !d.is_dir()) {
            return Err(ActionError::InvalidConfig(format!(
                "Working directory does not exist: {}",
                dir.display()
            )));
        }

        let pid = self
            .services
            .launcher
            .spawn(&settings.path, &settings.args, settings.working_dir.as_deref())
            .map_err(|source| ActionError::Launch {
                target: settings.path.display().to_string(),
                source,
            })?;

        let name = file_name(&settings.path);
        tracing::info!(program = %settings.path.display(), pid, "Launched program");
        Ok(ActionResult::ok(format!("Launched: {name}")).with_entry("pid", pid))
    }
}

impl ActionHandler for ProgramAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.settings().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        finish(self.run())
    }

    fn describe(&self) -> String {
        let path = self
            .config
            .get("path")
            .and_then(|v| v.as_str())
            .map(|p| file_name(Path::new(p)))
            .unwrap_or_else(|| "unknown".to_string());
        format!("Launch: {path}")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{Launch, RecordingLauncher};
    use crate::services::testing::Harness;
    use serde_json::json;
    use std::sync::Arc;

    fn config(value: serde_json::Value) -> ActionConfig {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_launches_existing_program() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("tool");
        std::fs::write(&program, "").unwrap();

        let harness = Harness::new();
        let action = ProgramAction::new(
            config(json!({
                "path": program,
                "args": ["--flag", "two words"],
                "working_dir": dir.path()
            })),
            &harness.services,
        );
        let result = action.execute();
        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "Launched: tool");
        assert_eq!(result.data["pid"], 4242);
        assert_eq!(
            harness.launcher.launches(),
            vec![Launch::Spawn {
                program: program.clone(),
                args: vec!["--flag".into(), "two words".into()],
                cwd: Some(dir.path().to_path_buf()),
            }]
        );
    }

    #[test]
    fn test_missing_path_is_reported() {
        let harness = Harness::new();
        let action = ProgramAction::new(
            config(json!({"path": "/definitely/not/here"})),
            &harness.services,
        );
        assert!(action.validate().is_ok());
        let result = action.execute();
        assert!(!result.success);
        assert_eq!(result.message, "Path does not exist: /definitely/not/here");
        assert_eq!(result.error_code, Some(2100));
        assert!(harness.launcher.launches().is_empty());
    }

    #[test]
    fn test_validation() {
        let harness = Harness::new();
        assert!(ProgramAction::new(config(json!({})), &harness.services).validate().is_err());
        assert!(ProgramAction::new(config(json!({"path": ""})), &harness.services)
            .validate()
            .is_err());
        assert!(ProgramAction::new(config(json!({"path": "/bin/x", "args": "nope"})), &harness.services)
            .validate()
            .is_err());
    }

    #[test]
    fn test_permission_denied_code() {
        let dir = tempfile::tempdir().unwrap();
        let harness = Harness::new();
        let services = harness.services.clone().with_launcher(Arc::new(RecordingLauncher {
            fail: true,
            ..Default::default()
        }));
        let result = ProgramAction::new(config(json!({"path": dir.path()})), &services).execute();
        assert!(!result.success);
        assert_eq!(result.error_code, Some(2102));
    }

    #[test]
    fn test_describe_uses_file_name() {
        let harness = Harness::new();
        let action = ProgramAction::new(config(json!({"path": "/usr/bin/firefox"})), &harness.services);
        assert_eq!(action.describe(), "Launch: firefox");
    }
}
