//! Power, volume, media and "open" operations with per-OS command tables.

use std::path::PathBuf;

use serde::Deserialize;
use vdock_core::{run_with_timeout, ActionConfig, ActionResult, ErrorCode, ProcessError};

use crate::actions::hotkey::press_keys;
use crate::actions::url::normalize_url;
use crate::error::ActionError;
use crate::handler::{describe_field, flag, parse_settings, title_case, ActionHandler};
use crate::host::{Key, NamedKey};
use crate::services::Services;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Operation {
    Shutdown,
    Restart,
    Sleep,
    LockScreen,
    VolumeUp,
    VolumeDown,
    VolumeMute,
    VolumeUnmute,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,
    MediaStop,
    OpenUrl,
    OpenFolder,
    OpenFile,
}

impl Operation {
    /// Operations that end or suspend the session.
    fn is_power(self) -> bool {
        matches!(
            self,
            Operation::Shutdown | Operation::Restart | Operation::Sleep | Operation::LockScreen
        )
    }
}

fn default_step() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
struct Settings {
    action: Operation,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    path: Option<PathBuf>,
    /// Volume step in percent.
    #[serde(default = "default_step")]
    step: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Os {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Os {
    fn current() -> Self {
        if cfg!(windows) {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else if cfg!(target_os = "linux") {
            Os::Linux
        } else {
            Os::Other
        }
    }
}

/// How an operation is carried out on a given OS.
#[derive(Debug, PartialEq)]
enum Plan {
    /// Try each argv in turn until one succeeds.
    Run(Vec<Vec<String>>),
    MediaKey(NamedKey),
    Open(String),
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

fn osascript(script: &str) -> Vec<String> {
    argv(&["osascript", "-e", script])
}

/// Media key sent for a volume or media operation on hosts without a
/// command-line mixer.
fn media_key(op: Operation) -> Option<NamedKey> {
    match op {
        Operation::VolumeUp => Some(NamedKey::VolumeUp),
        Operation::VolumeDown => Some(NamedKey::VolumeDown),
        Operation::VolumeMute | Operation::VolumeUnmute => Some(NamedKey::VolumeMute),
        Operation::MediaPlayPause => Some(NamedKey::MediaPlayPause),
        Operation::MediaNext => Some(NamedKey::MediaNext),
        Operation::MediaPrevious => Some(NamedKey::MediaPrevious),
        Operation::MediaStop => Some(NamedKey::MediaStop),
        _ => None,
    }
}

fn command_plan(op: Operation, step: u32, os: Os) -> Option<Vec<Vec<String>>> {
    let plan = match (os, op) {
        (Os::Windows, Operation::Shutdown) => vec![argv(&["shutdown", "/s", "/t", "0"])],
        (Os::Windows, Operation::Restart) => vec![argv(&["shutdown", "/r", "/t", "0"])],
        (Os::Windows, Operation::Sleep) => {
            vec![argv(&["rundll32.exe", "powrprof.dll,SetSuspendState", "0,1,0"])]
        }
        (Os::Windows, Operation::LockScreen) => {
            vec![argv(&["rundll32.exe", "user32.dll,LockWorkStation"])]
        }

        (Os::MacOs, Operation::Shutdown) => {
            vec![osascript("tell application \"System Events\" to shut down")]
        }
        (Os::MacOs, Operation::Restart) => {
            vec![osascript("tell application \"System Events\" to restart")]
        }
        (Os::MacOs, Operation::Sleep) => vec![argv(&["pmset", "sleepnow"])],
        (Os::MacOs, Operation::LockScreen) => vec![argv(&["pmset", "displaysleepnow"])],
        (Os::MacOs, Operation::VolumeUp) => vec![osascript(&format!(
            "set volume output volume (output volume of (get volume settings) + {step})"
        ))],
        (Os::MacOs, Operation::VolumeDown) => vec![osascript(&format!(
            "set volume output volume (output volume of (get volume settings) - {step})"
        ))],
        (Os::MacOs, Operation::VolumeMute) => vec![osascript("set volume with output muted")],
        (Os::MacOs, Operation::VolumeUnmute) => {
            vec![osascript("set volume without output muted")]
        }
        (Os::MacOs, Operation::MediaPlayPause) => {
            vec![osascript("tell application \"Music\" to playpause")]
        }
        (Os::MacOs, Operation::MediaNext) => {
            vec![osascript("tell application \"Music\" to next track")]
        }
        (Os::MacOs, Operation::MediaPrevious) => {
            vec![osascript("tell application \"Music\" to previous track")]
        }
        (Os::MacOs, Operation::MediaStop) => vec![osascript("tell application \"Music\" to stop")],

        (Os::Linux, Operation::Shutdown) => vec![argv(&["systemctl", "poweroff"])],
        (Os::Linux, Operation::Restart) => vec![argv(&["systemctl", "reboot"])],
        (Os::Linux, Operation::Sleep) => vec![argv(&["systemctl", "suspend"])],
        (Os::Linux, Operation::LockScreen) => vec![
            argv(&["loginctl", "lock-session"]),
            argv(&["xdg-screensaver", "lock"]),
        ],
        (Os::Linux, Operation::VolumeUp) => {
            vec![argv(&["amixer", "set", "Master", &format!("{step}%+")])]
        }
        (Os::Linux, Operation::VolumeDown) => {
            vec![argv(&["amixer", "set", "Master", &format!("{step}%-")])]
        }
        (Os::Linux, Operation::VolumeMute) => vec![argv(&["amixer", "set", "Master", "mute"])],
        (Os::Linux, Operation::VolumeUnmute) => {
            vec![argv(&["amixer", "set", "Master", "unmute"])]
        }
        (Os::Linux, Operation::MediaPlayPause) => vec![argv(&["playerctl", "play-pause"])],
        (Os::Linux, Operation::MediaNext) => vec![argv(&["playerctl", "next"])],
        (Os::Linux, Operation::MediaPrevious) => vec![argv(&["playerctl", "previous"])],
        (Os::Linux, Operation::MediaStop) => vec![argv(&["playerctl", "stop"])],

        _ => return None,
    };
    Some(plan)
}

fn plan_for(settings: &Settings, os: Os) -> Result<Plan, ActionError> {
    let op = settings.action;
    match op {
        Operation::OpenUrl => {
            let url = settings.url.as_deref().ok_or(ActionError::MissingField("url"))?;
            return Ok(Plan::Open(normalize_url(url)?));
        }
        Operation::OpenFolder | Operation::OpenFile => {
            let path = settings.path.as_ref().ok_or(ActionError::MissingField("path"))?;
            return Ok(Plan::Open(path.display().to_string()));
        }
        _ => {}
    }

    if let Some(commands) = command_plan(op, settings.step, os) {
        return Ok(Plan::Run(commands));
    }
    // Windows has no stock mixer CLI; fall back to media keys there
    match (os, media_key(op)) {
        (Os::Windows, Some(key)) => Ok(Plan::MediaKey(key)),
        _ => Err(ActionError::Unsupported(title_case(&format!("{op:?}")))),
    }
}

/// Handles `cross_platform` descriptors.
///
/// Power operations honour the command policy's confirmation requirement.
pub struct CrossPlatformAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> CrossPlatformAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn settings(&self) -> Result<Settings, ActionError> {
        let settings: Settings = parse_settings(&self.config)?;
        match settings.action {
            Operation::OpenUrl => {
                let url = settings.url.as_deref().ok_or(ActionError::MissingField("url"))?;
                normalize_url(url)?;
            }
            Operation::OpenFolder | Operation::OpenFile if settings.path.is_none() => {
                return Err(ActionError::MissingField("path"));
            }
            _ => {}
        }
        Ok(settings)
    }

    fn run(&self) -> Result<ActionResult, ActionError> {
        let settings = self.settings()?;
        let op = settings.action;
        let name = describe_field(&self.config, "action");

        if op.is_power()
            && self.services.commands.read().require_confirmation
            && !flag(&self.config, "confirmed")
        {
            return Ok(ActionResult::failure(format!("{} requires confirmation", title_case(name)))
                .with_entry("requires_confirmation", true)
                .with_entry("action", name));
        }

        if let Some(path) = &settings.path {
            match op {
                Operation::OpenFolder if !path.is_dir() => {
                    return Err(ActionError::PathNotFound(path.display().to_string()));
                }
                Operation::OpenFile if !path.is_file() => {
                    return Err(ActionError::PathNotFound(path.display().to_string()));
                }
                _ => {}
            }
        }

        match plan_for(&settings, Os::current())? {
            Plan::Open(target) => {
                self.services
                    .launcher
                    .open(&target)
                    .map_err(|source| ActionError::Open {
                        target: target.clone(),
                        source,
                    })?;
                Ok(ActionResult::ok(format!("Opened: {target}")))
            }
            Plan::MediaKey(key) => {
                press_keys(self.services, &[Key::Named(key)], self.services.composite.key_delay())?;
                Ok(ActionResult::ok(format!("{} sent", title_case(name))))
            }
            Plan::Run(commands) => Ok(self.run_first(name, &commands)),
        }
    }

    /// Run the first alternative that starts; later ones are fallbacks for
    /// programs that are missing or fail.
    fn run_first(&self, name: &str, commands: &[Vec<String>]) -> ActionResult {
        let timeout = self.services.commands.read().timeout();
        let mut last = ActionResult::failure(format!("{} is not available", title_case(name)));

        for argv in commands {
            last = match run_with_timeout(argv, timeout, None) {
                Ok(output) if output.success() => {
                    tracing::info!(action = name, program = %argv[0], "Cross-platform action done");
                    return ActionResult::ok(format!("{} executed", title_case(name)));
                }
                Ok(output) => {
                    let detail = if output.stderr.trim().is_empty() {
                        output.stdout
                    } else {
                        output.stderr
                    };
                    ActionResult::failure(format!("Command failed: {}", detail.trim()))
                        .with_code(ErrorCode::SystemCommandFailed)
                        .with_entry("returncode", output.exit_code)
                }
                Err(e @ ProcessError::TimedOut { .. }) => {
                    return ActionResult::failure(e.to_string())
                        .with_code(ErrorCode::ActionTimeout)
                        .with_entry("timed_out", true);
                }
                Err(e) => ActionError::Process(e).into(),
            };
        }
        last
    }
}

impl ActionHandler for CrossPlatformAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.settings().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        self.run().unwrap_or_else(ActionResult::from)
    }

    fn describe(&self) -> String {
        format!(
            "Cross-platform: {}",
            title_case(describe_field(&self.config, "action"))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::Launch;
    use crate::services::testing::Harness;
    use serde_json::json;
    use vdock_core::CommandPolicy;

    fn config(value: serde_json::Value) -> ActionConfig {
        value.as_object().cloned().unwrap()
    }

    fn settings(value: serde_json::Value) -> Settings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_power_plans_per_os() {
        let shutdown = settings(json!({"action": "shutdown"}));
        assert_eq!(
            plan_for(&shutdown, Os::Windows).unwrap(),
            Plan::Run(vec![argv(&["shutdown", "/s", "/t", "0"])])
        );
        assert_eq!(
            plan_for(&shutdown, Os::Linux).unwrap(),
            Plan::Run(vec![argv(&["systemctl", "poweroff"])])
        );
        assert!(plan_for(&shutdown, Os::Other).is_err());
    }

    #[test]
    fn test_lock_screen_has_fallback_on_linux() {
        let lock = settings(json!({"action": "lock_screen"}));
        let Plan::Run(commands) = plan_for(&lock, Os::Linux).unwrap() else {
            panic!("expected commands");
        };
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn test_volume_step() {
        let up = settings(json!({"action": "volume_up", "step": 5}));
        assert_eq!(
            plan_for(&up, Os::Linux).unwrap(),
            Plan::Run(vec![argv(&["amixer", "set", "Master", "5%+"])])
        );
        assert_eq!(plan_for(&up, Os::Windows).unwrap(), Plan::MediaKey(NamedKey::VolumeUp));
    }

    #[test]
    fn test_power_requires_confirmation() {
        let harness = Harness::with_policy(CommandPolicy::default());
        let action =
            CrossPlatformAction::new(config(json!({"action": "shutdown"})), &harness.services);
        assert!(action.validate().is_ok());
        let result = action.execute();
        assert!(!result.success);
        assert_eq!(result.message, "Shutdown requires confirmation");
        assert_eq!(result.data["requires_confirmation"], true);
    }

    #[test]
    fn test_open_url_through_launcher() {
        let harness = Harness::new();
        let action = CrossPlatformAction::new(
            config(json!({"action": "open_url", "url": "example.com"})),
            &harness.services,
        );
        let result = action.execute();
        assert!(result.success, "{}", result.message);
        assert_eq!(
            harness.launcher.launches(),
            vec![Launch::Open("https://example.com".into())]
        );
    }

    #[test]
    fn test_open_folder_must_exist() {
        let harness = Harness::new();
        let action = CrossPlatformAction::new(
            config(json!({"action": "open_folder", "path": "/definitely/not/here"})),
            &harness.services,
        );
        let result = action.execute();
        assert!(!result.success);
        assert_eq!(result.error_code, Some(2100));

        let dir = tempfile::tempdir().unwrap();
        let action = CrossPlatformAction::new(
            config(json!({"action": "open_folder", "path": dir.path()})),
            &harness.services,
        );
        assert!(action.execute().success);
    }

    #[test]
    fn test_validation() {
        let harness = Harness::new();
        let invalid = [
            json!({}),
            json!({"action": "brightness_up"}),
            json!({"action": "open_url"}),
            json!({"action": "open_url", "url": "javascript:alert(1)"}),
            json!({"action": "open_file"}),
        ];
        for value in invalid {
            let action = CrossPlatformAction::new(config(value.clone()), &harness.services);
            assert!(action.validate().is_err(), "{value}");
        }
    }

    #[test]
    fn test_describe() {
        let harness = Harness::new();
        let action =
            CrossPlatformAction::new(config(json!({"action": "lock_screen"})), &harness.services);
        assert_eq!(action.describe(), "Cross-platform: Lock Screen");
    }
}
