//! Command-line surface of the `vdock` binary.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use vdock_core::{config_file_path, ActionDescriptor, ActionResult, EngineConfig, ErrorCode};

use crate::engine::Engine;

#[derive(Parser, Debug)]
#[command(name = "vdock", version, about = "Run VDock action descriptors")]
pub struct Cli {
    /// Config file (defaults to <config dir>/vdock/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run a descriptor given as JSON, or read it from stdin
    Run {
        /// Descriptor such as '{"type": "next_page", "config": {}}'
        descriptor: Option<String>,
    },
    /// Describe a descriptor without running it
    Describe {
        descriptor: Option<String>,
    },
    /// List loaded plugins
    Plugins,
    /// List the actions of a plugin with their schemas
    Actions {
        plugin_id: String,
    },
    /// Print the config schema of a plugin action
    Schema {
        action_id: String,
    },
    /// List every supported action type
    Types,
    /// Print engine status
    Status,
}

/// What a command prints and whether it counts as a success.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub output: Value,
    pub success: bool,
}

impl Outcome {
    fn ok(output: Value) -> Self {
        Self {
            output,
            success: true,
        }
    }

    fn result(result: ActionResult) -> Self {
        Self {
            success: result.success,
            output: result.to_value(),
        }
    }
}

/// Load the config file, then apply `VDOCK_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> EngineConfig {
    let mut config = match path.map(Path::to_path_buf).or_else(config_file_path) {
        Some(path) => EngineConfig::load_or_default(&path),
        None => EngineConfig::default(),
    };
    config.apply_env_overrides();
    config
}

/// Run one command against the engine. `stdin` supplies the descriptor
/// when none is given on the command line.
pub fn execute(command: &Command, engine: &Engine, stdin: impl Read) -> Outcome {
    match command {
        Command::Run { descriptor } => match read_descriptor(descriptor.as_deref(), stdin) {
            Ok(descriptor) => Outcome::result(engine.handle(&descriptor)),
            Err(failure) => Outcome::result(failure),
        },
        Command::Describe { descriptor } => {
            match read_descriptor(descriptor.as_deref(), stdin) {
                Ok(descriptor) => Outcome::ok(json!({"description": engine.describe(&descriptor)})),
                Err(failure) => Outcome::result(failure),
            }
        }
        Command::Plugins => Outcome::ok(json!({"plugins": engine.plugins().plugins()})),
        Command::Actions { plugin_id } => match engine.plugins().plugin_actions(plugin_id) {
            Some(actions) => Outcome::ok(json!({"actions": actions})),
            None => Outcome {
                output: json!({"error": "Plugin not found"}),
                success: false,
            },
        },
        Command::Schema { action_id } => {
            let schema = engine.plugins().get_action_schema(action_id);
            Outcome {
                success: schema.is_some(),
                output: json!({"action_id": action_id, "schema": schema}),
            }
        }
        Command::Types => Outcome::ok(json!({"types": engine.supported_types()})),
        Command::Status => Outcome::ok(engine.status()),
    }
}

fn read_descriptor(arg: Option<&str>, mut stdin: impl Read) -> Result<ActionDescriptor, ActionResult> {
    let text = match arg {
        Some(text) => text.to_string(),
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf).map_err(|e| {
                ActionResult::failure(format!("Failed to read descriptor: {e}"))
                    .with_code(ErrorCode::ActionExecutionFailed)
            })?;
            buf
        }
    };
    let value: Value = serde_json::from_str(&text).map_err(|e| {
        ActionResult::failure(format!("Invalid descriptor JSON: {e}"))
            .with_code(ErrorCode::ActionValidationFailed)
    })?;
    Ok(ActionDescriptor::from_value(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn engine() -> Engine {
        let mut config = EngineConfig::default();
        config.plugins.enabled = false;
        Engine::new(config)
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["vdock", "--config", "/tmp/c.toml", "schema", "obs_record"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(
            cli.command,
            Command::Schema {
                action_id: "obs_record".to_string()
            }
        );

        let cli = Cli::try_parse_from(["vdock", "run"]).unwrap();
        assert_eq!(cli.command, Command::Run { descriptor: None });
        assert!(Cli::try_parse_from(["vdock", "explode"]).is_err());
    }

    #[test]
    fn test_run_from_argument() {
        let outcome = execute(
            &Command::Run {
                descriptor: Some(r#"{"type": "next_page", "config": {}}"#.to_string()),
            },
            &engine(),
            Cursor::new(""),
        );
        assert!(outcome.success);
        assert_eq!(outcome.output["message"], "Navigation action: next_page");
    }

    #[test]
    fn test_run_from_stdin() {
        let outcome = execute(
            &Command::Run { descriptor: None },
            &engine(),
            Cursor::new(r#"{"type": "time_stopwatch"}"#),
        );
        assert!(outcome.success);
        assert_eq!(outcome.output["data"]["display_type"], "stopwatch");
    }

    #[test]
    fn test_run_invalid_json() {
        let outcome = execute(
            &Command::Run {
                descriptor: Some("{not json".to_string()),
            },
            &engine(),
            Cursor::new(""),
        );
        assert!(!outcome.success);
        assert_eq!(outcome.output["error_code"], 1001);
        assert!(outcome.output["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid descriptor JSON"));
    }

    #[test]
    fn test_listing_commands() {
        let engine = engine();
        let outcome = execute(&Command::Types, &engine, Cursor::new(""));
        assert!(outcome.output["types"]
            .as_array()
            .unwrap()
            .contains(&json!("multi_action")));

        let outcome = execute(&Command::Plugins, &engine, Cursor::new(""));
        assert_eq!(outcome.output, json!({"plugins": []}));

        let outcome = execute(
            &Command::Actions {
                plugin_id: "missing".to_string(),
            },
            &engine,
            Cursor::new(""),
        );
        assert!(!outcome.success);

        let outcome = execute(
            &Command::Describe {
                descriptor: Some(r#"{"type": "hotkey", "config": {"keys": ["ctrl", "c"]}}"#.into()),
            },
            &engine,
            Cursor::new(""),
        );
        assert_eq!(outcome.output["description"], "Hotkey: ctrl+c");
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[commands]\nallowlist = [\"echo\"]\n\n[composite]\nmax_depth = 3\n",
        )
        .unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.commands.allowlist, vec!["echo"]);
        assert_eq!(config.composite.max_depth, 3);

        let config = load_config(Some(&dir.path().join("missing.toml")));
        assert_eq!(config.composite.max_depth, 8);
    }
}
