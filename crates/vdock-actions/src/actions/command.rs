//! Run an arbitrary command behind the command policy.
//!
//! A command passes four gates before anything is spawned: it must parse,
//! commands must be enabled, its program must pass the allow-list, and it
//! must carry `confirmed: true` when confirmation is required. The policy is
//! read on every call so runtime changes apply to the next request.

use serde_json::Value;
use vdock_core::{run_with_timeout, ActionConfig, ActionResult, ErrorCode, ProcessError};

use crate::error::ActionError;
use crate::handler::{flag, ActionHandler};
use crate::services::Services;

/// Longest command prefix shown by `describe`.
const DESCRIBE_LIMIT: usize = 50;

pub struct CommandAction<'a> {
    config: ActionConfig,
    services: &'a Services,
}

impl<'a> CommandAction<'a> {
    pub fn new(config: ActionConfig, services: &'a Services) -> Self {
        Self { config, services }
    }

    fn command(&self) -> Option<&str> {
        self.config
            .get("command")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
    }

    /// Parse the command and run it past the policy.
    fn checked_argv(&self) -> Result<Vec<String>, ActionError> {
        let command = self.command().ok_or(ActionError::MissingField("command"))?;
        let argv = split_command(command)?;
        let program = argv.first().ok_or(ActionError::MissingField("command"))?;

        let policy = self.services.commands.read();
        if !policy.enabled {
            return Err(ActionError::CommandsDisabled);
        }
        if !policy.allows(program) {
            return Err(ActionError::NotAllowed(program.clone()));
        }
        Ok(argv)
    }

    fn run(&self) -> ActionResult {
        let argv = match self.checked_argv() {
            Ok(argv) => argv,
            Err(e) => return e.into(),
        };
        let command = self.command().unwrap_or_default();

        let (required, timeout) = {
            let policy = self.services.commands.read();
            (policy.require_confirmation, policy.timeout())
        };
        // The descriptor may ask for confirmation but cannot waive it
        let required = required || flag(&self.config, "require_confirmation");
        if required && !flag(&self.config, "confirmed") {
            return ActionResult::failure("Command requires confirmation")
                .with_entry("requires_confirmation", true)
                .with_entry("command", command);
        }

        tracing::info!(program = %argv[0], "Running command");
        match run_with_timeout(&argv, timeout, None) {
            Ok(output) if output.success() => ActionResult::ok("Command executed successfully")
                .with_entry("stdout", output.stdout)
                .with_entry("stderr", output.stderr)
                .with_entry("returncode", output.exit_code),
            Ok(output) => {
                ActionResult::failure(format!("Command failed with code {}", output.exit_code))
                    .with_code(ErrorCode::SystemCommandFailed)
                    .with_entry("stdout", output.stdout)
                    .with_entry("stderr", output.stderr)
                    .with_entry("returncode", output.exit_code)
            }
            Err(e @ ProcessError::TimedOut { .. }) => ActionResult::failure(e.to_string())
                .with_code(ErrorCode::ActionTimeout)
                .with_entry("timed_out", true),
            Err(e) => {
                let err = ActionError::Process(e);
                let code = err.code();
                ActionResult::failure(format!("Failed to execute command: {err}")).with_code(code)
            }
        }
    }
}

impl ActionHandler for CommandAction<'_> {
    fn validate(&self) -> Result<(), ActionError> {
        self.checked_argv().map(|_| ())
    }

    fn execute(&self) -> ActionResult {
        self.run()
    }

    fn describe(&self) -> String {
        let command = self.command().unwrap_or("unknown");
        match command.char_indices().nth(DESCRIBE_LIMIT) {
            Some((cut, _)) => format!("Run command: {}...", &command[..cut]),
            None => format!("Run command: {command}"),
        }
    }
}

/// Split a command line into an argument vector.
///
/// Whitespace separates arguments. Single quotes take everything literally,
/// double quotes honour `\"` and `\\`, and outside quotes a backslash escapes
/// the next character. No expansion of any kind is performed.
pub fn split_command(line: &str) -> Result<Vec<String>, ActionError> {
    #[derive(PartialEq)]
    enum State {
        Plain,
        Single,
        Double,
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut state = State::Plain;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Plain => match c {
                c if c.is_whitespace() => {
                    if in_arg {
                        args.push(std::mem::take(&mut current));
                        in_arg = false;
                    }
                }
                '\'' => {
                    state = State::Single;
                    in_arg = true;
                }
                '"' => {
                    state = State::Double;
                    in_arg = true;
                }
                '\\' => {
                    current.push(chars.next().unwrap_or('\\'));
                    in_arg = true;
                }
                c => {
                    current.push(c);
                    in_arg = true;
                }
            },
            State::Single => match c {
                '\'' => state = State::Plain,
                c => current.push(c),
            },
            State::Double => match c {
                '"' => state = State::Plain,
                '\\' => match chars.peek() {
                    Some(&next) if next == '"' || next == '\\' => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                },
                c => current.push(c),
            },
        }
    }

    if state != State::Plain {
        return Err(ActionError::InvalidConfig(
            "Unterminated quote in command".to_string(),
        ));
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}
