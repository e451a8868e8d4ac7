//! The `vdock` global available to plugin scripts.
//!
//! - `vdock.log(level, message)` - write to the engine log
//! - `vdock.run(argv, opts?)` - run a program with a timeout
//! - `vdock.platform` - operating system name

use std::path::PathBuf;
use std::time::Duration;

use mlua::{Lua, Result as LuaResult, Table};
use vdock_core::{run_with_timeout, ProcessError};

use crate::error::PluginError;

const DEFAULT_RUN_TIMEOUT_MS: u64 = 30_000;

/// Install the `vdock` table into a plugin's Lua state.
pub fn register_vdock_api(lua: &Lua, plugin_name: &str) -> LuaResult<()> {
    let vdock = lua.create_table()?;

    // vdock.log(level, message)
    {
        let plugin = plugin_name.to_string();
        let log_fn = lua.create_function(move |_lua, (level, message): (String, String)| {
            match level.to_ascii_lowercase().as_str() {
                "error" => tracing::error!(plugin = %plugin, "{}", message),
                "warn" | "warning" => tracing::warn!(plugin = %plugin, "{}", message),
                "debug" => tracing::debug!(plugin = %plugin, "{}", message),
                "trace" => tracing::trace!(plugin = %plugin, "{}", message),
                _ => tracing::info!(plugin = %plugin, "{}", message),
            }
            Ok(())
        })?;
        vdock.set("log", log_fn)?;
    }

    // vdock.run({"git", "status"}, { timeout_ms = 5000, cwd = "/tmp" })
    {
        let run_fn = lua.create_function(|lua, (argv, opts): (Table, Option<Table>)| {
            let argv = argv_from_table(&argv)?;
            let timeout_ms = opts
                .as_ref()
                .and_then(|o| o.get::<Option<u64>>("timeout_ms").ok().flatten())
                .unwrap_or(DEFAULT_RUN_TIMEOUT_MS);
            let cwd = opts
                .as_ref()
                .and_then(|o| o.get::<Option<String>>("cwd").ok().flatten())
                .map(PathBuf::from);

            let result = lua.create_table()?;
            match run_with_timeout(&argv, Duration::from_millis(timeout_ms), cwd.as_deref()) {
                Ok(output) => {
                    result.set("success", output.success())?;
                    result.set("stdout", output.stdout)?;
                    result.set("stderr", output.stderr)?;
                    result.set("exit_code", output.exit_code)?;
                    result.set("timed_out", false)?;
                }
                Err(ProcessError::TimedOut { .. }) => {
                    result.set("success", false)?;
                    result.set("stdout", "")?;
                    result.set("stderr", format!("Command timed out after {timeout_ms}ms"))?;
                    result.set("exit_code", -1)?;
                    result.set("timed_out", true)?;
                }
                Err(e) => return Err(mlua::Error::external(e)),
            }
            Ok(result)
        })?;
        vdock.set("run", run_fn)?;
    }

    vdock.set("platform", std::env::consts::OS)?;

    lua.globals().set("vdock", vdock)?;
    Ok(())
}

fn argv_from_table(argv: &Table) -> Result<Vec<String>, PluginError> {
    let argv = argv
        .sequence_values::<String>()
        .collect::<LuaResult<Vec<_>>>()?;
    if argv.is_empty() {
        return Err(PluginError::InvalidArgument(
            "vdock.run needs a non-empty argument list".to_string(),
        ));
    }
    Ok(argv)
}
