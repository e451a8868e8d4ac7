//! Clipboard access through the platform's command-line tools.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::InputError;

const CLIPBOARD_TIMEOUT: Duration = Duration::from_secs(5);

/// Replaces the system clipboard contents.
pub trait ClipboardAccess: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), InputError>;
}

/// Pipes text into `pbcopy`, `clip`, `wl-copy`, `xclip` or `xsel`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn candidates() -> &'static [&'static [&'static str]] {
        if cfg!(target_os = "macos") {
            &[&["pbcopy"]]
        } else if cfg!(windows) {
            &[&["clip"]]
        } else {
            &[
                &["wl-copy"],
                &["xclip", "-selection", "clipboard"],
                &["xsel", "--clipboard", "--input"],
            ]
        }
    }
}

impl ClipboardAccess for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), InputError> {
        let mut last_error = String::from("no clipboard tool found");
        for argv in Self::candidates() {
            match pipe_into(argv, text) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(tool = argv[0], "Clipboard tool failed: {}", e);
                    last_error = e;
                }
            }
        }
        Err(InputError::Clipboard(last_error))
    }
}

fn pipe_into(argv: &[&str], text: &str) -> Result<(), String> {
    let (program, args) = argv.split_first().ok_or("empty clipboard command")?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("{program}: {e}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| format!("{program}: {e}"))?;
    }

    match child.wait_timeout(CLIPBOARD_TIMEOUT) {
        Ok(Some(status)) if status.success() => Ok(()),
        Ok(Some(status)) => Err(format!("{program} exited with {status}")),
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(format!("{program} timed out"))
        }
        Err(e) => Err(format!("{program}: {e}")),
    }
}
