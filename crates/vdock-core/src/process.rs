//! Run an external program with a wall-clock timeout.
//!
//! The program is started from an argument vector, never through a shell, so
//! shell metacharacters in arguments are passed through literally.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::error::ProcessError;

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or -1 when the process was terminated by a signal.
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `argv` and wait at most `timeout` for it to finish.
///
/// The timeout covers both the child's exit and the draining of its output
/// pipes, so a background process that inherited the pipes cannot hold the
/// call open. On unix the child leads its own process group and the whole
/// group is killed on timeout.
pub fn run_with_timeout(
    argv: &[String],
    timeout: Duration,
    cwd: Option<&Path>,
) -> Result<ProcessOutput, ProcessError> {
    let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;
    let deadline = Instant::now() + timeout;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill_and_reap(&mut child);
            return Err(timed_out(program, timeout));
        }
        Err(source) => {
            kill_and_reap(&mut child);
            return Err(ProcessError::Wait {
                program: program.clone(),
                source,
            });
        }
    };

    let stdout = collect(stdout_reader, deadline);
    let stderr = collect(stderr_reader, deadline);
    match (stdout, stderr) {
        (Some(stdout), Some(stderr)) => Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
        }),
        _ => {
            // The child exited but something it left behind still holds a pipe.
            kill_group(&child);
            Err(timed_out(program, timeout))
        }
    }
}

fn timed_out(program: &str, timeout: Duration) -> ProcessError {
    tracing::warn!(program = %program, "Command timed out after {:?}", timeout);
    ProcessError::TimedOut { timeout }
}

fn kill_and_reap(child: &mut Child) {
    kill_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<String>> {
    pipe.map(|mut handle| {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = handle.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

/// Wait for a reader until `deadline`. `None` means the pipe is still open.
fn collect(reader: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    let Some(rx) = reader else {
        return Some(String::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}
