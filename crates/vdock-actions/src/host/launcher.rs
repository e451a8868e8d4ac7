//! Opening URLs and documents, and starting programs detached.

use std::path::Path;
use std::process::{Command, Stdio};

/// Starts things the user asked for without waiting on them.
pub trait Launcher: Send + Sync {
    /// Open a URL, file or folder with the desktop's default handler.
    fn open(&self, target: &str) -> std::io::Result<()>;

    /// Start `program` detached and return its process id.
    fn spawn(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> std::io::Result<u32>;
}

/// Launcher backed by `open`, `xdg-open` or `explorer.exe`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn opener() -> &'static str {
        if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer.exe"
        } else {
            "xdg-open"
        }
    }
}

impl Launcher for SystemLauncher {
    fn open(&self, target: &str) -> std::io::Result<()> {
        self.spawn(Path::new(Self::opener()), &[target.to_string()], None)
            .map(|_| ())
    }

    fn spawn(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> std::io::Result<u32> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn()?;
        let pid = child.id();
        // Reap in the background so the child never lingers as a zombie.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(pid)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Launch {
        Open(String),
        Spawn {
            program: PathBuf,
            args: Vec<String>,
            cwd: Option<PathBuf>,
        },
    }

    /// Records launches instead of performing them.
    #[derive(Default)]
    pub struct RecordingLauncher {
        pub launches: Mutex<Vec<Launch>>,
        pub fail: bool,
    }

    impl RecordingLauncher {
        pub fn launches(&self) -> Vec<Launch> {
            self.launches.lock().clone()
        }
    }

    impl Launcher for RecordingLauncher {
        fn open(&self, target: &str) -> std::io::Result<()> {
            if self.fail {
                return Err(std::io::Error::other("no handler"));
            }
            self.launches.lock().push(Launch::Open(target.to_string()));
            Ok(())
        }

        fn spawn(
            &self,
            program: &Path,
            args: &[String],
            cwd: Option<&Path>,
        ) -> std::io::Result<u32> {
            if self.fail {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "denied",
                ));
            }
            self.launches.lock().push(Launch::Spawn {
                program: program.to_path_buf(),
                args: args.to_vec(),
                cwd: cwd.map(Path::to_path_buf),
            });
            Ok(4242)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_returns_pid() {
        let pid = SystemLauncher
            .spawn(Path::new("true"), &[], None)
            .unwrap();
        assert!(pid > 0);
    }

    #[test]
    fn test_spawn_missing_program() {
        let err = SystemLauncher
            .spawn(Path::new("vdock-definitely-not-a-program"), &[], None)
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
