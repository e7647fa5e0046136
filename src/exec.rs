//! External collaborator seams: process launching and byte-prefix reads.
//!
//! The [`ProcessLauncher`] trait defines the two ways a compiled pipeline
//! reaches the outside world: running a full shell command line to
//! completion, and spawning a program with an argv list whose stdout is
//! handed back as a live reader. The [`ByteSource`] trait yields a bounded
//! prefix of a file's bytes for header sniffing.
//!
//! The production implementations ([`SystemLauncher`], [`FsByteSource`])
//! sit on `std::process` and `std::fs`. Everything above them is
//! launcher-agnostic, so tests swap in a recording mock.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Captured result of a completed external command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub success: bool,
    /// Exit code if the process exited normally.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// A boxed byte reader, used both for feeding a child's stdin and for
/// handing back a child's stdout.
pub type ByteStream = Box<dyn Read + Send>;

/// Launches external processes on behalf of the pipeline.
///
/// Implementations own all process-lifecycle concerns (cancellation,
/// timeouts, reaping); the pipeline only hands over a deterministic
/// command or argv list and interprets the result.
pub trait ProcessLauncher {
    /// Run a shell command line to completion, optionally feeding `stdin`,
    /// and capture its output. A non-zero exit is reported in the returned
    /// [`ExecOutput`], not as an `Err`.
    fn run_shell(
        &self,
        command: &str,
        stdin: Option<ByteStream>,
    ) -> Result<ExecOutput, LaunchError>;

    /// Spawn `program` with `args` and return its stdout as a live reader.
    /// The call returns as soon as the child is running; the child's
    /// lifetime is tied to the returned reader.
    fn spawn_stream(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<ByteStream>,
    ) -> Result<ByteStream, LaunchError>;
}

/// Production launcher over `std::process`. Shell commands run under
/// `sh -c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for SystemLauncher {
    fn run_shell(
        &self,
        command: &str,
        stdin: Option<ByteStream>,
    ) -> Result<ExecOutput, LaunchError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: "sh".to_string(),
            source,
        })?;

        let writer = stdin.map(|reader| feed_stdin(&mut child, reader));
        let output = child.wait_with_output()?;
        if let Some(handle) = writer {
            // Writer errors (e.g. EPIPE from a child that exited early)
            // are subsumed by the child's own exit status.
            let _ = handle.join();
        }

        Ok(ExecOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn spawn_stream(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<ByteStream>,
    ) -> Result<ByteStream, LaunchError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if let Some(reader) = stdin {
            // Detached: the writer finishes when the reader drains or the
            // child closes its end.
            let _ = feed_stdin(&mut child, reader);
        }

        let stdout = child
            .stdout
            .take()
            .expect("stdout was configured as piped");
        Ok(Box::new(ChildStream { child, stdout }))
    }
}

/// Copy `reader` into the child's stdin on a separate thread so the parent
/// can drain stdout without deadlocking on full pipes.
fn feed_stdin(child: &mut Child, mut reader: ByteStream) -> std::thread::JoinHandle<()> {
    let mut stdin = child.stdin.take().expect("stdin was configured as piped");
    std::thread::spawn(move || {
        let _ = io::copy(&mut reader, &mut stdin);
        // stdin drops here, closing the pipe and signaling EOF.
    })
}

/// Owns the child alongside its stdout so the process is reaped when the
/// stream is fully read (or dropped).
struct ChildStream {
    child: Child,
    stdout: ChildStdout,
}

impl Read for ChildStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stdout.read(buf)?;
        if n == 0 {
            let _ = self.child.wait();
        }
        Ok(n)
    }
}

impl Drop for ChildStream {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// =========================================================================
// Byte source
// =========================================================================

/// Yields a bounded prefix of a file's bytes.
pub trait ByteSource {
    /// Read up to `limit` bytes from the start of `path`. A file shorter
    /// than `limit` yields whatever is there — short reads are the
    /// sniffers' problem, not an error.
    fn prefix(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>>;
}

/// Production byte source over `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsByteSource;

impl FsByteSource {
    pub fn new() -> Self {
        Self
    }
}

impl ByteSource for FsByteSource {
    fn prefix(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut buf = Vec::with_capacity(limit.min(64 * 1024));
        file.take(limit as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock launcher that records invocations without spawning anything.
    /// Uses Mutex so tests can assert through a shared reference.
    #[derive(Default)]
    pub struct MockLauncher {
        pub shell_commands: Mutex<Vec<String>>,
        pub spawns: Mutex<Vec<(String, Vec<String>)>>,
        /// Bytes fed to stdin, per invocation (`None` when no stdin).
        pub stdin_payloads: Mutex<Vec<Option<Vec<u8>>>>,
        /// Canned stdout for `run_shell`, popped per call.
        pub shell_stdout: Mutex<Vec<Vec<u8>>>,
        /// When set, `run_shell` reports a failed exit with this stderr.
        pub fail_with: Option<String>,
    }

    impl MockLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_stdout(stdout: &str) -> Self {
            Self {
                shell_stdout: Mutex::new(vec![stdout.as_bytes().to_vec()]),
                ..Self::default()
            }
        }

        pub fn failing(stderr: &str) -> Self {
            Self {
                fail_with: Some(stderr.to_string()),
                ..Self::default()
            }
        }

        fn record_stdin(&self, stdin: Option<ByteStream>) {
            let payload = stdin.map(|mut reader| {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).unwrap();
                buf
            });
            self.stdin_payloads.lock().unwrap().push(payload);
        }
    }

    impl ProcessLauncher for MockLauncher {
        fn run_shell(
            &self,
            command: &str,
            stdin: Option<ByteStream>,
        ) -> Result<ExecOutput, LaunchError> {
            self.shell_commands.lock().unwrap().push(command.to_string());
            self.record_stdin(stdin);

            if let Some(stderr) = &self.fail_with {
                return Ok(ExecOutput {
                    success: false,
                    code: Some(1),
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                });
            }

            let stdout = self
                .shell_stdout
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_default();
            Ok(ExecOutput {
                success: true,
                code: Some(0),
                stdout,
                stderr: Vec::new(),
            })
        }

        fn spawn_stream(
            &self,
            program: &str,
            args: &[String],
            stdin: Option<ByteStream>,
        ) -> Result<ByteStream, LaunchError> {
            self.spawns
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            self.record_stdin(stdin);
            Ok(Box::new(io::Cursor::new(b"streamed".to_vec())))
        }
    }

    #[test]
    fn mock_records_shell_command_and_stdin() {
        let launcher = MockLauncher::new();
        let out = launcher
            .run_shell("convert \"a.png\" \"b.png\"", Some(Box::new(io::Cursor::new(vec![1, 2]))))
            .unwrap();
        assert!(out.success);
        assert_eq!(
            launcher.shell_commands.lock().unwrap().as_slice(),
            ["convert \"a.png\" \"b.png\""]
        );
        assert_eq!(
            launcher.stdin_payloads.lock().unwrap().as_slice(),
            [Some(vec![1, 2])]
        );
    }

    #[test]
    fn fs_byte_source_truncates_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, vec![7u8; 100]).unwrap();

        let src = FsByteSource::new();
        assert_eq!(src.prefix(&path, 24).unwrap().len(), 24);
        // Shorter file than limit: short read, not an error.
        assert_eq!(src.prefix(&path, 4096).unwrap().len(), 100);
    }

    #[test]
    fn system_launcher_reports_exit_status() {
        let launcher = SystemLauncher::new();
        let ok = launcher.run_shell("true", None).unwrap();
        assert!(ok.success);
        let bad = launcher.run_shell("false", None).unwrap();
        assert!(!bad.success);
    }

    #[test]
    fn system_launcher_feeds_stdin_and_captures_stdout() {
        let launcher = SystemLauncher::new();
        let out = launcher
            .run_shell("cat", Some(Box::new(io::Cursor::new(b"roundtrip".to_vec()))))
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, b"roundtrip");
    }

    #[test]
    fn system_launcher_streams_child_stdout() {
        let launcher = SystemLauncher::new();
        let mut stream = launcher
            .spawn_stream("cat", &[], Some(Box::new(io::Cursor::new(b"live".to_vec()))))
            .unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"live");
    }
}
