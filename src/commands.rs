//! Command-execution fallback for hosts without /proc and /sys
//!
//! Runs a short fixed list of diagnostic commands and turns each one into a
//! `kind=command` record. Command output is not charged against the byte
//! budget.

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::{self, Read};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::record::{CaptureError, Content, Record, RecordKind};

pub const SYSCTL_TIMEOUT: Duration = Duration::from_secs(30);
pub const SYSCTL_ARGV: &[&str] = &["/usr/sbin/sysctl", "-a"];
pub const SYSTEM_PROFILER_ARGV: &[&str] = &[
    "/usr/sbin/system_profiler",
    "SPHardwareDataType",
    "-detailLevel",
    "mini",
];
pub const SOURCE_SYSCTL: &str = "darwin:sysctl";
pub const SOURCE_SYSTEM_PROFILER: &str = "darwin:system_profiler";

/// Marker placed between stdout and a non-empty stderr
pub const STDERR_MARKER: &str = "\n[stderr]\n";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors from running one command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Exec(String),
}

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Abstraction over process execution
///
/// Lets the fallback collector run real commands in production and canned
/// output in tests.
pub trait CommandRunner {
    /// Run `argv` to completion, or fail once `timeout` elapses
    fn run(&self, argv: &[&str], timeout: Duration) -> Result<CommandOutput, CommandError>;
}

/// Runs commands with `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[&str], timeout: Duration) -> Result<CommandOutput, CommandError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CommandError::Exec("empty command".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()
            .map_err(|e| CommandError::Exec(e.to_string()))?;

        // Drain both pipes off-thread so a chatty child cannot block on a full pipe
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + timeout;
        let status: io::Result<ExitStatus> = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    terminate(&mut child);
                    // Pipes are closed once the whole group is gone
                    let _ = join(stdout);
                    let _ = join(stderr);
                    tracing::warn!(command = %argv.join(" "), "command timed out");
                    return Err(CommandError::Timeout(timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => break Err(e),
            }
        };
        let status = status.map_err(|e| CommandError::Exec(e.to_string()))?;
        tracing::debug!(command = %argv.join(" "), %status, "command finished");

        Ok(CommandOutput {
            stdout: join(stdout)?,
            stderr: join(stderr)?,
        })
    }
}

/// Kill the child and anything it spawned, then reap it
fn terminate(child: &mut Child) {
    let group = i32::try_from(child.id()).ok().map(Pid::from_raw);
    match group {
        Some(pid) if killpg(pid, Signal::SIGKILL).is_ok() => {}
        _ => {
            let _ = child.kill();
        }
    }
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join(handle: Option<thread::JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>, CommandError> {
    match handle {
        None => Ok(Vec::new()),
        Some(h) => h
            .join()
            .map_err(|_| CommandError::Exec("output reader panicked".to_string()))?
            .map_err(|e| CommandError::Exec(e.to_string())),
    }
}

/// Run one command and describe the outcome as a record
pub fn capture_command(runner: &dyn CommandRunner, argv: &[&str], timeout: Duration) -> Record {
    let label = argv.join(" ");
    match runner.run(argv, timeout) {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                text.push_str(STDERR_MARKER);
                text.push_str(stderr);
            }

            let mut rec = Record::new(label, RecordKind::Command);
            rec.size = Some(text.len() as u64);
            rec.mtime = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs_f64());
            rec.content = Some(Content::Text(text));
            rec
        }
        Err(CommandError::Timeout(_)) => {
            Record::failed(label, RecordKind::Command, CaptureError::Timeout)
        }
        Err(CommandError::Exec(detail)) => {
            Record::failed(label, RecordKind::Command, CaptureError::Exec(detail))
        }
    }
}

/// Options for the fallback command list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackOptions {
    pub use_system_profiler: bool,
    pub profiler_timeout: Duration,
}

/// Run the fallback command list: `sysctl -a`, then optionally `system_profiler`
pub fn collect(runner: &dyn CommandRunner, options: FallbackOptions) -> Vec<Record> {
    let mut records =
        vec![capture_command(runner, SYSCTL_ARGV, SYSCTL_TIMEOUT).with_source(SOURCE_SYSCTL)];

    if options.use_system_profiler {
        records.push(
            capture_command(runner, SYSTEM_PROFILER_ARGV, options.profiler_timeout)
                .with_source(SOURCE_SYSTEM_PROFILER),
        );
    }
    records
}
