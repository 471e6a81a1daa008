//! One complete snapshot run: configuration in, serialized records out

use anyhow::{Context, Result};
use std::io::Write;

use crate::commands::{self, CommandRunner, FallbackOptions};
use crate::config::SnapshotConfig;
use crate::emitter::Emitter;
use crate::platform::{self, Meta, Mode};
use crate::record::Record;
use crate::traversal;

/// Counts reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub errors: usize,
    /// Payload bytes retained across all records
    pub bytes: u64,
}

/// Collect a snapshot and write it to `out`
///
/// Configuration problems (bad globs) fail before any output is written.
/// Per-path failures only show up inside records.
pub fn run<W: Write>(
    config: &SnapshotConfig,
    runner: &dyn CommandRunner,
    out: W,
) -> Result<RunSummary> {
    let mode = platform::select_mode(config.mode);
    tracing::debug!(?mode, "selected collection mode");

    let records: Box<dyn Iterator<Item = Record>> = match mode {
        Mode::Linux => Box::new(
            traversal::traverse(config).context("Invalid include/exclude pattern")?,
        ),
        Mode::Darwin => Box::new(
            commands::collect(
                runner,
                FallbackOptions {
                    use_system_profiler: config.use_system_profiler,
                    profiler_timeout: config.profiler_timeout,
                },
            )
            .into_iter(),
        ),
    };

    let mut emitter = Emitter::new(out, config.format, config.pretty, Meta::current());
    let mut summary = RunSummary::default();
    for record in records {
        summary.records += 1;
        summary.errors += usize::from(record.error.is_some());
        summary.bytes += record.content_len() as u64;
        emitter.write(record)?;
    }
    emitter.finish()?;

    tracing::debug!(
        records = summary.records,
        errors = summary.errors,
        bytes = summary.bytes,
        "snapshot complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandError, CommandOutput};
    use crate::config::{CuratedRoots, ModeOverride, OutputFormat};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    struct EchoRunner;

    impl CommandRunner for EchoRunner {
        fn run(&self, argv: &[&str], _timeout: Duration) -> Result<CommandOutput, CommandError> {
            Ok(CommandOutput {
                stdout: argv.join(" ").into_bytes(),
                stderr: Vec::new(),
            })
        }
    }

    #[test]
    fn test_run_linux_mode_over_synthetic_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::write(dir.path().join("b.bin"), b"\0\0").unwrap();

        let config = SnapshotConfig {
            roots: vec![dir.path().to_path_buf()],
            curated: CuratedRoots::empty(),
            mode: ModeOverride::ForceLinux,
            ..SnapshotConfig::default()
        };
        let mut out = Vec::new();
        let summary = run(&config, &EchoRunner, &mut out).unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.bytes, 7);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_run_darwin_mode_uses_commands() {
        let config = SnapshotConfig {
            mode: ModeOverride::ForceDarwin,
            use_system_profiler: true,
            format: OutputFormat::Json,
            ..SnapshotConfig::default()
        };
        let mut out = Vec::new();
        let summary = run(&config, &EchoRunner, &mut out).unwrap();
        assert_eq!(summary.records, 2);

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["records"][0]["kind"], "command");
        assert_eq!(value["records"][0]["source"], "darwin:sysctl");
        assert_eq!(value["records"][1]["source"], "darwin:system_profiler");
    }

    #[test]
    fn test_run_bad_glob_writes_nothing() {
        let config = SnapshotConfig {
            include_globs: vec!["[".to_string()],
            mode: ModeOverride::ForceLinux,
            curated: CuratedRoots::empty(),
            ..SnapshotConfig::default()
        };
        let mut out = Vec::new();
        assert!(run(&config, &EchoRunner, &mut out).is_err());
        assert!(out.is_empty());
    }
}
