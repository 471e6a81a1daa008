//! CLI argument parsing for hwsnap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{self, ModeOverride, SnapshotConfig, DEFAULT_EXCLUDE_GLOBS};

/// Output format for snapshot records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line, streamed (default)
    Ndjson,
    /// Single JSON document with a meta header and all records
    Json,
    /// Human-readable text
    Text,
}

impl From<OutputFormat> for config::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Ndjson => config::OutputFormat::Ndjson,
            OutputFormat::Json => config::OutputFormat::Json,
            OutputFormat::Text => config::OutputFormat::Text,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "hwsnap")]
#[command(version)]
#[command(
    about = "Collect hardware-related data from /proc and /sys, or diagnostic commands on macOS",
    long_about = None
)]
pub struct Cli {
    /// Output format
    #[arg(long = "format", value_enum, default_value = "ndjson")]
    pub format: OutputFormat,

    /// Pretty-print JSON output (json format only)
    #[arg(long)]
    pub pretty: bool,

    /// Additional root path to traverse (can be repeated)
    #[arg(long = "root", value_name = "PATH")]
    pub roots: Vec<PathBuf>,

    /// Only include paths matching these patterns (can be repeated)
    #[arg(long = "include-glob", value_name = "PATTERN")]
    pub include_globs: Vec<String>,

    /// Exclude paths matching these patterns, in addition to the defaults (can be repeated)
    #[arg(long = "exclude-glob", value_name = "PATTERN")]
    pub exclude_globs: Vec<String>,

    /// Follow symlinks during traversal
    #[arg(long = "follow-symlinks")]
    pub follow_symlinks: bool,

    /// Per-file read cap in bytes
    #[arg(long = "max-file-bytes", value_name = "BYTES", default_value_t = config::DEFAULT_MAX_FILE_BYTES)]
    pub max_file_bytes: u64,

    /// Global read cap across all files (default: unlimited)
    #[arg(long = "max-total-bytes", value_name = "BYTES")]
    pub max_total_bytes: Option<u64>,

    /// Include system_profiler on macOS (can be slow)
    #[arg(long = "darwin-use-system-profiler")]
    pub darwin_use_system_profiler: bool,

    /// Timeout for system_profiler in seconds
    #[arg(long = "darwin-profiler-timeout", value_name = "SECS", default_value_t = 30)]
    pub darwin_profiler_timeout: u64,

    /// Force Linux mode even on non-Linux hosts
    #[arg(long = "force-linux", conflicts_with = "force_darwin")]
    pub force_linux: bool,

    /// Force Darwin mode even on non-Darwin hosts
    #[arg(long = "force-darwin")]
    pub force_darwin: bool,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Build the run configuration
    pub fn to_config(&self) -> SnapshotConfig {
        let mode = if self.force_linux {
            ModeOverride::ForceLinux
        } else if self.force_darwin {
            ModeOverride::ForceDarwin
        } else {
            ModeOverride::Auto
        };

        let exclude_globs = DEFAULT_EXCLUDE_GLOBS
            .iter()
            .map(|s| s.to_string())
            .chain(self.exclude_globs.iter().cloned())
            .collect();

        SnapshotConfig {
            format: self.format.into(),
            pretty: self.pretty,
            roots: self.roots.clone(),
            include_globs: self.include_globs.clone(),
            exclude_globs,
            follow_symlinks: self.follow_symlinks,
            max_file_bytes: self.max_file_bytes,
            max_total_bytes: self.max_total_bytes,
            mode,
            use_system_profiler: self.darwin_use_system_profiler,
            profiler_timeout: Duration::from_secs(self.darwin_profiler_timeout),
            ..SnapshotConfig::default()
        }
    }
}
