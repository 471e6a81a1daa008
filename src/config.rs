//! Run configuration consumed by the snapshot core
//!
//! Built from CLI arguments in `main`, or constructed directly by library
//! callers and tests. Holds no clap types.

use std::path::PathBuf;
use std::time::Duration;

use crate::capture::CaptureSettings;
use crate::filter::{FilterError, PathFilter};

pub const DEFAULT_MAX_FILE_BYTES: u64 = 64 * 1024;
pub const DEFAULT_PROFILER_TIMEOUT: Duration = Duration::from_secs(30);

/// Noisy trace/debug/resource subtrees excluded unless overridden
pub const DEFAULT_EXCLUDE_GLOBS: &[&str] = &["*/trace*/*", "*/debug/*", "*/device/resource*"];

/// Directory names never descended into, regardless of globs
pub const PRUNED_DIR_NAMES: &[&str] = &["tracing", "debug", "power"];

/// Individual files that describe CPU, memory, interrupts and buses
pub const LINUX_FILE_PATHS: &[&str] = &[
    "/proc/cpuinfo",
    "/proc/meminfo",
    "/proc/interrupts",
    "/proc/softirqs",
    "/proc/stat",
    "/proc/devices",
    "/proc/modules",
    "/proc/swaps",
    "/proc/version",
    "/proc/scsi/scsi",
    "/proc/bus/pci/devices",
];

/// Directory roots covering topology, firmware, DMI, thermal and power
pub const LINUX_DIR_PATHS: &[&str] = &[
    "/sys/devices/system/cpu",
    "/sys/devices/system/node",
    "/sys/devices/system/memory",
    "/sys/bus/pci/devices",
    "/sys/class/dmi/id",
    "/sys/class/thermal",
    "/sys/class/powercap",
    "/sys/class/power_supply",
    "/sys/devices/platform",
    "/sys/firmware",
    "/sys/firmware/devicetree/base",
];

/// Output format for the record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per line, written as records arrive
    #[default]
    Ndjson,
    /// A single JSON document wrapping all records
    Json,
    /// Human-readable text
    Text,
}

/// Which collection strategy to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeOverride {
    /// Pick from the host OS
    #[default]
    Auto,
    ForceLinux,
    ForceDarwin,
}

/// Hand-selected traversal entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedRoots {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

impl CuratedRoots {
    /// The Linux /proc and /sys hardware paths
    pub fn linux() -> Self {
        Self {
            files: LINUX_FILE_PATHS.iter().map(PathBuf::from).collect(),
            dirs: LINUX_DIR_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// No curated paths; only explicit roots are walked
    pub fn empty() -> Self {
        Self {
            files: Vec::new(),
            dirs: Vec::new(),
        }
    }
}

impl Default for CuratedRoots {
    fn default() -> Self {
        Self::linux()
    }
}

/// Complete configuration for one snapshot run
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub format: OutputFormat,
    /// Indent batched JSON output
    pub pretty: bool,
    /// Extra roots requested by the caller
    pub roots: Vec<PathBuf>,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
    pub max_file_bytes: u64,
    /// Global cap across all reads (None = unlimited)
    pub max_total_bytes: Option<u64>,
    pub curated: CuratedRoots,
    pub mode: ModeOverride,
    /// Run the slower hardware inventory command on the fallback path
    pub use_system_profiler: bool,
    pub profiler_timeout: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: false,
            roots: Vec::new(),
            include_globs: Vec::new(),
            exclude_globs: DEFAULT_EXCLUDE_GLOBS.iter().map(|s| s.to_string()).collect(),
            follow_symlinks: false,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_total_bytes: None,
            curated: CuratedRoots::default(),
            mode: ModeOverride::default(),
            use_system_profiler: false,
            profiler_timeout: DEFAULT_PROFILER_TIMEOUT,
        }
    }
}

impl SnapshotConfig {
    /// Compile the filter and per-capture settings
    pub fn capture_settings(&self) -> Result<CaptureSettings, FilterError> {
        Ok(CaptureSettings {
            filter: PathFilter::new(&self.include_globs, &self.exclude_globs)?,
            follow_symlinks: self.follow_symlinks,
            max_file_bytes: self.max_file_bytes,
        })
    }
}
