//! Host detection: collection mode and the metadata header

use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::ModeOverride;

pub const PROGRAM_NAME: &str = "hwsnap";

/// Collection strategy for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Walk /proc and /sys
    Linux,
    /// Run diagnostic commands
    Darwin,
}

/// Pick the collection mode
///
/// Forced modes win. Otherwise the host OS decides, and unknown hosts use
/// the traversal when a /proc or /sys tree is present.
pub fn select_mode(mode: ModeOverride) -> Mode {
    match mode {
        ModeOverride::ForceLinux => Mode::Linux,
        ModeOverride::ForceDarwin => Mode::Darwin,
        ModeOverride::Auto => detect_mode(std::env::consts::OS, |p| Path::new(p).exists()),
    }
}

fn detect_mode(os: &str, exists: impl Fn(&str) -> bool) -> Mode {
    match os {
        "linux" => Mode::Linux,
        "macos" => Mode::Darwin,
        _ if exists("/proc") || exists("/sys") => Mode::Linux,
        _ => Mode::Darwin,
    }
}

/// Leading metadata object written once per run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub program: String,
    pub version: String,
    pub host: String,
    pub platform: String,
    /// Collection time in Unix seconds
    pub time: f64,
}

impl Meta {
    /// Describe the current host at the current time
    pub fn current() -> Self {
        Self {
            program: PROGRAM_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            host: hostname(),
            platform: platform_string(),
            time: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
        }
    }
}

fn hostname() -> String {
    nix::unistd::gethostname()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// `<sysname>-<release>-<machine>`, e.g. `Linux-6.1.0-x86_64`
fn platform_string() -> String {
    match nix::sys::utsname::uname() {
        Ok(uts) => format!(
            "{}-{}-{}",
            uts.sysname().to_string_lossy(),
            uts.release().to_string_lossy(),
            uts.machine().to_string_lossy()
        ),
        Err(_) => format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
    }
}
