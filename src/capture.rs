//! Capture of a single path into a [`Record`]
//!
//! Capture never fails: every OS error is translated into a [`CaptureError`]
//! on the returned record and the caller keeps going.

use sha2::{Digest, Sha256};
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::budget::Budget;
use crate::classify;
use crate::filter::PathFilter;
use crate::record::{CaptureError, Content, Record, RecordKind};

/// Settings shared by every capture in one run
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub filter: PathFilter,
    pub follow_symlinks: bool,
    /// Per-file read cap in bytes
    pub max_file_bytes: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            filter: PathFilter::all(),
            follow_symlinks: false,
            max_file_bytes: crate::config::DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Capture one path, debiting `budget` by the bytes retained
pub fn capture(path: &Path, settings: &CaptureSettings, budget: &mut Budget) -> Record {
    let display = path.to_string_lossy().into_owned();

    if !settings.filter.should_include(&display) {
        return Record::failed(display, RecordKind::File, CaptureError::ExcludedByFilter);
    }

    let meta = match stat(path, settings.follow_symlinks) {
        Ok(meta) => meta,
        Err(e) => return Record::failed(display, RecordKind::File, stat_error(&e)),
    };

    let mut rec = Record::new(display, RecordKind::File);
    rec.size = Some(meta.len());
    rec.mtime = modified_secs(&meta);

    if is_symlink(path, &meta, settings.follow_symlinks) {
        rec.kind = RecordKind::Symlink;
        rec.link_target = fs::read_link(path)
            .ok()
            .map(|t| t.to_string_lossy().into_owned());
        if !settings.follow_symlinks {
            return rec;
        }
    }

    if budget.is_exhausted() {
        rec.error = Some(CaptureError::BudgetExhausted);
        return rec;
    }

    let cap = settings.max_file_bytes.min(budget.reserve(settings.max_file_bytes));
    let mut data = match read_capped(path, cap) {
        Ok(data) => data,
        Err(e) => {
            rec.error = Some(read_error(&e));
            return rec;
        }
    };

    let truncated = data.len() as u64 > cap;
    if truncated {
        data.truncate(cap as usize);
    }
    rec.truncated = Some(truncated);
    rec.sha256_hex = Some(hex::encode(Sha256::digest(&data)));

    let retained = data.len() as u64;
    rec.retained_bytes = Some(retained);
    rec.content = Some(if classify::is_binary(&data) {
        Content::Binary(data)
    } else {
        Content::Text(String::from_utf8_lossy(&data).into_owned())
    });

    budget.debit(retained);
    tracing::trace!(path = %rec.path, retained, truncated, "captured");
    rec
}

fn stat(path: &Path, follow_symlinks: bool) -> io::Result<Metadata> {
    if follow_symlinks {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
}

fn is_symlink(path: &Path, meta: &Metadata, follow_symlinks: bool) -> bool {
    if follow_symlinks {
        // `meta` describes the target here
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    } else {
        meta.file_type().is_symlink()
    }
}

/// Read up to `cap + 1` bytes; the extra byte only detects truncation
fn read_capped(path: &Path, cap: u64) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut data = Vec::new();
    file.take(cap.saturating_add(1)).read_to_end(&mut data)?;
    Ok(data)
}

fn modified_secs(meta: &Metadata) -> Option<f64> {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
}

fn stat_error(e: &io::Error) -> CaptureError {
    match e.kind() {
        io::ErrorKind::NotFound => CaptureError::NotFound,
        io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied,
        _ => CaptureError::Stat(e.to_string()),
    }
}

fn read_error(e: &io::Error) -> CaptureError {
    match e.kind() {
        io::ErrorKind::IsADirectory => CaptureError::IsADirectory,
        io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied,
        io::ErrorKind::NotFound => CaptureError::NotFound,
        _ => CaptureError::Read(e.to_string()),
    }
}
