//! Depth-first walk over curated hardware roots
//!
//! Curated single files are captured first, then each directory root is
//! walked in file-name order. Excluded and deny-listed directories are pruned
//! before descent, so nothing below them is ever read.
//!
//! The walk is lazy: [`Traversal`] is an iterator and each call to `next`
//! performs at most one capture.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::budget::Budget;
use crate::capture::{capture, CaptureSettings};
use crate::config::{CuratedRoots, SnapshotConfig, PRUNED_DIR_NAMES};
use crate::filter::{FilterError, PathFilter};
use crate::record::{CaptureError, Record, RecordKind, SOURCE_LINUX};

/// Entry points actually walked after existence and containment checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootPlan {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

/// Resolve curated roots against the roots requested by the caller
///
/// Missing curated paths are dropped silently. With requested roots, curated
/// files must live under one of them and curated directories must be an
/// ancestor or descendant of one. Requested roots not covered by a kept
/// directory are appended in the order given, and any curated path below an
/// appended root is left to that root's walk so nothing is visited twice.
pub fn plan_roots(curated: &CuratedRoots, requested: &[PathBuf]) -> RootPlan {
    let wanted = |path: &Path, either_way: bool| {
        requested.is_empty()
            || requested
                .iter()
                .any(|r| path.starts_with(r) || (either_way && r.starts_with(path)))
    };

    let files: Vec<PathBuf> = curated
        .files
        .iter()
        .filter(|f| f.is_file() && wanted(f.as_path(), false))
        .cloned()
        .collect();

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in &curated.dirs {
        if dir.exists() && !covered(&dirs, dir) && wanted(dir.as_path(), true) {
            dirs.push(dir.clone());
        }
    }

    let mut extra: Vec<PathBuf> = Vec::new();
    for root in requested {
        if !root.exists() || covered(&dirs, root) || files.contains(root) {
            continue;
        }
        let nested_in_other = requested
            .iter()
            .any(|other| other != root && root.starts_with(other) && other.exists());
        if !nested_in_other && !extra.contains(root) {
            extra.push(root.clone());
        }
    }

    let files: Vec<PathBuf> = files.into_iter().filter(|f| !covered(&extra, f)).collect();
    let mut dirs: Vec<PathBuf> = dirs.into_iter().filter(|d| !covered(&extra, d)).collect();
    dirs.extend(extra);
    RootPlan { files, dirs }
}

/// True when `path` is one of `roots` or lies below one, compared by component
fn covered(roots: &[PathBuf], path: &Path) -> bool {
    roots.iter().any(|r| path.starts_with(r))
}

/// A path scheduled for capture, or a directory the walk could not enter
enum Visit {
    Capture(PathBuf),
    Unreadable { path: PathBuf, error: CaptureError },
}

/// Lazy, single-pass record stream over the curated roots
pub struct Traversal {
    settings: CaptureSettings,
    budget: Budget,
    pending: Box<dyn Iterator<Item = Visit>>,
}

impl Traversal {
    /// Plan the roots and prepare the walk; nothing is read yet
    pub fn new(config: &SnapshotConfig) -> Result<Self, FilterError> {
        let settings = config.capture_settings()?;
        let plan = plan_roots(&config.curated, &config.roots);
        tracing::debug!(
            files = plan.files.len(),
            dirs = plan.dirs.len(),
            "planned traversal roots"
        );

        let filter = settings.filter.clone();
        let follow = settings.follow_symlinks;
        let files = plan.files.into_iter().map(Visit::Capture);
        let dirs = plan
            .dirs
            .into_iter()
            .flat_map(move |dir| walk(dir, filter.clone(), follow));

        Ok(Self {
            settings,
            budget: Budget::new(config.max_total_bytes),
            pending: Box::new(files.chain(dirs)),
        })
    }

    /// Remaining global byte allowance
    pub fn budget(&self) -> &Budget {
        &self.budget
    }
}

impl Iterator for Traversal {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let record = match self.pending.next()? {
            Visit::Capture(path) => capture(&path, &self.settings, &mut self.budget),
            Visit::Unreadable { path, error } => {
                Record::failed(path.to_string_lossy(), RecordKind::Dir, error)
            }
        };
        Some(record.with_source(SOURCE_LINUX))
    }
}

/// Start a fresh walk with the given configuration
pub fn traverse(config: &SnapshotConfig) -> Result<Traversal, FilterError> {
    Traversal::new(config)
}

fn walk(root: PathBuf, filter: PathFilter, follow: bool) -> impl Iterator<Item = Visit> {
    let prune_filter = filter.clone();
    WalkDir::new(root)
        .follow_links(follow)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !is_pruned(entry, &prune_filter))
        .filter_map(move |result| match result {
            Ok(entry) => leaf(entry, &filter),
            Err(err) => walk_error(err),
        })
}

fn is_pruned(entry: &DirEntry, filter: &PathFilter) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let denied = entry
        .file_name()
        .to_str()
        .is_some_and(|name| PRUNED_DIR_NAMES.contains(&name));
    let pruned = denied || !filter.should_include(&entry.path().to_string_lossy());
    if pruned {
        tracing::debug!(path = %entry.path().display(), denied, "pruned directory");
    }
    pruned
}

fn leaf(entry: DirEntry, filter: &PathFilter) -> Option<Visit> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return None;
    }
    if !(file_type.is_file() || file_type.is_symlink()) {
        tracing::trace!(path = %entry.path().display(), "skipping special file");
        return None;
    }
    if !filter.should_include(&entry.path().to_string_lossy()) {
        return None;
    }
    Some(Visit::Capture(entry.into_path()))
}

fn walk_error(err: walkdir::Error) -> Option<Visit> {
    let Some(path) = err.path().map(Path::to_path_buf) else {
        tracing::warn!("walk error without a path: {}", err);
        return None;
    };
    tracing::debug!(path = %path.display(), "walk error: {}", err);

    if err.loop_ancestor().is_some() {
        return Some(Visit::Unreadable {
            path,
            error: CaptureError::SymlinkLoop,
        });
    }

    // Dangling links met while following: let capture describe them
    let is_link = path
        .symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if is_link {
        return Some(Visit::Capture(path));
    }

    let error = match err.io_error().map(|e| e.kind()) {
        Some(std::io::ErrorKind::NotFound) => CaptureError::NotFound,
        Some(std::io::ErrorKind::PermissionDenied) => CaptureError::PermissionDenied,
        _ => CaptureError::Read(err.to_string()),
    };
    Some(Visit::Unreadable { path, error })
}
