//! Uniform result shape for every visited path or command
//!
//! A [`Record`] is built inside one capture call and never mutated after it
//! is handed to an emitter. Content is a sum type so text and binary payloads
//! cannot both be set, but serialization flattens it back into the
//! `content_text` / `content_base64` pair so every entry has the same keys.

use base64::Engine;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Source tag for records produced by the Linux traversal
pub const SOURCE_LINUX: &str = "linux";

/// What kind of entity a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    File,
    Symlink,
    Dir,
    Command,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::File => "file",
            RecordKind::Symlink => "symlink",
            RecordKind::Dir => "dir",
            RecordKind::Command => "command",
        };
        f.write_str(s)
    }
}

/// Captured payload, already classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// UTF-8 text (invalid sequences replaced)
    Text(String),
    /// Raw bytes, emitted as base64
    Binary(Vec<u8>),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Binary(_) => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Content::Text(_) => None,
            Content::Binary(b) => Some(b),
        }
    }

    /// Binary payload in standard base64
    pub fn to_base64(&self) -> Option<String> {
        self.as_binary()
            .map(|b| base64::engine::general_purpose::STANDARD.encode(b))
    }
}

/// Why a capture failed or was skipped
///
/// `Display` yields the exact tag written to output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("excluded-by-filter")]
    ExcludedByFilter,

    #[error("not-found")]
    NotFound,

    #[error("permission-denied")]
    PermissionDenied,

    #[error("stat-error:{0}")]
    Stat(String),

    #[error("budget-exhausted")]
    BudgetExhausted,

    #[error("is-a-directory")]
    IsADirectory,

    #[error("read-error:{0}")]
    Read(String),

    #[error("symlink-loop")]
    SymlinkLoop,

    #[error("timeout")]
    Timeout,

    #[error("exec-error:{0}")]
    Exec(String),
}

/// Result of visiting one path or running one command
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Filesystem path, or the command line for command records
    pub path: String,
    pub kind: RecordKind,
    pub size: Option<u64>,
    /// Modification time in Unix seconds
    pub mtime: Option<f64>,
    pub link_target: Option<String>,
    pub content: Option<Content>,
    /// Set once a read was attempted
    pub truncated: Option<bool>,
    /// Lowercase hex SHA-256 of exactly the retained bytes
    pub sha256_hex: Option<String>,
    pub error: Option<CaptureError>,
    /// Collection path that produced the record (e.g. "linux", "darwin:sysctl")
    pub source: Option<String>,
    /// Bytes read from disk, before lossy decoding; not serialized
    pub retained_bytes: Option<u64>,
}

impl Record {
    /// Create an empty record for a path
    pub fn new(path: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            path: path.into(),
            kind,
            size: None,
            mtime: None,
            link_target: None,
            content: None,
            truncated: None,
            sha256_hex: None,
            error: None,
            source: None,
            retained_bytes: None,
        }
    }

    /// Create a record that only carries an error
    pub fn failed(path: impl Into<String>, kind: RecordKind, error: CaptureError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(path, kind)
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn content_text(&self) -> Option<&str> {
        self.content.as_ref().and_then(Content::as_text)
    }

    pub fn content_binary(&self) -> Option<&[u8]> {
        self.content.as_ref().and_then(Content::as_binary)
    }

    /// Number of payload bytes retained for this record
    ///
    /// Counts the raw bytes read, so replacement characters from lossy
    /// decoding do not inflate it.
    pub fn content_len(&self) -> usize {
        if let Some(n) = self.retained_bytes {
            return n as usize;
        }
        match &self.content {
            Some(Content::Text(s)) => s.len(),
            Some(Content::Binary(b)) => b.len(),
            None => 0,
        }
    }
}

/// Flat wire shape, one key per field, absent values as null
#[derive(Serialize)]
struct RecordRow<'a> {
    path: &'a str,
    kind: RecordKind,
    size: Option<u64>,
    mtime: Option<f64>,
    link_target: Option<&'a str>,
    content_text: Option<&'a str>,
    content_base64: Option<String>,
    truncated: Option<bool>,
    sha256_hex: Option<&'a str>,
    error: Option<String>,
    source: Option<&'a str>,
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordRow {
            path: &self.path,
            kind: self.kind,
            size: self.size,
            mtime: self.mtime,
            link_target: self.link_target.as_deref(),
            content_text: self.content_text(),
            content_base64: self.content.as_ref().and_then(Content::to_base64),
            truncated: self.truncated,
            sha256_hex: self.sha256_hex.as_deref(),
            error: self.error.as_ref().map(ToString::to_string),
            source: self.source.as_deref(),
        }
        .serialize(serializer)
    }
}
