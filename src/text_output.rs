//! Human-readable text output
//!
//! Meant for eyeballing a snapshot; the JSON formats carry every field.

use std::io::{self, Write};

use crate::platform::Meta;
use crate::record::{Content, Record};

/// Write the `# hwsnap ...` banner
pub fn write_header<W: Write>(out: &mut W, meta: &Meta) -> io::Result<()> {
    writeln!(
        out,
        "# {} {} on {} ({})",
        meta.program, meta.version, meta.host, meta.platform
    )?;
    writeln!(out, "# time={}", meta.time)
}

/// Write one record block followed by a blank line
pub fn write_record<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    writeln!(out, "===== PATH: {} (kind={}) =====", record.path, record.kind)?;
    match (&record.error, &record.content) {
        (Some(error), _) => writeln!(out, "[error] {}", error)?,
        (None, Some(Content::Text(text))) => writeln!(out, "{}", text.trim_end_matches('\n'))?,
        (None, Some(content @ Content::Binary(_))) => {
            writeln!(out, "[base64]{}", content.to_base64().unwrap_or_default())?
        }
        (None, None) => writeln!(out, "[no-content]")?,
    }
    writeln!(out)
}
