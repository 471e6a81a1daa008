//! JSON output formats for snapshot records
//!
//! `ndjson` writes one object per line as records arrive, preceded by a
//! `{"meta": ...}` line. `json` buffers every record into one wrapper object.

use serde::Serialize;
use std::io::{self, Write};

use crate::platform::Meta;
use crate::record::Record;

/// First line of an ndjson stream
#[derive(Debug, Serialize)]
struct MetaLine<'a> {
    meta: &'a Meta,
}

/// Write the `{"meta": ...}` header line
pub fn write_meta_line<W: Write>(out: &mut W, meta: &Meta) -> io::Result<()> {
    serde_json::to_writer(&mut *out, &MetaLine { meta })?;
    out.write_all(b"\n")
}

/// Write one record as a single line
pub fn write_record_line<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")
}

/// Root object of the batched `json` format
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub meta: Meta,
    pub records: Vec<Record>,
}

impl JsonOutput {
    pub fn new(meta: Meta) -> Self {
        Self {
            meta,
            records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Serialize the wrapper, indented when `pretty`
    pub fn write_to<W: Write>(&self, out: &mut W, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut *out, self)?;
        } else {
            serde_json::to_writer(&mut *out, self)?;
        }
        out.write_all(b"\n")
    }
}
