//! Serializes the record stream in the selected output format

use anyhow::{Context, Result};
use std::io::Write;

use crate::config::OutputFormat;
use crate::json_output::{self, JsonOutput};
use crate::platform::Meta;
use crate::record::Record;
use crate::text_output;

/// Record sink for one run
///
/// The metadata header is written exactly once: before the first record in
/// streaming formats (or at finish for an empty run), folded into the wrapper
/// object for batched JSON.
pub struct Emitter<W: Write> {
    out: W,
    format: OutputFormat,
    pretty: bool,
    meta: Meta,
    started: bool,
    batch: Option<JsonOutput>,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W, format: OutputFormat, pretty: bool, meta: Meta) -> Self {
        let batch = match format {
            OutputFormat::Json => Some(JsonOutput::new(meta.clone())),
            OutputFormat::Ndjson | OutputFormat::Text => None,
        };
        Self {
            out,
            format,
            pretty,
            meta,
            started: false,
            batch,
        }
    }

    /// Emit one record
    pub fn write(&mut self, record: Record) -> Result<()> {
        if let Some(batch) = self.batch.as_mut() {
            batch.add_record(record);
            return Ok(());
        }
        self.start()?;
        let written = match self.format {
            OutputFormat::Text => text_output::write_record(&mut self.out, &record),
            _ => json_output::write_record_line(&mut self.out, &record),
        };
        written.context("Failed to write record")
    }

    /// Flush buffered output and hand back the writer
    pub fn finish(mut self) -> Result<W> {
        match self.batch.take() {
            Some(batch) => batch
                .write_to(&mut self.out, self.pretty)
                .context("Failed to write JSON output")?,
            None => self.start()?,
        }
        self.out.flush().context("Failed to flush output")?;
        Ok(self.out)
    }

    fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let written = match self.format {
            OutputFormat::Text => text_output::write_header(&mut self.out, &self.meta),
            _ => json_output::write_meta_line(&mut self.out, &self.meta),
        };
        written.context("Failed to write metadata header")
    }
}
