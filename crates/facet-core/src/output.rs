//! Echoing build results as JSON or JSON Lines.
//!
//! JSON Lines output streams one record per finished image; JSON output is
//! buffered and written as a single array by [`OutputWriter::finish`].

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array
    Json,
    /// One JSON object per line
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<serde_json::Value>,
    records: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects [`OutputFormat::Json`].
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            records: 0,
        }
    }

    /// Emit (or buffer) one record.
    pub fn push<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
            OutputFormat::Json => {
                self.pending
                    .push(serde_json::to_value(record).map_err(io::Error::other)?);
            }
        }
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Write any buffered array, flush, and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            let written = if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &self.pending)
            } else {
                serde_json::to_writer(&mut self.writer, &self.pending)
            };
            written.map_err(io::Error::other)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
