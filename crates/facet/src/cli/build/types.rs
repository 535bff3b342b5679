//! CLI enum types for the build command.

use clap::ValueEnum;
use facet_core::OutputFormat as CoreOutputFormat;

/// Formats for echoing manifests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmitFormat {
    /// One JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<EmitFormat> for CoreOutputFormat {
    fn from(format: EmitFormat) -> Self {
        match format {
            EmitFormat::Json => CoreOutputFormat::Json,
            EmitFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for EmitFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitFormat::Json => write!(f, "json"),
            EmitFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}
