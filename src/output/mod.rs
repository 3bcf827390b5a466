//! Output formatting for resolved environment commands
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::EnvironmentCommands;
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

impl OutputFormat {
    /// Select the format from the `--json` flag
    pub fn from_cli(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the resolved command set
    fn format(
        &self,
        commands: &EnvironmentCommands,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter for the given format
pub fn create_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
