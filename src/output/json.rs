//! JSON output formatter for machine processing

use crate::domain::EnvironmentCommands;
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the command set
///
/// Skipped commands serialize as `null`.
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Whether the environment directory exists on this host
    environment_exists: bool,
    #[serde(flatten)]
    commands: &'a EnvironmentCommands,
}

impl OutputFormatter for JsonFormatter {
    fn format(
        &self,
        commands: &EnvironmentCommands,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = JsonOutput {
            environment_exists: commands.environment_exists(),
            commands,
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        Ok(())
    }
}
