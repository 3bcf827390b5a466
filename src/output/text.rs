//! Text output formatter for human-readable display

use crate::domain::EnvironmentCommands;
use crate::output::OutputFormatter;
use colored::Colorize;
use std::io::Write;

/// Width of the command label column
const LABEL_WIDTH: usize = 20;

/// Text formatter listing every command, with skipped ones marked
#[derive(Debug, Default)]
pub struct TextFormatter;

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for TextFormatter {
    fn format(
        &self,
        commands: &EnvironmentCommands,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let status = if commands.environment_exists() {
            "exists".green()
        } else {
            "not created".yellow()
        };

        writeln!(
            writer,
            "{} {}",
            "Environment:".bold(),
            commands.environment_name().cyan()
        )?;
        writeln!(
            writer,
            "{} {} ({})",
            "Directory:".bold(),
            commands.environment_directory().display(),
            status
        )?;
        writeln!(writer)?;

        for (label, command) in commands.entries() {
            match command {
                Some(command) => writeln!(writer, "  {:<LABEL_WIDTH$} {}", label, command)?,
                None => writeln!(
                    writer,
                    "  {:<LABEL_WIDTH$} {}",
                    label.dimmed(),
                    "(skipped)".dimmed()
                )?,
            }
        }

        Ok(())
    }
}
