//! CLI argument parsing module for projenv

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Parse a probe timeout given in whole seconds
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let seconds: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {}", s))?;
    if seconds == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(Duration::from_secs(seconds))
}

/// Conda/pip project environment automation
#[derive(Parser, Debug, Clone)]
#[command(
    name = "projenv",
    version,
    about = "Conda/pip project environment automation"
)]
pub struct CliArgs {
    /// Project root directory (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Append messages to log files in the user data directory
    #[arg(long, global = true)]
    pub log: bool,

    /// Upper bound in seconds for each engine probe
    #[arg(long, global = true, value_parser = parse_timeout, default_value = "30")]
    pub probe_timeout: Duration,

    #[command(subcommand)]
    pub command: Command,
}

/// Environment selection shared by environment subcommands
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentArgs {
    /// Environment base name without the OS suffix, e.g. 'project_dev'
    #[arg(short = 'e', long)]
    pub environment_name: String,
}

/// Environment selection plus the python version for creation
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    /// Environment base name without the OS suffix, e.g. 'project_dev'
    #[arg(short = 'e', long)]
    pub environment_name: String,

    /// Python version for the environment, e.g. '3.13'
    #[arg(short = 'p', long)]
    pub python_version: String,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Keep a single py.typed marker at the library root
    ProcessTypedMarkers,

    /// Move generated stubs from /stubs into the library source tree
    ProcessStubs,

    /// Remove every .pyi file from the library source tree
    PurgeStubs,

    /// Recreate an empty /recipe directory
    GenerateRecipeFolder,

    /// Create the environment and install the project dependencies
    CreateEnv(CreateArgs),

    /// Remove the environment
    RemoveEnv(EnvironmentArgs),

    /// Remove (if present) and recreate the environment
    ProvisionEnv(CreateArgs),

    /// Create or update the environment from the exported .yml file
    ImportEnv(EnvironmentArgs),

    /// Export the environment as .yml and spec.txt files
    ExportEnv(EnvironmentArgs),

    /// Build and install the project into the environment
    InstallProject(EnvironmentArgs),

    /// Uninstall the project from the environment
    UninstallProject(EnvironmentArgs),

    /// Store a PyPI API token in the project's .pypirc
    AcquirePypiToken {
        /// Prompt for a new token even if a valid one is stored
        #[arg(long)]
        replace_token: bool,
    },

    /// Print the resolved environment commands
    ShowEnv {
        /// Environment base name without the OS suffix, e.g. 'project_dev'
        #[arg(short = 'e', long)]
        environment_name: String,

        /// Python version, needed only to show the create command
        #[arg(short = 'p', long)]
        python_version: Option<String>,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["projenv", "purge-stubs"]);
        assert_eq!(args.project, PathBuf::from("."));
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(!args.log);
        assert_eq!(args.probe_timeout, Duration::from_secs(30));
        assert_eq!(args.command, Command::PurgeStubs);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "projenv",
            "process-stubs",
            "--project",
            "/some/path",
            "--verbose",
            "--probe-timeout",
            "5",
        ]);
        assert_eq!(args.project, PathBuf::from("/some/path"));
        assert!(args.verbose);
        assert_eq!(args.probe_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_create_env_args() {
        let args = CliArgs::parse_from(["projenv", "create-env", "-e", "axa_dev", "-p", "3.12"]);
        assert_eq!(
            args.command,
            Command::CreateEnv(CreateArgs {
                environment_name: "axa_dev".to_string(),
                python_version: "3.12".to_string(),
            })
        );
    }

    #[test]
    fn test_create_env_requires_python_version() {
        let result = CliArgs::try_parse_from(["projenv", "create-env", "-e", "axa_dev"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_name_long_flag() {
        let args = CliArgs::parse_from(["projenv", "export-env", "--environment-name", "axa_dev"]);
        assert_eq!(
            args.command,
            Command::ExportEnv(EnvironmentArgs {
                environment_name: "axa_dev".to_string(),
            })
        );
    }

    #[test]
    fn test_show_env_args() {
        let args = CliArgs::parse_from(["projenv", "show-env", "-e", "axa_dev", "--json"]);
        match args.command {
            Command::ShowEnv {
                environment_name,
                python_version,
                json,
            } => {
                assert_eq!(environment_name, "axa_dev");
                assert!(python_version.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result =
            CliArgs::try_parse_from(["projenv", "purge-stubs", "--verbose", "-q"]);
        assert!(result.is_err());
        assert!(CliArgs::try_parse_from(["projenv", "purge-stubs", "-q"]).is_ok());
    }

    #[test]
    fn test_acquire_pypi_token_args() {
        let args = CliArgs::parse_from(["projenv", "acquire-pypi-token"]);
        assert_eq!(
            args.command,
            Command::AcquirePypiToken {
                replace_token: false
            }
        );

        let args = CliArgs::parse_from(["projenv", "acquire-pypi-token", "--replace-token"]);
        assert_eq!(
            args.command,
            Command::AcquirePypiToken {
                replace_token: true
            }
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(CliArgs::try_parse_from(["projenv"]).is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("10").unwrap(), Duration::from_secs(10));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("abc").is_err());
        assert!(parse_timeout("-1").is_err());
    }
}
