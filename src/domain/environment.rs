//! Resolved environment lifecycle commands

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Every shell command needed to manage one project environment
///
/// Built once per CLI invocation by [`crate::environment::EnvironmentBuilder`] and never
/// mutated afterwards. A `None` command means the step does not apply and must be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentCommands {
    pub(crate) environment_name: String,
    pub(crate) environment_directory: PathBuf,
    pub(crate) activate_command: String,
    pub(crate) deactivate_command: String,
    pub(crate) create_command: Option<String>,
    pub(crate) create_from_yml_command: Option<String>,
    pub(crate) update_command: Option<String>,
    pub(crate) remove_command: String,
    pub(crate) conda_dependencies_command: Option<String>,
    pub(crate) pip_dependencies_command: Option<String>,
    pub(crate) install_project_command: String,
    pub(crate) uninstall_project_command: String,
    pub(crate) export_yml_command: String,
    pub(crate) export_spec_command: String,
}

impl EnvironmentCommands {
    /// Base name plus OS suffix, e.g. `axa_dev_lin`
    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    /// Directory where the package manager stores this environment
    pub fn environment_directory(&self) -> &Path {
        &self.environment_directory
    }

    /// Whether the environment has been created on this host
    pub fn environment_exists(&self) -> bool {
        self.environment_directory.is_dir()
    }

    pub fn activate_command(&self) -> &str {
        &self.activate_command
    }

    pub fn deactivate_command(&self) -> &str {
        &self.deactivate_command
    }

    /// Present only when a python version was supplied
    pub fn create_command(&self) -> Option<&str> {
        self.create_command.as_deref()
    }

    /// Present only when the exported .yml file exists
    pub fn create_from_yml_command(&self) -> Option<&str> {
        self.create_from_yml_command.as_deref()
    }

    /// Present only when the exported .yml file exists
    pub fn update_command(&self) -> Option<&str> {
        self.update_command.as_deref()
    }

    pub fn remove_command(&self) -> &str {
        &self.remove_command
    }

    /// Present only when at least one conda dependency is declared
    pub fn conda_dependencies_command(&self) -> Option<&str> {
        self.conda_dependencies_command.as_deref()
    }

    /// Present only when at least one pip dependency is declared
    pub fn pip_dependencies_command(&self) -> Option<&str> {
        self.pip_dependencies_command.as_deref()
    }

    pub fn install_project_command(&self) -> &str {
        &self.install_project_command
    }

    pub fn uninstall_project_command(&self) -> &str {
        &self.uninstall_project_command
    }

    pub fn export_yml_command(&self) -> &str {
        &self.export_yml_command
    }

    pub fn export_spec_command(&self) -> &str {
        &self.export_spec_command
    }

    /// Named view over every command, in lifecycle order
    pub fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("activate", Some(self.activate_command())),
            ("deactivate", Some(self.deactivate_command())),
            ("create", self.create_command()),
            ("create_from_yml", self.create_from_yml_command()),
            ("update", self.update_command()),
            ("conda_dependencies", self.conda_dependencies_command()),
            ("pip_dependencies", self.pip_dependencies_command()),
            ("install_project", Some(self.install_project_command())),
            ("uninstall_project", Some(self.uninstall_project_command())),
            ("export_yml", Some(self.export_yml_command())),
            ("export_spec", Some(self.export_spec_command())),
            ("remove", Some(self.remove_command())),
        ]
    }
}
