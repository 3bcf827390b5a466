//! Subcommand workflows
//!
//! Each workflow resolves the project, builds what it needs and runs shell commands through a
//! [`ProcessRunner`]. Commands that do not apply (`None`) are skipped and reported.

use crate::cli::Command;
use crate::console::Console;
use crate::domain::{EnvironmentCommands, Platform};
use crate::engine::ProcessRunner;
use crate::environment::{EnvironmentBuilder, EnvironmentFiles};
use crate::error::{IoError, ProjectError};
use crate::output::{create_formatter, OutputFormat};
use crate::project::{generate_recipe_folder, resolve_library_root, resolve_project_directory};
use crate::pypi::{self, DialoguerPrompt, TokenPrompt, TokenSource};
use crate::stubs;
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Directory stubgen writes into, relative to the project root
const STUBS_DIR: &str = "stubs";

/// Join the present commands with `&&`, or `None` when every part is absent
fn chain(parts: &[Option<&str>]) -> Option<String> {
    let present: Vec<&str> = parts.iter().flatten().copied().collect();
    (!present.is_empty()).then(|| present.join(" && "))
}

/// Runs subcommand workflows for one project
pub struct Workflow<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    console: &'a Console,
    platform: Platform,
    project_root: PathBuf,
}

impl<'a, R: ProcessRunner + ?Sized> Workflow<'a, R> {
    /// Verify `project_dir` is a project root and bind the workflow to it
    pub fn new(
        runner: &'a R,
        console: &'a Console,
        platform: Platform,
        project_dir: &Path,
    ) -> Result<Self> {
        let project_root = resolve_project_directory(project_dir)?;
        console.info(&format!("Project root: {}", project_root.display()));
        Ok(Self {
            runner,
            console,
            platform,
            project_root,
        })
    }

    /// Absolute path of the project root
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch a parsed subcommand
    pub async fn run(&self, command: &Command) -> Result<()> {
        match command {
            Command::ProcessTypedMarkers => self.process_typed_markers(),
            Command::ProcessStubs => self.process_stubs(),
            Command::PurgeStubs => self.purge_stubs(),
            Command::GenerateRecipeFolder => self.generate_recipe_folder(),
            Command::CreateEnv(args) => {
                self.create_env(&args.environment_name, &args.python_version)
                    .await
            }
            Command::RemoveEnv(args) => self.remove_env(&args.environment_name).await,
            Command::ProvisionEnv(args) => {
                self.provision_env(&args.environment_name, &args.python_version)
                    .await
            }
            Command::ImportEnv(args) => self.import_env(&args.environment_name).await,
            Command::ExportEnv(args) => self.export_env(&args.environment_name).await,
            Command::InstallProject(args) => self.install_project(&args.environment_name).await,
            Command::UninstallProject(args) => {
                self.uninstall_project(&args.environment_name).await
            }
            Command::AcquirePypiToken { replace_token } => {
                self.acquire_pypi_token(*replace_token, &DialoguerPrompt)
            }
            Command::ShowEnv {
                environment_name,
                python_version,
                json,
            } => {
                let mut buffer = Vec::new();
                self.show_env(
                    environment_name,
                    python_version.as_deref(),
                    OutputFormat::from_cli(*json),
                    &mut buffer,
                )
                .await?;

                let mut stdout = io::stdout().lock();
                stdout.write_all(&buffer)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }

    pub fn process_typed_markers(&self) -> Result<()> {
        let library_root = resolve_library_root(&self.project_root)?;
        let removed = stubs::generate_typed_marker(&library_root)?;
        for marker in &removed {
            self.console
                .info(&format!("Removed nested marker {}", marker.display()));
        }
        self.console.success("Typed marker (py.typed) resolved.");
        Ok(())
    }

    pub fn process_stubs(&self) -> Result<()> {
        let library_root = resolve_library_root(&self.project_root)?;
        let stubs_root = self.project_root.join(STUBS_DIR);
        if !stubs_root.is_dir() {
            return Err(IoError::directory_not_found(&stubs_root))
                .context("Unable to move generated stub files");
        }

        let report = stubs::relocate(&stubs_root, &library_root)?;
        for path in &report.moved {
            self.console.info(&format!("Moved {}", path.display()));
        }
        for (from, to) in &report.deduplication.renamed {
            self.console
                .info(&format!("Renamed {} to {}", from.display(), to.display()));
        }
        for path in &report.deduplication.removed {
            self.console
                .info(&format!("Removed duplicate {}", path.display()));
        }

        fs::remove_dir_all(&stubs_root).map_err(|e| IoError::generic(&stubs_root, e))?;
        self.console.success(&format!(
            "Distributed {} stub files to {}.",
            report.moved.len(),
            library_root.display()
        ));
        Ok(())
    }

    pub fn purge_stubs(&self) -> Result<()> {
        let library_root = resolve_library_root(&self.project_root)?;
        let removed = stubs::delete_stubs(&library_root)?;
        self.console
            .success(&format!("Purged {} stub files.", removed.len()));
        Ok(())
    }

    pub fn generate_recipe_folder(&self) -> Result<()> {
        let recipe = generate_recipe_folder(&self.project_root)?;
        self.console
            .success(&format!("Recipe folder generated at {}.", recipe.display()));
        Ok(())
    }

    /// Make sure `.pypirc` in the project root holds a well-formed upload token
    pub fn acquire_pypi_token(&self, replace: bool, prompt: &dyn TokenPrompt) -> Result<()> {
        let path = self.project_root.join(pypi::PYPIRC_FILE);
        match pypi::acquire_token(&path, replace, prompt, self.console)? {
            TokenSource::Existing => self
                .console
                .success("Existing PyPI token found inside the .pypirc file."),
            TokenSource::Entered => self
                .console
                .success("Valid PyPI token acquired and added to .pypirc for future uses."),
        }
        Ok(())
    }

    pub async fn create_env(&self, environment_name: &str, python_version: &str) -> Result<()> {
        let env = self.environment(environment_name, Some(python_version)).await?;
        if env.environment_exists() {
            self.console.warn(&format!(
                "Environment '{}' already exists. Use provision-env to recreate it.",
                env.environment_name()
            ));
            return Ok(());
        }

        self.create(&env).await?;
        self.install_dependencies(&env).await?;
        self.console.success(&format!(
            "Created '{}' environment and installed all project dependencies.",
            env.environment_name()
        ));
        Ok(())
    }

    pub async fn remove_env(&self, environment_name: &str) -> Result<()> {
        let env = self.environment(environment_name, None).await?;
        if !env.environment_exists() {
            self.console.warn(&format!(
                "Environment '{}' does not exist. Nothing to remove.",
                env.environment_name()
            ));
            return Ok(());
        }

        self.remove(&env).await
    }

    pub async fn provision_env(&self, environment_name: &str, python_version: &str) -> Result<()> {
        let env = self.environment(environment_name, Some(python_version)).await?;
        if env.environment_exists() {
            self.remove(&env).await?;
        } else {
            self.console.info(&format!(
                "Environment '{}' does not exist, skipping removal.",
                env.environment_name()
            ));
        }

        self.create(&env).await?;
        self.install_dependencies(&env).await?;
        self.console.success(&format!(
            "Provisioned '{}' environment.",
            env.environment_name()
        ));
        Ok(())
    }

    pub async fn import_env(&self, environment_name: &str) -> Result<()> {
        let env = self.environment(environment_name, None).await?;

        match (
            env.environment_exists(),
            env.create_from_yml_command(),
            env.update_command(),
        ) {
            (false, Some(create), _) => {
                self.step(create, "import the environment from the .yml file")
                    .await?;
                self.console.success(&format!(
                    "Environment '{}' created from the .yml file.",
                    env.environment_name()
                ));
            }
            (true, _, Some(update)) => {
                self.step(update, "update the environment from the .yml file")
                    .await?;
                self.console.success(&format!(
                    "Environment '{}' updated from the .yml file.",
                    env.environment_name()
                ));
            }
            _ => {
                let files =
                    EnvironmentFiles::resolve(&self.project_root, environment_name, self.platform);
                return Err(ProjectError::MissingEnvironmentFile {
                    path: files.yml_path,
                })
                .context(format!(
                    "Unable to import '{}'. Use create-env to build it from pyproject.toml",
                    env.environment_name()
                ));
            }
        }
        Ok(())
    }

    pub async fn export_env(&self, environment_name: &str) -> Result<()> {
        let env = self.environment(environment_name, None).await?;
        self.require_existing(&env)?;

        self.step(env.export_yml_command(), "export the environment as .yml")
            .await?;
        self.console.success(&format!(
            "Environment '{}' exported to /envs as a .yml file.",
            env.environment_name()
        ));

        self.step(env.export_spec_command(), "export the environment as spec.txt")
            .await?;
        self.console.success(&format!(
            "Environment '{}' exported to /envs as a spec.txt file.",
            env.environment_name()
        ));
        Ok(())
    }

    pub async fn install_project(&self, environment_name: &str) -> Result<()> {
        let env = self.environment(environment_name, None).await?;
        self.require_existing(&env)?;

        let command = format!(
            "{} && {}",
            env.activate_command(),
            env.install_project_command()
        );
        self.step(&command, "build and install the project").await?;
        self.console.success(&format!(
            "Project installed into '{}'.",
            env.environment_name()
        ));
        Ok(())
    }

    pub async fn uninstall_project(&self, environment_name: &str) -> Result<()> {
        let env = self.environment(environment_name, None).await?;
        if !env.environment_exists() {
            self.console.warn(&format!(
                "Environment '{}' does not exist. Nothing to uninstall.",
                env.environment_name()
            ));
            return Ok(());
        }

        let command = format!(
            "{} && {}",
            env.activate_command(),
            env.uninstall_project_command()
        );
        self.step(&command, "uninstall the project").await?;
        self.console.success(&format!(
            "Project uninstalled from '{}'.",
            env.environment_name()
        ));
        Ok(())
    }

    pub async fn show_env(
        &self,
        environment_name: &str,
        python_version: Option<&str>,
        format: OutputFormat,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let env = self.environment(environment_name, python_version).await?;
        create_formatter(format).format(&env, writer)?;
        Ok(())
    }

    async fn environment(
        &self,
        environment_name: &str,
        python_version: Option<&str>,
    ) -> Result<EnvironmentCommands> {
        let env = EnvironmentBuilder::new(self.runner, self.platform)
            .with_progress(!self.console.is_quiet())
            .build(&self.project_root, environment_name, python_version)
            .await?;
        self.console.info(&format!(
            "Resolved environment '{}' at {}",
            env.environment_name(),
            env.environment_directory().display()
        ));
        Ok(env)
    }

    fn require_existing(&self, env: &EnvironmentCommands) -> Result<()> {
        if env.environment_exists() {
            return Ok(());
        }
        Err(ProjectError::EnvironmentMissing {
            name: env.environment_name().to_string(),
        })
        .context("Create the environment with create-env first")
    }

    async fn create(&self, env: &EnvironmentCommands) -> Result<()> {
        let Some(create) = env.create_command() else {
            bail!(
                "Unable to create '{}': no python version was given",
                env.environment_name()
            );
        };
        self.step(create, "create the environment").await?;
        self.console
            .info(&format!("Created '{}' environment.", env.environment_name()));
        Ok(())
    }

    async fn install_dependencies(&self, env: &EnvironmentCommands) -> Result<()> {
        if env.conda_dependencies_command().is_none() {
            self.console.info("No conda dependencies declared, skipping.");
        }
        if env.pip_dependencies_command().is_none() {
            self.console.info("No pip dependencies declared, skipping.");
        }

        let Some(command) = chain(&[
            env.conda_dependencies_command(),
            env.pip_dependencies_command(),
        ]) else {
            self.console.warn("No project dependencies to install.");
            return Ok(());
        };

        let command = format!("{} && {}", env.activate_command(), command);
        self.step(&command, "install project dependencies").await?;
        self.console.info(&format!(
            "Installed project dependencies into '{}'.",
            env.environment_name()
        ));
        Ok(())
    }

    async fn remove(&self, env: &EnvironmentCommands) -> Result<()> {
        let command = format!("{} && {}", env.deactivate_command(), env.remove_command());
        self.step(&command, "remove the environment").await?;

        let directory = env.environment_directory();
        if directory.exists() {
            fs::remove_dir_all(directory).map_err(|e| IoError::generic(directory, e))?;
        }
        self.console
            .success(&format!("Removed '{}' environment.", env.environment_name()));
        Ok(())
    }

    async fn step(&self, command: &str, action: &str) -> Result<()> {
        self.console.info(&format!("Running: {}", command));
        let result = self.runner.execute(command, &self.project_root).await;
        if result.success {
            return Ok(());
        }
        match result.message {
            Some(message) => bail!("Unable to {}: '{}' {}", action, command, message),
            None => bail!("Unable to {}: '{}' failed", action, command),
        }
    }
}
