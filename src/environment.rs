//! Environment command construction
//!
//! Workflow: platform → environment files → classify dependencies → probe engines → assemble.
//! Assembly itself is pure string templating over already-resolved inputs; nothing here
//! executes the commands it builds.

use crate::domain::{ClassifiedDependencies, EnvironmentCommands, Platform};
use crate::engine::{EngineSelection, PipEngine, ProcessRunner};
use crate::error::AppError;
use crate::manifest::classify_project;
use crate::progress::Progress;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Names and paths of the OS-specific environment files under `envs/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentFiles {
    /// Base name plus OS suffix
    pub environment_name: String,
    /// `envs/{name}.yml`
    pub yml_path: PathBuf,
    /// `envs/{name}_spec.txt`
    pub spec_path: PathBuf,
}

impl EnvironmentFiles {
    /// Resolve file names for the given base name on the given platform
    pub fn resolve(project_root: &Path, environment_base_name: &str, platform: Platform) -> Self {
        let environment_name = format!("{}{}", environment_base_name, platform.os_suffix());
        let envs_dir = project_root.join("envs");
        Self {
            yml_path: envs_dir.join(format!("{}.yml", environment_name)),
            spec_path: envs_dir.join(format!("{}_spec.txt", environment_name)),
            environment_name,
        }
    }

    /// Whether an exported environment file exists on disk
    pub fn yml_exists(&self) -> bool {
        self.yml_path.is_file()
    }
}

/// Everything `assemble` needs, already resolved
#[derive(Debug, Clone)]
pub struct EnvironmentInputs<'a> {
    pub platform: Platform,
    pub files: &'a EnvironmentFiles,
    pub yml_exists: bool,
    pub project_name: &'a str,
    pub python_version: Option<&'a str>,
    pub dependencies: &'a ClassifiedDependencies,
    pub engines: &'a EngineSelection,
}

/// Build the full command set from resolved inputs
pub fn assemble(inputs: &EnvironmentInputs<'_>) -> EnvironmentCommands {
    let conda = inputs.engines.conda.command();
    let pip = inputs.engines.pip;
    let name = inputs.files.environment_name.as_str();
    let yml = inputs.files.yml_path.display();
    let spec = inputs.files.spec_path.display();
    let project = inputs.project_name;

    let create_command = inputs
        .python_version
        .map(|version| format!("{conda} create -n {name} python={version} --yes"));

    let (create_from_yml_command, update_command) = if inputs.yml_exists {
        (
            Some(format!("{conda} env create -f {yml} --yes")),
            Some(format!("{conda} env update -n {name} -f {yml} --prune")),
        )
    } else {
        (None, None)
    };

    let conda_deps = inputs.dependencies.conda_dependencies();
    let conda_dependencies_command = (!conda_deps.is_empty())
        .then(|| format!("{conda} install -n {name} {} --yes", conda_deps.join(" ")));

    let pip_deps = inputs.dependencies.pip_dependencies();
    let pip_dependencies_command = (!pip_deps.is_empty()).then(|| match pip {
        PipEngine::Uv => format!(
            "{} install {} --resolution highest --compile-bytecode",
            pip.command(),
            pip_deps.join(" ")
        ),
        PipEngine::Pip => format!("{} install {} --compile", pip.command(), pip_deps.join(" ")),
    });

    let install_project_command = match pip {
        PipEngine::Uv => format!(
            "{} install . --resolution highest --reinstall-package {project} --compile-bytecode",
            pip.command()
        ),
        PipEngine::Pip => format!(
            "{} install . --compile --force-reinstall --no-deps",
            pip.command()
        ),
    };

    let uninstall_project_command = match pip {
        PipEngine::Uv => format!("{} uninstall {project}", pip.command()),
        PipEngine::Pip => format!("{} uninstall {project} --yes", pip.command()),
    };

    EnvironmentCommands {
        environment_name: name.to_string(),
        environment_directory: inputs.engines.conda_root.join("envs").join(name),
        activate_command: format!("conda activate {name}"),
        deactivate_command: "conda deactivate".to_string(),
        create_command,
        create_from_yml_command,
        update_command,
        remove_command: format!("{conda} remove -n {name} --all --yes"),
        conda_dependencies_command,
        pip_dependencies_command,
        install_project_command,
        uninstall_project_command,
        export_yml_command: format!(
            "{conda} env export --name {name} | {} > {yml}",
            inputs.platform.yml_export_filter()
        ),
        export_spec_command: format!("{conda} list -n {name} --explicit -r > {spec}"),
    }
}

/// Resolves a project's environment commands on the current host
pub struct EnvironmentBuilder<'r, R: ProcessRunner + ?Sized> {
    runner: &'r R,
    platform: Platform,
    show_progress: bool,
}

impl<'r, R: ProcessRunner + ?Sized> EnvironmentBuilder<'r, R> {
    /// Create a builder for an explicit platform
    pub fn new(runner: &'r R, platform: Platform) -> Self {
        Self {
            runner,
            platform,
            show_progress: false,
        }
    }

    /// Show a spinner while probing engines
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Resolve every environment command for the project
    ///
    /// `python_version` is only needed by commands that create the environment; omit it for
    /// read-only workflows such as export.
    pub async fn build(
        &self,
        project_root: &Path,
        environment_base_name: &str,
        python_version: Option<&str>,
    ) -> Result<EnvironmentCommands, AppError> {
        let files = EnvironmentFiles::resolve(project_root, environment_base_name, self.platform);
        let yml_exists = files.yml_exists();

        let (metadata, dependencies) = classify_project(project_root)?;

        let mut progress = Progress::new(self.show_progress);
        progress.spinner("Resolving conda and pip engines...");
        let engines = EngineSelection::detect(self.runner).await;
        progress.finish_and_clear();
        let engines = engines?;

        Ok(assemble(&EnvironmentInputs {
            platform: self.platform,
            files: &files,
            yml_exists,
            project_name: &metadata.name,
            python_version,
            dependencies: &dependencies,
            engines: &engines,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyManifest, DependencySpecifier, UsageReference};
    use crate::engine::tests::MockRunner;
    use crate::engine::CondaEngine;
    use crate::manifest::classify;
    use std::fs;

    fn classified(conda: &[&str], pip: &[&str]) -> ClassifiedDependencies {
        let parse = |raw: &[&str]| -> Vec<DependencySpecifier> {
            raw.iter()
                .map(|s| DependencySpecifier::parse(s).unwrap())
                .collect()
        };
        let manifest = DependencyManifest {
            unconditional: parse(pip),
            conda: parse(conda),
            ..Default::default()
        };
        classify(&manifest, &UsageReference::default()).unwrap()
    }

    fn engines(conda: CondaEngine, pip: PipEngine) -> EngineSelection {
        EngineSelection {
            conda,
            pip,
            conda_root: PathBuf::from("/opt/conda"),
        }
    }

    fn assemble_with(
        platform: Platform,
        yml_exists: bool,
        python_version: Option<&str>,
        deps: &ClassifiedDependencies,
        engines: &EngineSelection,
    ) -> EnvironmentCommands {
        let files = EnvironmentFiles::resolve(Path::new("/proj"), "axa_dev", platform);
        assemble(&EnvironmentInputs {
            platform,
            files: &files,
            yml_exists,
            project_name: "demo-lib",
            python_version,
            dependencies: deps,
            engines,
        })
    }

    #[test]
    fn test_environment_files() {
        let files = EnvironmentFiles::resolve(Path::new("/proj"), "axa_dev", Platform::MacOs);
        assert_eq!(files.environment_name, "axa_dev_osx");
        assert_eq!(files.yml_path, PathBuf::from("/proj/envs/axa_dev_osx.yml"));
        assert_eq!(
            files.spec_path,
            PathBuf::from("/proj/envs/axa_dev_osx_spec.txt")
        );
    }

    #[test]
    fn test_assemble_mamba_uv_linux() {
        let deps = classified(&["numpy"], &["click>=8"]);
        let cmds = assemble_with(
            Platform::Linux,
            false,
            Some("3.12"),
            &deps,
            &engines(CondaEngine::Mamba, PipEngine::Uv),
        );

        assert_eq!(cmds.environment_name(), "axa_dev_lin");
        assert_eq!(
            cmds.environment_directory(),
            Path::new("/opt/conda/envs/axa_dev_lin")
        );
        assert_eq!(cmds.activate_command(), "conda activate axa_dev_lin");
        assert_eq!(cmds.deactivate_command(), "conda deactivate");
        assert_eq!(
            cmds.create_command(),
            Some("mamba create -n axa_dev_lin python=3.12 --yes")
        );
        assert_eq!(
            cmds.conda_dependencies_command(),
            Some("mamba install -n axa_dev_lin \"numpy\" --yes")
        );
        assert_eq!(
            cmds.pip_dependencies_command(),
            Some("uv pip install \"click>=8\" --resolution highest --compile-bytecode")
        );
        assert_eq!(
            cmds.install_project_command(),
            "uv pip install . --resolution highest --reinstall-package demo-lib --compile-bytecode"
        );
        assert_eq!(cmds.uninstall_project_command(), "uv pip uninstall demo-lib");
        assert_eq!(cmds.remove_command(), "mamba remove -n axa_dev_lin --all --yes");
        assert_eq!(
            cmds.export_yml_command(),
            "mamba env export --name axa_dev_lin | head -n -1 > /proj/envs/axa_dev_lin.yml"
        );
        assert_eq!(
            cmds.export_spec_command(),
            "mamba list -n axa_dev_lin --explicit -r > /proj/envs/axa_dev_lin_spec.txt"
        );
        assert_eq!(cmds.create_from_yml_command(), None);
        assert_eq!(cmds.update_command(), None);
    }

    #[test]
    fn test_assemble_conda_pip_fallback_flags() {
        let deps = classified(&[], &["click"]);
        let cmds = assemble_with(
            Platform::Linux,
            false,
            None,
            &deps,
            &engines(CondaEngine::Conda, PipEngine::Pip),
        );

        assert_eq!(
            cmds.pip_dependencies_command(),
            Some("pip install \"click\" --compile")
        );
        assert_eq!(
            cmds.install_project_command(),
            "pip install . --compile --force-reinstall --no-deps"
        );
        assert_eq!(cmds.uninstall_project_command(), "pip uninstall demo-lib --yes");
        assert!(cmds.remove_command().starts_with("conda remove"));
    }

    #[test]
    fn test_empty_categories_yield_none() {
        let deps = classified(&[], &[]);
        let cmds = assemble_with(
            Platform::Linux,
            false,
            Some("3.11"),
            &deps,
            &engines(CondaEngine::Mamba, PipEngine::Uv),
        );
        assert_eq!(cmds.conda_dependencies_command(), None);
        assert_eq!(cmds.pip_dependencies_command(), None);
    }

    #[test]
    fn test_no_python_version_means_no_create() {
        let deps = classified(&["a"], &[]);
        let cmds = assemble_with(
            Platform::Windows,
            false,
            None,
            &deps,
            &engines(CondaEngine::Mamba, PipEngine::Uv),
        );
        assert_eq!(cmds.create_command(), None);
        assert!(cmds.export_yml_command().contains("findstr -v \"prefix\""));
    }

    #[test]
    fn test_yml_commands_when_file_exists() {
        let deps = classified(&[], &[]);
        let cmds = assemble_with(
            Platform::MacOs,
            true,
            None,
            &deps,
            &engines(CondaEngine::Conda, PipEngine::Pip),
        );
        assert_eq!(
            cmds.create_from_yml_command(),
            Some("conda env create -f /proj/envs/axa_dev_osx.yml --yes")
        );
        assert_eq!(
            cmds.update_command(),
            Some("conda env update -n axa_dev_osx -f /proj/envs/axa_dev_osx.yml --prune")
        );
        assert_eq!(
            cmds.export_yml_command(),
            "conda env export --name axa_dev_osx | tail -r | tail -n +2 | tail -r > /proj/envs/axa_dev_osx.yml"
        );
    }

    fn write_project(root: &Path) {
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("envs")).unwrap();
        fs::write(
            root.join("pyproject.toml"),
            r#"
[project]
name = "demo-lib"
dependencies = ["click"]

[project.optional-dependencies]
conda = ["numpy"]
noconda = ["tox-uv"]
"#,
        )
        .unwrap();
        fs::write(root.join("tox.ini"), "[tox]\nrequires =\n    tox-uv\n").unwrap();
    }

    #[tokio::test]
    async fn test_builder_end_to_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_project(temp_dir.path());
        fs::write(temp_dir.path().join("envs/axa_dev_lin.yml"), "name: axa_dev_lin\n").unwrap();

        let runner = MockRunner::new(&["conda", "uv pip"]);
        let cmds = EnvironmentBuilder::new(&runner, Platform::Linux)
            .build(temp_dir.path(), "axa_dev", Some("3.12"))
            .await
            .unwrap();

        assert_eq!(cmds.environment_name(), "axa_dev_lin");
        assert!(cmds.create_from_yml_command().is_some());
        assert_eq!(
            cmds.conda_dependencies_command(),
            Some("conda install -n axa_dev_lin \"numpy\" --yes")
        );
        assert_eq!(
            cmds.pip_dependencies_command(),
            Some("uv pip install \"click\" \"tox-uv\" --resolution highest --compile-bytecode")
        );
        assert!(!cmds.environment_exists());
    }

    #[tokio::test]
    async fn test_builder_propagates_reconciliation_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_project(temp_dir.path());
        fs::write(temp_dir.path().join("tox.ini"), "").unwrap();

        let runner = MockRunner::new(&["conda", "pip"]);
        let err = EnvironmentBuilder::new(&runner, Platform::Linux)
            .build(temp_dir.path(), "axa_dev", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Reconciliation(_)));
        // Classification fails before any probe runs
        assert!(runner.probed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_builder_propagates_engine_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_project(temp_dir.path());

        let runner = MockRunner::new(&[]);
        let err = EnvironmentBuilder::new(&runner, Platform::Linux)
            .build(temp_dir.path(), "axa_dev", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Engine(_)));
    }
}
