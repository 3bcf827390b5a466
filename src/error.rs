//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ReconciliationError: pyproject.toml / tox.ini dependency declarations disagree
//! - PlatformError: host OS outside the supported set
//! - EngineError: no usable conda or pip executable
//! - StubError: stub tree cannot be mapped onto the library
//! - ProjectError: working directory is not a recognizable project
//! - ManifestError: metadata files cannot be read or parsed
//! - PypiError: PyPI token could not be acquired or stored
//! - IoError: File system operation failures

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DependencyGroup;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Dependency reconciliation errors
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Host platform errors
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Package manager engine errors
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Stub placement errors
    #[error(transparent)]
    Stub(#[from] StubError),

    /// Project layout errors
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// PyPI token errors
    #[error(transparent)]
    Pypi(#[from] PypiError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors raised while cross-validating dependency declarations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    /// The same base name is declared twice
    #[error(
        "dependency '{name}' is declared more than once: first as '{first}' in {first_group}, \
         then as '{second}' in {second_group}"
    )]
    Duplicate {
        name: String,
        first: String,
        first_group: DependencyGroup,
        second: String,
        second_group: DependencyGroup,
    },

    /// condarun / noconda members absent from tox.ini
    #[error("dependencies declared in condarun/noconda are missing from tox.ini: {}", .names.join(", "))]
    MissingFromUsage { names: Vec<String> },

    /// tox.ini references names that pyproject.toml never declares
    #[error("tox.ini references dependencies not declared in pyproject.toml: {}", .names.join(", "))]
    Undeclared { names: Vec<String> },

    /// Specifier without a package name
    #[error("invalid dependency specifier '{specifier}': no package name")]
    InvalidSpecifier { specifier: String },
}

/// Errors related to the host platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// OS name outside win32 / linux / darwin
    #[error("unsupported host OS '{os_name}': expected one of win32, linux, darwin")]
    UnsupportedPlatform { os_name: String },
}

/// Errors related to package manager engines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Every candidate probe failed
    #[error("no working engine found, tried: {}", .candidates.join(", "))]
    NotFound { candidates: Vec<String> },

    /// The conda installation root could not be determined
    #[error("unable to resolve the environment storage root using '{engine}'")]
    RootNotFound { engine: String },
}

/// Errors related to stub file placement
#[derive(Error, Debug)]
pub enum StubError {
    /// Zero or several subdirectories carry a package-root marker
    #[error(
        "expected exactly one subdirectory with __init__.pyi in {path}, but found {count}"
    )]
    AmbiguousStubRoot { path: PathBuf, count: usize },

    /// Filesystem failure while moving or renaming stubs
    #[error("stub operation failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the project layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// Missing src/, envs/, pyproject.toml or tox.ini
    #[error(
        "{path} is not a project root: expected src/, envs/, pyproject.toml and tox.ini, missing {}",
        .missing.join(", ")
    )]
    NotAProject { path: PathBuf, missing: Vec<String> },

    /// Library root could not be narrowed to one directory
    #[error(
        "unable to resolve the library root under {path}: no __init__.py in src/ and found {count} \
         sub-directories with __init__.py"
    )]
    AmbiguousLibraryRoot { path: PathBuf, count: usize },

    /// No environment file to import from
    #[error("environment file not found: {path}")]
    MissingEnvironmentFile { path: PathBuf },

    /// Environment is required but absent
    #[error("environment '{name}' does not exist")]
    EnvironmentMissing { name: String },
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error (for pyproject.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// Dependency group is not an array of strings
    #[error("invalid dependency group '{group}' in {path}: expected an array of strings")]
    InvalidGroup { path: PathBuf, group: String },

    /// project.name missing
    #[error("missing project.name in {path}")]
    MissingProjectName { path: PathBuf },
}

/// Errors related to PyPI token acquisition
#[derive(Error, Debug)]
pub enum PypiError {
    /// Token without the 'pypi-' prefix
    #[error("invalid PyPI token: tokens must start with 'pypi-'")]
    InvalidToken,

    /// User declined to retry after a rejected token
    #[error("PyPI token acquisition aborted by user")]
    Aborted,

    /// Terminal prompt failed, e.g. stdin is not interactive
    #[error("unable to prompt for the PyPI token: {message}")]
    Prompt { message: String },

    /// Failed to write the .pypirc file
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Generic IO error
    #[error("IO error at {path}: {source}")]
    Generic {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReconciliationError {
    /// Creates a new MissingFromUsage error
    pub fn missing_from_usage(names: Vec<String>) -> Self {
        ReconciliationError::MissingFromUsage { names }
    }

    /// Creates a new Undeclared error
    pub fn undeclared(names: Vec<String>) -> Self {
        ReconciliationError::Undeclared { names }
    }

    /// Creates a new InvalidSpecifier error
    pub fn invalid_specifier(specifier: impl Into<String>) -> Self {
        ReconciliationError::InvalidSpecifier {
            specifier: specifier.into(),
        }
    }
}

impl PlatformError {
    /// Creates a new UnsupportedPlatform error
    pub fn unsupported(os_name: impl Into<String>) -> Self {
        PlatformError::UnsupportedPlatform {
            os_name: os_name.into(),
        }
    }
}

impl EngineError {
    /// Creates a new NotFound error
    pub fn not_found<S: AsRef<str>>(candidates: &[S]) -> Self {
        EngineError::NotFound {
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }
}

impl StubError {
    /// Creates a new AmbiguousStubRoot error
    pub fn ambiguous_root(path: impl Into<PathBuf>, count: usize) -> Self {
        StubError::AmbiguousStubRoot {
            path: path.into(),
            count,
        }
    }

    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StubError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidGroup error
    pub fn invalid_group(path: impl Into<PathBuf>, group: impl Into<String>) -> Self {
        ManifestError::InvalidGroup {
            path: path.into(),
            group: group.into(),
        }
    }
}

impl PypiError {
    /// Creates a new Prompt error
    pub fn prompt(message: impl Into<String>) -> Self {
        PypiError::Prompt {
            message: message.into(),
        }
    }

    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PypiError::Write {
            path: path.into(),
            source,
        }
    }
}

impl IoError {
    /// Creates a new DirectoryNotFound error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        IoError::DirectoryNotFound { path: path.into() }
    }

    /// Creates a new Generic IO error
    pub fn generic(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Generic {
            path: path.into(),
            source,
        }
    }
}
