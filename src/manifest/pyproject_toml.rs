//! pyproject.toml reader for dependency declarations
//!
//! Handles:
//! - project.name
//! - project.dependencies (PEP 621), installed with pip
//! - project.optional-dependencies.{conda,condarun,noconda}

use crate::domain::{DependencyGroup, DependencyManifest, DependencySpecifier};
use crate::error::{AppError, ManifestError};
use std::path::{Path, PathBuf};
use toml::Value;

/// Project metadata relevant to environment management
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// project.name
    pub name: String,
    /// Dependencies split by manifest group
    pub manifest: DependencyManifest,
}

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser {
    path: PathBuf,
}

impl PyprojectTomlParser {
    /// Create a parser that reports errors against `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse project metadata from file content
    pub fn parse(&self, content: &str) -> Result<ProjectMetadata, AppError> {
        let toml: Value = toml::from_str(content).map_err(|e: toml::de::Error| {
            ManifestError::toml_parse_error(&self.path, e.to_string())
        })?;

        let project = toml.get("project");

        let name = project
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ManifestError::MissingProjectName {
                path: self.path.clone(),
            })?
            .to_string();

        let optional = project.and_then(|p| p.get("optional-dependencies"));

        let mut manifest = DependencyManifest::default();
        for group in DependencyGroup::all() {
            let value = match group.table_key() {
                None => project.and_then(|p| p.get("dependencies")),
                Some(key) => optional.and_then(|o| o.get(key)),
            };
            let specs = self.parse_group(*group, value)?;
            match group {
                DependencyGroup::Unconditional => manifest.unconditional = specs,
                DependencyGroup::Conda => manifest.conda = specs,
                DependencyGroup::Condarun => manifest.condarun = specs,
                DependencyGroup::Noconda => manifest.noconda = specs,
            }
        }

        Ok(ProjectMetadata { name, manifest })
    }

    fn parse_group(
        &self,
        group: DependencyGroup,
        value: Option<&Value>,
    ) -> Result<Vec<DependencySpecifier>, AppError> {
        let Some(value) = value else {
            return Ok(Vec::new());
        };

        let invalid = || ManifestError::invalid_group(&self.path, group.to_string());
        let entries = value.as_array().ok_or_else(invalid)?;

        let mut specs = Vec::with_capacity(entries.len());
        for entry in entries {
            let raw = entry.as_str().ok_or_else(invalid)?;
            specs.push(DependencySpecifier::parse(raw)?);
        }
        Ok(specs)
    }
}

/// Read and parse `pyproject.toml` under the project root
pub fn read_project_metadata(project_root: &Path) -> Result<ProjectMetadata, AppError> {
    let path = project_root.join("pyproject.toml");
    let content =
        std::fs::read_to_string(&path).map_err(|e| ManifestError::read_error(&path, e))?;
    PyprojectTomlParser::new(path).parse(&content)
}
