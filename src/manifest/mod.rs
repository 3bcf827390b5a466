//! Project metadata reading and dependency reconciliation
//!
//! This module provides functionality to:
//! - Read dependency declarations from pyproject.toml
//! - Read tool-level dependency references from tox.ini
//! - Cross-validate both sources and partition dependencies between conda and pip

mod classifier;
mod pyproject_toml;
mod tox_ini;

pub use classifier::classify;
pub use pyproject_toml::{read_project_metadata, ProjectMetadata, PyprojectTomlParser};
pub use tox_ini::{parse_usage_reference, read_usage_reference};

use crate::domain::ClassifiedDependencies;
use crate::error::AppError;
use std::path::Path;

/// Reads both metadata files fresh from disk and classifies the declared dependencies
pub fn classify_project(
    project_root: &Path,
) -> Result<(ProjectMetadata, ClassifiedDependencies), AppError> {
    let metadata = read_project_metadata(project_root)?;
    let usage = read_usage_reference(project_root)?;
    let classified = classify(&metadata.manifest, &usage)?;
    Ok((metadata, classified))
}
