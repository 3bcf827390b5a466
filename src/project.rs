//! Project layout resolution
//!
//! A project root contains `src/`, `envs/`, `pyproject.toml` and `tox.ini`. The library root
//! is either `src/` itself or the single package directory directly below it.

use crate::error::{AppError, IoError, ProjectError};
use std::fs;
use std::path::{Path, PathBuf};

/// Entries that must exist in a project root, with whether each is a directory
const REQUIRED_ENTRIES: &[(&str, bool)] = &[
    ("src", true),
    ("envs", true),
    ("pyproject.toml", false),
    ("tox.ini", false),
];

/// Python package marker
const PACKAGE_MARKER: &str = "__init__.py";

/// Verify that `dir` is a project root and return its absolute path
pub fn resolve_project_directory(dir: &Path) -> Result<PathBuf, AppError> {
    let missing: Vec<String> = REQUIRED_ENTRIES
        .iter()
        .filter(|(name, is_dir)| {
            let path = dir.join(name);
            if *is_dir {
                !path.is_dir()
            } else {
                !path.is_file()
            }
        })
        .map(|(name, is_dir)| {
            if *is_dir {
                format!("{}/", name)
            } else {
                name.to_string()
            }
        })
        .collect();

    if !missing.is_empty() {
        return Err(ProjectError::NotAProject {
            path: dir.to_path_buf(),
            missing,
        }
        .into());
    }

    Ok(fs::canonicalize(dir).map_err(|e| IoError::generic(dir, e))?)
}

/// Resolve the library root: `src/` or the one package directory directly under it
pub fn resolve_library_root(project_root: &Path) -> Result<PathBuf, AppError> {
    let src = project_root.join("src");
    if src.join(PACKAGE_MARKER).is_file() {
        return Ok(src);
    }

    let entries = fs::read_dir(&src).map_err(|e| IoError::generic(&src, e))?;
    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IoError::generic(&src, e))?.path();
        if path.is_dir() && path.join(PACKAGE_MARKER).is_file() {
            candidates.push(path);
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        count => Err(ProjectError::AmbiguousLibraryRoot {
            path: project_root.to_path_buf(),
            count,
        }
        .into()),
    }
}

/// Recreate an empty `recipe/` directory for conda-forge recipe generation
pub fn generate_recipe_folder(project_root: &Path) -> Result<PathBuf, IoError> {
    let recipe = project_root.join("recipe");
    if recipe.exists() {
        fs::remove_dir_all(&recipe).map_err(|e| IoError::generic(&recipe, e))?;
    }
    fs::create_dir_all(&recipe).map_err(|e| IoError::generic(&recipe, e))?;
    Ok(recipe)
}
