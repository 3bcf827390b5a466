//! Dependency declaration and classification structures

use super::{DependencyGroup, DependencySpecifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dependencies declared in pyproject.toml, split by manifest group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyManifest {
    /// project.dependencies
    pub unconditional: Vec<DependencySpecifier>,
    /// optional-dependencies.conda
    pub conda: Vec<DependencySpecifier>,
    /// optional-dependencies.condarun
    pub condarun: Vec<DependencySpecifier>,
    /// optional-dependencies.noconda
    pub noconda: Vec<DependencySpecifier>,
}

impl DependencyManifest {
    /// Returns the specifiers declared in one group
    pub fn group(&self, group: DependencyGroup) -> &[DependencySpecifier] {
        match group {
            DependencyGroup::Unconditional => &self.unconditional,
            DependencyGroup::Conda => &self.conda,
            DependencyGroup::Condarun => &self.condarun,
            DependencyGroup::Noconda => &self.noconda,
        }
    }

    /// Iterates every declaration in scan order, tagged with its group
    pub fn declarations(&self) -> impl Iterator<Item = (DependencyGroup, &DependencySpecifier)> {
        DependencyGroup::all()
            .iter()
            .flat_map(move |g| self.group(*g).iter().map(move |s| (*g, s)))
    }

    /// Total number of declared specifiers
    pub fn len(&self) -> usize {
        DependencyGroup::all()
            .iter()
            .map(|g| self.group(*g).len())
            .sum()
    }

    /// Returns true if nothing is declared
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Base names referenced by tox.ini `deps` and `requires`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReference {
    names: BTreeSet<String>,
}

impl UsageReference {
    /// Creates a usage reference from base names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the base name is referenced
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Iterates referenced names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of referenced names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is referenced
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Quoted specifiers partitioned between conda and pip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedDependencies {
    conda_dependencies: Vec<String>,
    pip_dependencies: Vec<String>,
}

impl ClassifiedDependencies {
    pub(crate) fn new(conda_dependencies: Vec<String>, pip_dependencies: Vec<String>) -> Self {
        Self {
            conda_dependencies,
            pip_dependencies,
        }
    }

    /// conda and condarun specifiers, quoted, in declaration order
    pub fn conda_dependencies(&self) -> &[String] {
        &self.conda_dependencies
    }

    /// Unconditional and noconda specifiers, quoted, in declaration order
    pub fn pip_dependencies(&self) -> &[String] {
        &self.pip_dependencies
    }

    /// Total number of classified specifiers
    pub fn len(&self) -> usize {
        self.conda_dependencies.len() + self.pip_dependencies.len()
    }

    /// Returns true if no dependency was classified
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
