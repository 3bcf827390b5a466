//! Dependency specifier and manifest group types

use crate::error::ReconciliationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substrings that terminate the package name inside a PEP 508 specifier
const NAME_TERMINATORS: &[&str] = &[
    "===", "==", ">=", "<=", "~=", "!=", ">", "<", "[", ";", "@", " ", "\t",
];

/// Extracts the base name of a dependency specifier
///
/// The specifier is truncated at the first version operator, extras bracket,
/// environment marker or direct reference. Leading and trailing whitespace is dropped.
pub fn base_name(specifier: &str) -> &str {
    let trimmed = specifier.trim();
    let cut = NAME_TERMINATORS
        .iter()
        .filter_map(|t| trimmed.find(t))
        .min()
        .unwrap_or(trimmed.len());
    trimmed[..cut].trim_end()
}

/// Manifest group a dependency was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyGroup {
    /// project.dependencies, installed with pip
    Unconditional,
    /// Installed with conda, no tox.ini reference required
    Conda,
    /// Installed with conda, must also be referenced by tox.ini
    Condarun,
    /// Installed with pip, must also be referenced by tox.ini
    Noconda,
}

impl DependencyGroup {
    /// Key of the optional-dependencies table, None for the unconditional list
    pub fn table_key(&self) -> Option<&'static str> {
        match self {
            DependencyGroup::Unconditional => None,
            DependencyGroup::Conda => Some("conda"),
            DependencyGroup::Condarun => Some("condarun"),
            DependencyGroup::Noconda => Some("noconda"),
        }
    }

    /// Whether dependencies from this group are installed by conda
    pub fn is_conda(&self) -> bool {
        matches!(self, DependencyGroup::Conda | DependencyGroup::Condarun)
    }

    /// Whether members must also appear in the usage reference
    pub fn requires_usage(&self) -> bool {
        matches!(self, DependencyGroup::Condarun | DependencyGroup::Noconda)
    }

    /// Scan order used during classification
    pub fn all() -> &'static [DependencyGroup] {
        &[
            DependencyGroup::Unconditional,
            DependencyGroup::Conda,
            DependencyGroup::Condarun,
            DependencyGroup::Noconda,
        ]
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyGroup::Unconditional => write!(f, "project.dependencies"),
            DependencyGroup::Conda => write!(f, "conda"),
            DependencyGroup::Condarun => write!(f, "condarun"),
            DependencyGroup::Noconda => write!(f, "noconda"),
        }
    }
}

/// A package requirement such as `numpy>=1.26` or `httpx[http2]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencySpecifier {
    raw: String,
    name_len: usize,
}

impl DependencySpecifier {
    /// Parses a specifier, rejecting ones without a package name
    pub fn parse(raw: &str) -> Result<Self, ReconciliationError> {
        let raw = raw.trim();
        let name = base_name(raw);
        if name.is_empty() {
            return Err(ReconciliationError::invalid_specifier(raw));
        }
        Ok(Self {
            raw: raw.to_string(),
            name_len: name.len(),
        })
    }

    /// The identity key used for duplicate detection
    pub fn base_name(&self) -> &str {
        &self.raw[..self.name_len]
    }

    /// The specifier exactly as declared
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The specifier wrapped in double quotes for shell interpolation
    ///
    /// Characters the shell still interprets inside double quotes are backslash-escaped,
    /// so markers such as `sys_platform == "win32"` survive as one argument.
    pub fn quoted(&self) -> String {
        let mut quoted = String::with_capacity(self.raw.len() + 2);
        quoted.push('"');
        for c in self.raw.chars() {
            if matches!(c, '"' | '\\' | '$' | '`') {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        quoted
    }
}

impl TryFrom<String> for DependencySpecifier {
    type Error = ReconciliationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DependencySpecifier> for String {
    fn from(value: DependencySpecifier) -> Self {
        value.raw
    }
}

impl fmt::Display for DependencySpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
