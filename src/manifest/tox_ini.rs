//! tox.ini scanner for tool-level dependency references
//!
//! Only `deps =` and `requires =` keys are read. Each key contributes its inline value
//! and every following indented line, one requirement per line:
//!
//! ```ini
//! [tox]
//! requires =
//!     tox>=4
//!     tox-uv
//!
//! [testenv:lint]
//! deps =
//!     mypy
//!     ruff>=0.4
//!     py312: pytest>=8
//! ```
//!
//! Factor-conditional entries (`py312: pytest>=8`) contribute the requirement after the
//! factor list. Comment lines never end a block.

use crate::domain::{base_name, UsageReference};
use crate::error::{AppError, ManifestError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

const REFERENCE_KEYS: &[&str] = &["deps", "requires"];

/// Leading tox factor list, e.g. `lint:`, `py311,py312:` or `!ci:`
static FACTOR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!?[\w.\-]+(?:\s*,\s*!?[\w.\-]+)*\s*:\s*").unwrap()
});

/// Extracts referenced base names from tox.ini text
pub fn parse_usage_reference(content: &str) -> UsageReference {
    let mut names = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let is_continuation = line.starts_with([' ', '\t']);
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with(['#', ';']) {
            continue;
        }

        if is_continuation && in_block {
            push_entry(trimmed, &mut names);
            continue;
        }

        in_block = false;
        if let Some((key, value)) = trimmed.split_once('=') {
            if REFERENCE_KEYS.contains(&key.trim()) {
                in_block = true;
                push_entry(value.trim(), &mut names);
            }
        }
    }

    UsageReference::new(names)
}

fn push_entry(entry: &str, names: &mut Vec<String>) {
    let entry = match FACTOR_PREFIX_RE.find(entry) {
        Some(prefix) => &entry[prefix.end()..],
        None => entry,
    };
    if entry.is_empty() || entry.starts_with(['#', ';', '-', '{']) {
        return;
    }
    let name = base_name(entry);
    if !name.is_empty() {
        names.push(name.to_string());
    }
}

/// Read `tox.ini` under the project root and extract its usage reference
pub fn read_usage_reference(project_root: &Path) -> Result<UsageReference, AppError> {
    let path = project_root.join("tox.ini");
    let content =
        std::fs::read_to_string(&path).map_err(|e| ManifestError::read_error(&path, e))?;
    Ok(parse_usage_reference(&content))
}
