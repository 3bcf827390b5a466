//! Type stub placement
//!
//! stubgen writes `.pyi` files into `stubs/<library>/...`. This module moves them to the
//! matching locations under the library root, collapses the numbered copies some platforms
//! produce (`module 1.pyi`, `module 2.pyi`) and keeps a single `py.typed` marker at the root.

use crate::error::StubError;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// File whose presence marks a stub package root
pub const STUB_ROOT_MARKER: &str = "__init__.pyi";

/// Extension of relocated stub files
pub const STUB_EXTENSION: &str = "pyi";

/// Marker announcing inline type information
pub const TYPED_MARKER: &str = "py.typed";

// Matches: "name 2.pyi" -> base "name", number 2, extension "pyi"
static NUMBERED_COPY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<base>.+) (?P<n>\d+)\.(?P<ext>[^.]+)$").unwrap());

/// Filesystem changes made while placing stubs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// Destination paths of moved stubs
    pub moved: Vec<PathBuf>,
    /// Result of the duplicate cleanup pass
    pub deduplication: DeduplicationReport,
}

/// Files renamed or removed by the duplicate cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeduplicationReport {
    /// (from, to) pairs
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Deleted lower-numbered copies
    pub removed: Vec<PathBuf>,
}

/// Locate the single stub package root directly under `stubs_root`
pub fn find_stub_root(stubs_root: &Path) -> Result<PathBuf, StubError> {
    let entries = fs::read_dir(stubs_root).map_err(|e| StubError::io(stubs_root, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StubError::io(stubs_root, e))?.path();
        if path.is_dir() && path.join(STUB_ROOT_MARKER).is_file() {
            candidates.push(path);
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        count => Err(StubError::ambiguous_root(stubs_root, count)),
    }
}

/// Move every stub under the stub package root to the mirrored path under `library_root`
///
/// Existing files at the destination are overwritten. The stub tree's directories are left
/// in place. Not transactional: a failure midway leaves earlier moves applied.
pub fn relocate(stubs_root: &Path, library_root: &Path) -> Result<RelocationReport, StubError> {
    let source_root = find_stub_root(stubs_root)?;

    let mut moved = Vec::new();
    for stub in collect_files(&source_root, STUB_EXTENSION)? {
        let relative = stub
            .strip_prefix(&source_root)
            .map_err(|e| StubError::io(&stub, std::io::Error::other(e)))?;
        let destination = library_root.join(relative);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| StubError::io(parent, e))?;
        }
        if destination.exists() {
            fs::remove_file(&destination).map_err(|e| StubError::io(&destination, e))?;
        }
        move_file(&stub, &destination)?;
        moved.push(destination);
    }

    let deduplication = deduplicate(library_root)?;
    Ok(RelocationReport {
        moved,
        deduplication,
    })
}

/// Collapse `<base> <n>.pyi` copies into `<base>.pyi`, keeping the highest number
///
/// Groups are formed per directory. A plain `<base>.pyi` next to numbered copies counts as
/// number 0. A lone numbered file is still renamed.
pub fn deduplicate(library_root: &Path) -> Result<DeduplicationReport, StubError> {
    let mut groups: BTreeMap<(PathBuf, String), Vec<(u64, PathBuf)>> = BTreeMap::new();

    for file in collect_files(library_root, STUB_EXTENSION)? {
        let (Some(parent), Some(file_name)) =
            (file.parent(), file.file_name().and_then(|n| n.to_str()))
        else {
            continue;
        };

        let (canonical, number) = match split_numbered(file_name) {
            Some((canonical, number)) => (canonical, number),
            None => (file_name.to_string(), 0),
        };
        groups
            .entry((parent.to_path_buf(), canonical))
            .or_default()
            .push((number, file));
    }

    let mut report = DeduplicationReport::default();
    for ((parent, canonical), mut members) in groups {
        members.sort_by(|a, b| b.0.cmp(&a.0));
        let target = parent.join(&canonical);

        let mut members = members.into_iter();
        let Some((_, kept)) = members.next() else {
            continue;
        };

        for (_, duplicate) in members {
            fs::remove_file(&duplicate).map_err(|e| StubError::io(&duplicate, e))?;
            report.removed.push(duplicate);
        }

        if kept != target {
            fs::rename(&kept, &target).map_err(|e| StubError::io(&kept, e))?;
            report.renamed.push((kept, target));
        }
    }

    Ok(report)
}

/// Ensure `py.typed` exists at the library root and nowhere below it
///
/// Returns the nested markers that were removed.
pub fn generate_typed_marker(library_root: &Path) -> Result<Vec<PathBuf>, StubError> {
    let root_marker = library_root.join(TYPED_MARKER);
    if !root_marker.exists() {
        fs::write(&root_marker, b"").map_err(|e| StubError::io(&root_marker, e))?;
    }

    let mut removed = Vec::new();
    for entry in WalkDir::new(library_root).min_depth(2) {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_file() && entry.file_name() == TYPED_MARKER {
            let path = entry.into_path();
            fs::remove_file(&path).map_err(|e| StubError::io(&path, e))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

/// Delete every `.pyi` file below the library root
pub fn delete_stubs(library_root: &Path) -> Result<Vec<PathBuf>, StubError> {
    let stubs = collect_files(library_root, STUB_EXTENSION)?;
    for stub in &stubs {
        fs::remove_file(stub).map_err(|e| StubError::io(stub, e))?;
    }
    Ok(stubs)
}

/// Splits "name 2.pyi" into ("name.pyi", 2)
fn split_numbered(file_name: &str) -> Option<(String, u64)> {
    let caps = NUMBERED_COPY_RE.captures(file_name)?;
    let number = caps.name("n")?.as_str().parse().ok()?;
    Some((format!("{}.{}", &caps["base"], &caps["ext"]), number))
}

fn collect_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, StubError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn move_file(from: &Path, to: &Path) -> Result<(), StubError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    fs::copy(from, to).map_err(|e| StubError::io(to, e))?;
    fs::remove_file(from).map_err(|e| StubError::io(from, e))
}

fn walk_error(e: walkdir::Error) -> StubError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
    StubError::io(path, e.into())
}
