//! Host platform resolution and OS-specific shell fragments

use crate::error::PlatformError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported host operating systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Windows (win32)
    Windows,
    /// Linux (linux)
    Linux,
    /// macOS (darwin)
    MacOs,
}

impl Platform {
    /// Parses a Python-style platform name (`win32`, `linux`, `darwin`)
    pub fn from_os_name(os_name: &str) -> Result<Self, PlatformError> {
        match os_name {
            "win32" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "darwin" => Ok(Platform::MacOs),
            other => Err(PlatformError::unsupported(other)),
        }
    }

    /// Resolves the platform this binary runs on
    pub fn host() -> Result<Self, PlatformError> {
        Self::from_os_name(host_os_name())
    }

    /// Returns the Python-style platform name
    pub fn os_name(&self) -> &'static str {
        match self {
            Platform::Windows => "win32",
            Platform::Linux => "linux",
            Platform::MacOs => "darwin",
        }
    }

    /// Suffix appended to environment names and environment files
    pub fn os_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => "_win",
            Platform::Linux => "_lin",
            Platform::MacOs => "_osx",
        }
    }

    /// Pipeline that drops the `prefix:` line from `env export` output
    pub fn yml_export_filter(&self) -> &'static str {
        match self {
            Platform::Windows => "findstr -v \"prefix\"",
            Platform::Linux => "head -n -1",
            Platform::MacOs => "tail -r | tail -n +2 | tail -r",
        }
    }

    /// Builds the full profile for this platform
    pub fn profile(&self) -> PlatformProfile {
        PlatformProfile {
            platform: *self,
            os_suffix: self.os_suffix(),
            shell_is_windows: matches!(self, Platform::Windows),
            yml_export_filter: self.yml_export_filter(),
        }
    }

    /// Returns all supported platforms
    pub fn all() -> &'static [Platform] {
        &[Platform::Windows, Platform::Linux, Platform::MacOs]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.os_name())
    }
}

/// Naming suffix and shell syntax for one host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    /// The platform this profile describes
    pub platform: Platform,
    /// One of `_win`, `_lin`, `_osx`
    pub os_suffix: &'static str,
    /// Whether commands run through `cmd` rather than `sh`
    pub shell_is_windows: bool,
    /// Pipeline fragment stripping the `prefix:` line
    pub yml_export_filter: &'static str,
}

/// Maps a Python-style OS name to its platform profile
pub fn resolve_platform(os_name: &str) -> Result<PlatformProfile, PlatformError> {
    Platform::from_os_name(os_name).map(|p| p.profile())
}

/// The compile-time host OS expressed as a Python-style platform name
pub fn host_os_name() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win32",
        "macos" => "darwin",
        other => other,
    }
}
