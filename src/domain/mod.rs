//! Core domain models for projenv
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency specifiers and the manifest groups they are declared in
//! - Declared and referenced dependency sets, and their classified form
//! - Host platform profiles
//! - The resolved environment command set

mod dependency;
pub(crate) mod environment;
mod platform;
mod specifier;

pub use dependency::{ClassifiedDependencies, DependencyManifest, UsageReference};
pub use environment::EnvironmentCommands;
pub use platform::{host_os_name, resolve_platform, Platform, PlatformProfile};
pub use specifier::{base_name, DependencyGroup, DependencySpecifier};
