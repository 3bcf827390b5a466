//! projenv - conda/pip project environment automation library
//!
//! This library provides the core functionality for managing a python project's
//! development environment:
//! - Dependency reconciliation between pyproject.toml and tox.ini
//! - Host platform and package manager engine resolution
//! - Environment lifecycle command construction
//! - Type stub placement and typed-marker maintenance
//! - PyPI upload token storage

pub mod cli;
pub mod commands;
pub mod console;
pub mod domain;
pub mod engine;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod project;
pub mod pypi;
pub mod stubs;
