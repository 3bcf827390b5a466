//! Dependency reconciliation and conda/pip partitioning
//!
//! Every base name may be declared once across all manifest groups. Names in `condarun`
//! and `noconda` must be referenced by tox.ini, and every tox.ini reference must be
//! declared somewhere in pyproject.toml.

use crate::domain::{
    ClassifiedDependencies, DependencyGroup, DependencyManifest, DependencySpecifier,
    UsageReference,
};
use crate::error::ReconciliationError;
use std::collections::HashMap;

/// First declaration seen for a base name
#[derive(Debug, Clone, Copy)]
struct Declaration<'a> {
    group: DependencyGroup,
    specifier: &'a DependencySpecifier,
}

/// Reconciles the manifest with the usage reference and partitions it
pub fn classify(
    manifest: &DependencyManifest,
    usage: &UsageReference,
) -> Result<ClassifiedDependencies, ReconciliationError> {
    let declared = manifest.declarations().try_fold(
        HashMap::<&str, Declaration>::new(),
        |mut seen, (group, specifier)| {
            if let Some(first) = seen.get(specifier.base_name()) {
                return Err(ReconciliationError::Duplicate {
                    name: specifier.base_name().to_string(),
                    first: first.specifier.to_string(),
                    first_group: first.group,
                    second: specifier.to_string(),
                    second_group: group,
                });
            }
            seen.insert(specifier.base_name(), Declaration { group, specifier });
            Ok(seen)
        },
    )?;

    let missing: Vec<String> = manifest
        .declarations()
        .filter(|(group, spec)| group.requires_usage() && !usage.contains(spec.base_name()))
        .map(|(_, spec)| spec.base_name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReconciliationError::missing_from_usage(missing));
    }

    let undeclared: Vec<String> = usage
        .iter()
        .filter(|name| !declared.contains_key(name))
        .map(str::to_string)
        .collect();
    if !undeclared.is_empty() {
        return Err(ReconciliationError::undeclared(undeclared));
    }

    let quoted = |keep: fn(&DependencyGroup) -> bool| -> Vec<String> {
        manifest
            .declarations()
            .filter(|(group, _)| keep(group))
            .map(|(_, spec)| spec.quoted())
            .collect()
    };

    let conda = quoted(DependencyGroup::is_conda);
    let pip = quoted(|g| !g.is_conda());
    Ok(ClassifiedDependencies::new(conda, pip))
}
