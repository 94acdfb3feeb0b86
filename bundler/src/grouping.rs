//! Platform grouping of target manifests.
//!
//! Buckets manifests into apple / windows / linux groups by recovering each
//! manifest's operating system from its target name. Grouping is a strict
//! partition: every manifest lands in exactly one group, and a manifest that
//! cannot be classified is a fatal error rather than being dropped.

use crate::error::Result;
use crate::manifest::TargetManifest;
use crate::target::{OperatingSystem, PlatformGroup};
use std::collections::BTreeMap;

/// Partition manifests into platform groups, preserving input order within
/// each group.
///
/// # Errors
///
/// Returns [`UnknownTarget`](crate::error::BundlerError::UnknownTarget) when
/// a manifest's target name matches no known operating system.
pub fn group_by_platform(
    manifests: &[TargetManifest],
) -> Result<BTreeMap<PlatformGroup, Vec<TargetManifest>>> {
    let mut groups: BTreeMap<PlatformGroup, Vec<TargetManifest>> = BTreeMap::new();
    for manifest in manifests {
        let os = OperatingSystem::from_target_name(&manifest.target_name)?;
        groups
            .entry(os.platform_group())
            .or_default()
            .push(manifest.clone());
    }
    Ok(groups)
}
