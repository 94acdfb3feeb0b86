//! Build and bundling pipeline orchestration.
//!
//! Ties the lower-level modules together into the two operations CI invokes:
//! building one target (toolchain run plus manifest write) and turning every
//! recorded manifest into per-platform bundles plus the discovery index. Both
//! operations are fully sequential; a failure in any step aborts the run.

use crate::builder::CmakeBuilder;
use crate::bundle::{BundleAssembler, BundleParams, DllArtifact};
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::grouping::group_by_platform;
use crate::index::{build_index, write_index};
use crate::layout::WorkspaceLayout;
use crate::manifest::{ManifestStore, TargetManifest};
use crate::target::{OperatingSystem, TargetConfig};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::collections::BTreeMap;
use std::fs;

/// Build one target with the external toolchain and record its manifest.
///
/// The manifest is written only after the toolchain's install step succeeds,
/// so a recorded target always has a complete install layout.
///
/// # Errors
///
/// Returns a toolchain error when any CMake phase fails, or a store error
/// when the manifest cannot be written.
pub fn build_bundle_target(
    executor: &dyn CommandExecutor,
    layout: &WorkspaceLayout,
    store: &dyn ManifestStore,
    config: &TargetConfig,
    source_dir: &Utf8Path,
    sdk_path: Option<&Utf8Path>,
) -> Result<TargetManifest> {
    let mut builder = CmakeBuilder::new(executor, layout, source_dir);
    if let Some(sdk) = sdk_path {
        builder = builder.with_sdk_path(sdk);
    }
    builder.build(config)?;

    let manifest = TargetManifest::for_target(config, layout);
    store.put(&manifest)?;
    Ok(manifest)
}

/// Assemble one artifact bundle per platform group and write the discovery
/// index referencing them all. Returns the index path.
///
/// Manifests are read back from the store (sorted by target name), grouped,
/// and bundled group by group; the index is then recomputed in full from the
/// zips' current bytes.
///
/// # Errors
///
/// Returns an error when manifests cannot be read, a manifest cannot be
/// classified, an install directory is missing, or writing a bundle, zip, or
/// the index fails.
pub fn create_artifact_bundles(
    layout: &WorkspaceLayout,
    store: &dyn ManifestStore,
    params: &BundleParams<'_>,
    dll_registry: &[DllArtifact],
    extra_sdk_triples: &[(OperatingSystem, &[&str])],
) -> Result<Utf8PathBuf> {
    fs::create_dir_all(layout.dist_dir())?;

    let manifests = store.list_all()?;
    debug!("bundling {} manifest(s)", manifests.len());
    let manifests_by_group = group_by_platform(&manifests)?;

    let assembler = BundleAssembler::new(layout, params, dll_registry);
    let mut zips_by_group = BTreeMap::new();
    for (group, group_manifests) in &manifests_by_group {
        let zip_path = assembler.assemble(*group, group_manifests)?;
        zips_by_group.insert(*group, zip_path);
    }

    let index = build_index(&zips_by_group, &manifests_by_group, extra_sdk_triples)?;
    let index_path = layout.index_path(params.base_name);
    write_index(&index, &index_path)?;
    Ok(index_path)
}
