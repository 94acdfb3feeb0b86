//! Checksum-verified bundle discovery index.
//!
//! The index is the single file a consumer fetches first: it lists every
//! platform zip, its SHA-256 checksum, and the triples it supports. A
//! consumer resolves a desired triple by linear scan over `archives`,
//! downloads the matching zip, and verifies the checksum before trusting the
//! contents. The index is recomputed in full on every run; nothing is cached.

use crate::digest::{Sha256Digest, compute_sha256};
use crate::error::{BundlerError, Result};
use crate::manifest::TargetManifest;
use crate::target::{OperatingSystem, PlatformGroup};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// Schema version written to the index.
pub const INDEX_SCHEMA_VERSION: &str = "1.0";

/// Extra SDK-version-qualified triples advertised for Apple platforms, in
/// addition to the generic OS triples derived from target configurations.
///
/// New SDK releases are added here as they ship. The registry is passed into
/// [`build_index`] explicitly so tests can substitute their own table.
pub const EXTRA_APPLE_SDK_TRIPLES: &[(OperatingSystem, &[&str])] = &[
    (
        OperatingSystem::Macos,
        &["arm64-apple-macos26.2", "arm64-apple-macos26.3"],
    ),
    (
        OperatingSystem::Iphone,
        &[
            "arm64-apple-iphoneos26.2",
            "arm64-apple-iphoneos26.3",
            "arm64-apple-iphonesimulator26.2",
            "arm64-apple-iphonesimulator26.3",
        ],
    ),
];

/// One archive referenced by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// File name of the platform zip, relative to the index.
    pub file_name: String,
    /// SHA-256 checksum of the zip's bytes.
    pub checksum: Sha256Digest,
    /// Deduplicated triples the archive supports, in first-seen order.
    pub supported_triples: Vec<String>,
}

/// The top-level discovery index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleIndex {
    /// Schema version, currently `"1.0"`.
    pub schema_version: String,
    /// Archive entries, one per platform group, in group-name order.
    pub archives: Vec<BundleEntry>,
}

/// Build the index over every platform zip produced in this run.
///
/// Groups are visited in name-lexicographic order. Each entry's triples are
/// the first-seen-order deduplicated union of the group's manifest triples;
/// the Apple entry additionally appends the SDK-qualified triples from
/// `extra_sdk_triples` for each operating system present in the group,
/// deduplicated so an extra triple appears once even when several manifests
/// share an OS.
///
/// # Errors
///
/// Returns an error if a zip cannot be hashed or a manifest's target name
/// cannot be classified.
pub fn build_index(
    zips_by_group: &BTreeMap<PlatformGroup, Utf8PathBuf>,
    manifests_by_group: &BTreeMap<PlatformGroup, Vec<TargetManifest>>,
    extra_sdk_triples: &[(OperatingSystem, &[&str])],
) -> Result<BundleIndex> {
    let mut archives = Vec::with_capacity(zips_by_group.len());

    for (group, zip_path) in zips_by_group {
        let manifests: &[TargetManifest] = manifests_by_group
            .get(group)
            .map_or(&[], |group_manifests| group_manifests.as_slice());

        let mut triples = ordered_triple_union(manifests);
        if *group == PlatformGroup::Apple {
            append_extra_sdk_triples(&mut triples, manifests, extra_sdk_triples)?;
        }

        let file_name = zip_path
            .file_name()
            .ok_or_else(|| BundlerError::MissingInstallArtifact {
                path: zip_path.clone(),
            })?
            .to_owned();

        archives.push(BundleEntry {
            file_name,
            checksum: compute_sha256(zip_path)?,
            supported_triples: triples,
        });
    }

    Ok(BundleIndex {
        schema_version: INDEX_SCHEMA_VERSION.to_owned(),
        archives,
    })
}

/// Serialize the index and write it to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_index(index: &BundleIndex, path: &Utf8Path) -> Result<()> {
    let json = serde_json::to_string_pretty(index)?;
    fs::write(path, json)?;
    Ok(())
}

/// Union of every manifest's triples, first-seen order, no duplicates.
fn ordered_triple_union(manifests: &[TargetManifest]) -> Vec<String> {
    let mut triples = Vec::new();
    for manifest in manifests {
        for triple in &manifest.supported_triples {
            if !triples.contains(triple) {
                triples.push(triple.clone());
            }
        }
    }
    triples
}

/// Append each manifest OS's extra SDK triples, once per triple.
fn append_extra_sdk_triples(
    triples: &mut Vec<String>,
    manifests: &[TargetManifest],
    registry: &[(OperatingSystem, &[&str])],
) -> Result<()> {
    let mut seen: Vec<&str> = Vec::new();
    for manifest in manifests {
        let os = OperatingSystem::from_target_name(&manifest.target_name)?;
        let extras: &[&str] = registry
            .iter()
            .find(|(registry_os, _)| *registry_os == os)
            .map_or(&[], |&(_, extras)| extras);
        for &extra in extras {
            if !seen.contains(&extra) {
                seen.push(extra);
                triples.push(extra.to_owned());
            }
        }
    }
    Ok(())
}
