//! Artifact bundle assembly.
//!
//! For one platform group, materialises a bundle directory containing every
//! target's libraries, headers, and (on Windows) binaries, plus the shared
//! descriptor file, a version stamp, and an `info.json` describing the
//! artifacts — then zips it into the distribution directory. Assembly is
//! destructive and idempotent: any pre-existing bundle directory or stale zip
//! is removed first. A failed run may leave a partial bundle directory
//! behind; it is never trusted, because the next run deletes it before
//! writing.

use crate::error::{BundlerError, Result};
use crate::layout::{BUNDLE_DIR_SUFFIX, WorkspaceLayout};
use crate::manifest::TargetManifest;
use crate::target::PlatformGroup;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Schema version written to `info.json`.
pub const INFO_SCHEMA_VERSION: &str = "1.0";

/// Name of the static-library artifact in every bundle.
pub const STATIC_LIBRARY_ARTIFACT: &str = "dawn_webgpu";

/// File name of the version stamp written into each bundle.
pub const VERSION_STAMP_FILE: &str = "dawn_version.json";

/// One auxiliary DLL variant: a fixed path and the triple it serves.
#[derive(Debug, Clone, Copy)]
pub struct DllVariant {
    /// Path of the DLL inside the bundle.
    pub path: &'static str,
    /// Target triple the DLL is valid for.
    pub triple: &'static str,
}

/// One auxiliary DLL artifact registered in the Windows bundle.
#[derive(Debug, Clone, Copy)]
pub struct DllArtifact {
    /// Artifact name as it appears in `info.json`.
    pub name: &'static str,
    /// Artifact version string.
    pub version: &'static str,
    /// Fixed per-architecture variants.
    pub variants: &'static [DllVariant],
}

/// The auxiliary DLLs shipped in the Windows bundle: the DXC compiler, its IL
/// translator, and the redistributable D3D compiler.
///
/// These are not derived from manifests; the paths and triples are a fixed
/// table matching the Windows install layout.
pub const WINDOWS_DLL_ARTIFACTS: &[DllArtifact] = &[
    DllArtifact {
        name: "dxcompiler",
        version: "1.0.0",
        variants: &[
            DllVariant {
                path: "windows_arm64_release/bin/dxcompiler.dll",
                triple: "aarch64-unknown-windows-msvc",
            },
            DllVariant {
                path: "windows_x86_64_release/bin/dxcompiler.dll",
                triple: "x86_64-unknown-windows-msvc",
            },
        ],
    },
    DllArtifact {
        name: "dxil",
        version: "1.0.0",
        variants: &[
            DllVariant {
                path: "windows_arm64_release/bin/dxil.dll",
                triple: "aarch64-unknown-windows-msvc",
            },
            DllVariant {
                path: "windows_x86_64_release/bin/dxil.dll",
                triple: "x86_64-unknown-windows-msvc",
            },
        ],
    },
    DllArtifact {
        name: "d3dcompiler_47",
        version: "1.0.0",
        variants: &[
            DllVariant {
                path: "windows_arm64_release/bin/d3dcompiler_47.dll",
                triple: "aarch64-unknown-windows-msvc",
            },
            DllVariant {
                path: "windows_x86_64_release/bin/d3dcompiler_47.dll",
                triple: "x86_64-unknown-windows-msvc",
            },
        ],
    },
];

/// Artifact kind discriminator in `info.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// A static library with header metadata.
    #[serde(rename = "staticLibrary")]
    StaticLibrary,
    /// An auxiliary Windows DLL.
    #[serde(rename = "experimentalWindowsDLL")]
    ExperimentalWindowsDll,
}

/// Header metadata attached to static-library variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticLibraryMetadata {
    /// Header directories, relative to the bundle root.
    pub header_paths: Vec<String>,
}

/// One artifact variant in `info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactVariant {
    /// Path of the variant's payload, relative to the bundle root.
    pub path: String,
    /// Header metadata (static libraries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_library_metadata: Option<StaticLibraryMetadata>,
    /// Target triples this variant is valid for.
    pub supported_triples: Vec<String>,
}

/// One named artifact in `info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactEntry {
    /// Artifact version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Artifact kind.
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    /// Variants, one per target or fixed table row.
    pub variants: Vec<ArtifactVariant>,
}

/// The bundle-local `info.json` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleInfo {
    /// Schema version, currently `"1.0"`.
    pub schema_version: String,
    /// Artifacts keyed by name.
    pub artifacts: BTreeMap<String, ArtifactEntry>,
}

/// Version stamp identifying the upstream source a bundle was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStamp {
    /// Upstream source revision hash.
    pub source_hash: String,
    /// Upstream release version.
    pub upstream_version: String,
}

/// Inputs shared by every bundle produced in one run.
#[derive(Debug, Clone, Copy)]
pub struct BundleParams<'a> {
    /// Base name for all output files (e.g. `dawn_webgpu`).
    pub base_name: &'a str,
    /// Upstream release version recorded in the stamp and `info.json`.
    pub upstream_version: &'a str,
    /// Upstream source revision hash recorded in the stamp.
    pub source_hash: &'a str,
    /// Shared descriptor file copied into every bundle root.
    pub descriptor: &'a Utf8Path,
}

/// Assembles one artifact bundle per platform group.
pub struct BundleAssembler<'a> {
    layout: &'a WorkspaceLayout,
    params: &'a BundleParams<'a>,
    dll_registry: &'a [DllArtifact],
}

impl<'a> BundleAssembler<'a> {
    /// Create an assembler.
    ///
    /// `dll_registry` supplies the auxiliary DLL artifacts registered in the
    /// Windows bundle; pass [`WINDOWS_DLL_ARTIFACTS`] for the standard set.
    #[must_use]
    pub fn new(
        layout: &'a WorkspaceLayout,
        params: &'a BundleParams<'a>,
        dll_registry: &'a [DllArtifact],
    ) -> Self {
        Self {
            layout,
            params,
            dll_registry,
        }
    }

    /// Materialise and zip the bundle for one platform group, returning the
    /// zip path.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::MissingInstallArtifact`] when a manifest's
    /// library, include, or bin directory (or the shared descriptor) does not
    /// exist, or an I/O, JSON, or zip error from the underlying operations.
    /// A partial bundle directory left behind by a failure is not cleaned up.
    pub fn assemble(
        &self,
        group: PlatformGroup,
        manifests: &[TargetManifest],
    ) -> Result<Utf8PathBuf> {
        let bundle_name = format!("{}_{group}{BUNDLE_DIR_SUFFIX}", self.params.base_name);
        let bundle_dir = self.layout.bundle_dir(&bundle_name);
        debug!("assembling {bundle_name} from {} manifest(s)", manifests.len());

        if bundle_dir.exists() {
            fs::remove_dir_all(&bundle_dir)?;
        }
        fs::create_dir_all(&bundle_dir)?;

        for manifest in manifests {
            let target_dir = bundle_dir.join(&manifest.target_name);
            copy_dir_recursive(&manifest.library_path, &target_dir)?;
            copy_dir_recursive(&manifest.include_path, &target_dir.join("include"))?;
            if let Some(bin_path) = &manifest.bin_path {
                copy_dir_recursive(bin_path, &target_dir.join("bin"))?;
            }
        }

        self.write_descriptor(&bundle_dir)?;
        self.write_version_stamp(&bundle_dir)?;
        self.write_info(&bundle_dir, group, manifests)?;

        let zip_path = self.layout.zip_path(&bundle_name);
        if zip_path.exists() {
            fs::remove_file(&zip_path)?;
        }
        zip_directory(&bundle_dir, &bundle_name, &zip_path)?;
        Ok(zip_path)
    }

    /// Build the `info.json` content for one platform group.
    #[must_use]
    pub fn bundle_info(&self, group: PlatformGroup, manifests: &[TargetManifest]) -> BundleInfo {
        let variants = manifests
            .iter()
            .map(|manifest| ArtifactVariant {
                path: format!("{}/{}", manifest.target_name, manifest.library_name),
                static_library_metadata: Some(StaticLibraryMetadata {
                    header_paths: vec![format!("{}/include", manifest.target_name)],
                }),
                supported_triples: manifest.supported_triples.clone(),
            })
            .collect();

        let mut artifacts = BTreeMap::new();
        artifacts.insert(
            STATIC_LIBRARY_ARTIFACT.to_owned(),
            ArtifactEntry {
                version: Some(self.params.upstream_version.to_owned()),
                kind: ArtifactKind::StaticLibrary,
                variants,
            },
        );

        if group == PlatformGroup::Windows {
            for dll in self.dll_registry {
                artifacts.insert(
                    dll.name.to_owned(),
                    ArtifactEntry {
                        version: Some(dll.version.to_owned()),
                        kind: ArtifactKind::ExperimentalWindowsDll,
                        variants: dll
                            .variants
                            .iter()
                            .map(|variant| ArtifactVariant {
                                path: variant.path.to_owned(),
                                static_library_metadata: None,
                                supported_triples: vec![variant.triple.to_owned()],
                            })
                            .collect(),
                    },
                );
            }
        }

        BundleInfo {
            schema_version: INFO_SCHEMA_VERSION.to_owned(),
            artifacts,
        }
    }

    fn write_descriptor(&self, bundle_dir: &Utf8Path) -> Result<()> {
        let descriptor = self.params.descriptor;
        if !descriptor.is_file() {
            return Err(BundlerError::MissingInstallArtifact {
                path: descriptor.to_owned(),
            });
        }
        let file_name =
            descriptor
                .file_name()
                .ok_or_else(|| BundlerError::MissingInstallArtifact {
                    path: descriptor.to_owned(),
                })?;
        fs::copy(descriptor, bundle_dir.join(file_name))?;
        Ok(())
    }

    fn write_version_stamp(&self, bundle_dir: &Utf8Path) -> Result<()> {
        let stamp = VersionStamp {
            source_hash: self.params.source_hash.to_owned(),
            upstream_version: self.params.upstream_version.to_owned(),
        };
        let json = serde_json::to_string_pretty(&stamp)?;
        fs::write(bundle_dir.join(VERSION_STAMP_FILE), json)?;
        Ok(())
    }

    fn write_info(
        &self,
        bundle_dir: &Utf8Path,
        group: PlatformGroup,
        manifests: &[TargetManifest],
    ) -> Result<()> {
        let info = self.bundle_info(group, manifests);
        let json = serde_json::to_string_pretty(&info)?;
        fs::write(bundle_dir.join("info.json"), json)?;
        Ok(())
    }
}

/// Recursively copy a directory, failing if the source does not exist.
fn copy_dir_recursive(src: &Utf8Path, dst: &Utf8Path) -> Result<()> {
    if !src.is_dir() {
        return Err(BundlerError::MissingInstallArtifact {
            path: src.to_owned(),
        });
    }
    fs::create_dir_all(dst)?;

    for entry in sorted_entries(src)? {
        let dest = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_recursive(entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Read a directory's entries sorted by file name, for deterministic copies
/// and archives.
fn sorted_entries(dir: &Utf8Path) -> Result<Vec<camino::Utf8DirEntry>> {
    let mut entries: Vec<camino::Utf8DirEntry> = dir
        .read_dir_utf8()?
        .collect::<std::result::Result<_, _>>()?;
    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));
    Ok(entries)
}

/// Zip a bundle directory with `root_name` as the archive's root entry.
fn zip_directory(dir: &Utf8Path, root_name: &str, zip_path: &Utf8Path) -> Result<()> {
    let file = fs::File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    // Fixed timestamps keep re-zipped identical trees byte-identical.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    add_dir_entries(&mut writer, dir, root_name, options)?;
    writer.finish()?;
    Ok(())
}

fn add_dir_entries(
    writer: &mut ZipWriter<fs::File>,
    dir: &Utf8Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    writer.add_directory(format!("{prefix}/"), options)?;
    for entry in sorted_entries(dir)? {
        let entry_name = format!("{prefix}/{}", entry.file_name());
        if entry.path().is_dir() {
            add_dir_entries(writer, entry.path(), &entry_name, options)?;
        } else {
            writer.start_file(entry_name, options)?;
            let mut source = fs::File::open(entry.path())?;
            io::copy(&mut source, writer)?;
        }
    }
    Ok(())
}
