//! Target manifest schema and persistence.
//!
//! One manifest is written per successfully built target and is immutable
//! once written; the manifest directory is the sole source of truth between
//! process invocations. The store is abstracted behind [`ManifestStore`] so
//! grouping and indexing logic can be exercised against an in-memory
//! substitute.

use crate::error::Result;
use crate::layout::WorkspaceLayout;
use crate::target::{OperatingSystem, TargetConfig};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fs;

/// Return the platform-correct static library file name.
#[must_use]
pub fn static_library_name(os: OperatingSystem) -> &'static str {
    if os.is_windows() {
        "webgpu_dawn.lib"
    } else {
        "libwebgpu_dawn.a"
    }
}

/// Persisted record describing one built target's install layout.
///
/// The JSON schema uses camelCase keys:
///
/// ```json
/// {
///   "targetName": "windows_x86_64_release",
///   "libraryPath": "builds/windows_x86_64_release/install/lib",
///   "includePath": "builds/windows_x86_64_release/install/include",
///   "binPath": "builds/windows_x86_64_release/install/bin",
///   "supportedTriples": ["x86_64-unknown-windows-msvc"],
///   "libraryName": "webgpu_dawn.lib"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetManifest {
    /// The target identity string, also the manifest's key.
    pub target_name: String,
    /// Directory containing the installed static library.
    pub library_path: Utf8PathBuf,
    /// Directory containing the installed headers.
    pub include_path: Utf8PathBuf,
    /// Directory containing installed binaries (Windows only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_path: Option<Utf8PathBuf>,
    /// Target triples the installed library is valid for, in order.
    pub supported_triples: Vec<String>,
    /// File name of the static library inside `library_path`.
    pub library_name: String,
}

impl TargetManifest {
    /// Build the manifest for a target whose install layout is complete.
    ///
    /// The bin path is recorded only for Windows targets, which install
    /// auxiliary DLLs next to the static library.
    #[must_use]
    pub fn for_target(config: &TargetConfig, layout: &WorkspaceLayout) -> Self {
        let identity = config.identity();
        let install = layout.install_dir(&identity);
        Self {
            target_name: identity,
            library_path: install.join("lib"),
            include_path: install.join("include"),
            bin_path: config.os().is_windows().then(|| install.join("bin")),
            supported_triples: config.triples(),
            library_name: static_library_name(config.os()).to_owned(),
        }
    }
}

/// Persistence seam for target manifests.
pub trait ManifestStore {
    /// Persist a manifest, replacing any previous manifest for the same
    /// target name.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be written.
    fn put(&self, manifest: &TargetManifest) -> Result<()>;

    /// Read every persisted manifest, sorted by target name.
    ///
    /// Storage order is not meaningful; the explicit sort keeps bundle
    /// contents and checksum results deterministic across runs.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest cannot be read or parsed.
    fn list_all(&self) -> Result<Vec<TargetManifest>>;
}

/// Filesystem-backed manifest store: one JSON file per target.
#[derive(Debug, Clone)]
pub struct FsManifestStore {
    dir: Utf8PathBuf,
}

impl FsManifestStore {
    /// Create a store over the given manifest directory.
    #[must_use]
    pub fn new(dir: Utf8PathBuf) -> Self {
        Self { dir }
    }

    /// Create a store over the layout's manifest directory.
    #[must_use]
    pub fn for_layout(layout: &WorkspaceLayout) -> Self {
        Self::new(layout.manifest_dir())
    }

    fn manifest_path(&self, target_name: &str) -> Utf8PathBuf {
        self.dir.join(format!("{target_name}.json"))
    }
}

impl ManifestStore for FsManifestStore {
    fn put(&self, manifest: &TargetManifest) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(manifest)?;

        // Write-then-rename so concurrent readers never observe a partial
        // manifest.
        let final_path = self.manifest_path(&manifest.target_name);
        let temp_path = self.dir.join(format!(".{}.json.tmp", manifest.target_name));
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<TargetManifest>> {
        let mut manifests = Vec::new();
        if !self.dir.exists() {
            return Ok(manifests);
        }

        for entry in self.dir.read_dir_utf8()? {
            let entry = entry?;
            let path = entry.path();
            if path.extension() != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(path)?;
            manifests.push(serde_json::from_str(&contents)?);
        }

        manifests.sort_by(|a: &TargetManifest, b: &TargetManifest| {
            a.target_name.cmp(&b.target_name)
        });
        Ok(manifests)
    }
}

/// Map-backed manifest store for tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct InMemoryManifestStore {
    entries: std::cell::RefCell<std::collections::BTreeMap<String, TargetManifest>>,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryManifestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ManifestStore for InMemoryManifestStore {
    fn put(&self, manifest: &TargetManifest) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(manifest.target_name.clone(), manifest.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<TargetManifest>> {
        Ok(self.entries.borrow().values().cloned().collect())
    }
}
