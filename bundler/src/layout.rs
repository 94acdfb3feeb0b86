//! Directory layout for builds, manifests, and distribution outputs.
//!
//! All pipeline paths hang off a single caller-supplied root: per-target
//! build and install trees under `builds/`, target manifests under
//! `builds/manifest/`, and bundle directories, zips, and the index under
//! `dist/`. Cleanup operations are destructive removes; nothing is rebuilt
//! incrementally.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Suffix of bundle directories and the root entry of their zips.
pub const BUNDLE_DIR_SUFFIX: &str = ".artifactbundle";

/// Suffix of the top-level discovery index file.
pub const INDEX_SUFFIX: &str = ".artifactbundleindex";

/// Resolves every pipeline path relative to one root directory.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: Utf8PathBuf,
}

impl WorkspaceLayout {
    /// Create a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the layout root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Return the directory holding all per-target build trees.
    #[must_use]
    pub fn builds_dir(&self) -> Utf8PathBuf {
        self.root.join("builds")
    }

    /// Return the CMake build tree for a target identity.
    #[must_use]
    pub fn target_build_dir(&self, identity: &str) -> Utf8PathBuf {
        self.builds_dir().join(identity).join("out")
    }

    /// Return the install prefix for a target identity.
    #[must_use]
    pub fn install_dir(&self, identity: &str) -> Utf8PathBuf {
        self.builds_dir().join(identity).join("install")
    }

    /// Return the directory holding one manifest file per built target.
    #[must_use]
    pub fn manifest_dir(&self) -> Utf8PathBuf {
        self.builds_dir().join("manifest")
    }

    /// Return the distribution output directory.
    #[must_use]
    pub fn dist_dir(&self) -> Utf8PathBuf {
        self.root.join("dist")
    }

    /// Return the bundle directory for a bundle name.
    #[must_use]
    pub fn bundle_dir(&self, bundle_name: &str) -> Utf8PathBuf {
        self.dist_dir().join(bundle_name)
    }

    /// Return the zip path for a bundle name.
    #[must_use]
    pub fn zip_path(&self, bundle_name: &str) -> Utf8PathBuf {
        self.dist_dir().join(format!("{bundle_name}.zip"))
    }

    /// Return the discovery index path for a bundle base name.
    #[must_use]
    pub fn index_path(&self, base_name: &str) -> Utf8PathBuf {
        self.dist_dir().join(format!("{base_name}{INDEX_SUFFIX}"))
    }

    /// Remove the entire `builds/` directory, including manifests.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if removal fails.
    pub fn remove_build_directory(&self) -> Result<()> {
        let builds = self.builds_dir();
        if builds.exists() {
            fs::remove_dir_all(builds)?;
        }
        Ok(())
    }

    /// Remove every bundle directory, bundle zip, and index file from `dist/`.
    ///
    /// Other files in the distribution directory are left alone.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a removal fails.
    pub fn remove_bundle_outputs(&self) -> Result<()> {
        let dist = self.dist_dir();
        if !dist.exists() {
            return Ok(());
        }

        for entry in dist.read_dir_utf8()? {
            let entry = entry?;
            let name = entry.file_name();
            let path = entry.path();
            if path.is_dir() && name.ends_with(BUNDLE_DIR_SUFFIX) {
                fs::remove_dir_all(path)?;
            } else if path.is_file()
                && (name.ends_with(&format!("{BUNDLE_DIR_SUFFIX}.zip")) || name.ends_with(INDEX_SUFFIX))
            {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
