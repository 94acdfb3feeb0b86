//! Test support utilities for bundler behavioural tests.
//!
//! Provides helpers to create UTF-8 temporary roots and fabricate install
//! trees that look like completed toolchain runs.

use camino::Utf8PathBuf;
use dawn_bundler::layout::WorkspaceLayout;
use dawn_bundler::manifest::TargetManifest;
use std::fs;
use tempfile::TempDir;

/// Returns a temporary directory plus its root as a UTF-8 path.
pub fn utf8_temp_root() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    (dir, root)
}

/// Fabricates an install tree for `target_name` under the layout and returns
/// the matching manifest.
///
/// Targets whose name starts with `windows` get a `bin/` directory and the
/// Windows library name, mirroring a real Windows install layout.
pub fn fake_target(
    layout: &WorkspaceLayout,
    target_name: &str,
    triples: &[&str],
) -> TargetManifest {
    let windows = target_name.starts_with("windows");
    let install = layout.install_dir(target_name);

    let lib_dir = install.join("lib");
    fs::create_dir_all(&lib_dir).expect("mkdir lib");
    let library_name = if windows {
        "webgpu_dawn.lib"
    } else {
        "libwebgpu_dawn.a"
    };
    fs::write(lib_dir.join(library_name), target_name.as_bytes()).expect("write library");

    let include_dir = install.join("include");
    fs::create_dir_all(include_dir.join("webgpu")).expect("mkdir include");
    fs::write(include_dir.join("webgpu").join("webgpu.h"), b"// webgpu").expect("write header");

    let bin_path = windows.then(|| {
        let bin_dir = install.join("bin");
        fs::create_dir_all(&bin_dir).expect("mkdir bin");
        for dll in ["dxcompiler.dll", "dxil.dll", "d3dcompiler_47.dll"] {
            fs::write(bin_dir.join(dll), dll.as_bytes()).expect("write dll");
        }
        bin_dir
    });

    TargetManifest {
        target_name: target_name.to_owned(),
        library_path: lib_dir,
        include_path: include_dir,
        bin_path,
        supported_triples: triples.iter().map(|&t| t.to_owned()).collect(),
        library_name: library_name.to_owned(),
    }
}
