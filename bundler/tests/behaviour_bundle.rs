//! Behaviour-driven tests for bundle assembly and the discovery index.
//!
//! These scenarios drive the full bundling pipeline against a filesystem
//! manifest store and fabricated install trees. Tests use the rstest-bdd
//! v0.5.0 mutable world pattern.

mod support;

use camino::Utf8PathBuf;
use dawn_bundler::bundle::{
    BundleInfo, BundleParams, STATIC_LIBRARY_ARTIFACT, WINDOWS_DLL_ARTIFACTS,
};
use dawn_bundler::digest::compute_sha256;
use dawn_bundler::error::BundlerError;
use dawn_bundler::index::{BundleIndex, EXTRA_APPLE_SDK_TRIPLES};
use dawn_bundler::layout::WorkspaceLayout;
use dawn_bundler::manifest::{FsManifestStore, ManifestStore};
use dawn_bundler::pipeline::create_artifact_bundles;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use support::{fake_target, utf8_temp_root};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

#[derive(Default)]
struct BundleWorld {
    /// Keeps the temporary root alive for the scenario's duration.
    _temp_dir: Option<TempDir>,
    layout: Option<WorkspaceLayout>,
    descriptor: Option<Utf8PathBuf>,
    index_path: Option<Utf8PathBuf>,
    snapshots: Vec<(String, String)>,
    bundling_error: Option<BundlerError>,
}

#[fixture]
fn world() -> BundleWorld {
    let (temp_dir, root) = utf8_temp_root();
    let layout = WorkspaceLayout::new(root.clone());
    let descriptor = root.join("dawn.json");
    fs::write(&descriptor, b"{\"entries\": {}}").expect("write descriptor");
    BundleWorld {
        _temp_dir: Some(temp_dir),
        layout: Some(layout),
        descriptor: Some(descriptor),
        ..BundleWorld::default()
    }
}

fn layout(world: &BundleWorld) -> &WorkspaceLayout {
    world.layout.as_ref().expect("layout set")
}

/// Run the bundling pipeline and record the outcome in the world.
fn run_bundling(world: &mut BundleWorld) {
    let store = FsManifestStore::for_layout(layout(world));
    let params = BundleParams {
        base_name: "dawn_webgpu",
        upstream_version: "126.0.6478.36",
        source_hash: "0ab1c23d",
        descriptor: world.descriptor.as_ref().expect("descriptor set"),
    };

    match create_artifact_bundles(
        layout(world),
        &store,
        &params,
        WINDOWS_DLL_ARTIFACTS,
        EXTRA_APPLE_SDK_TRIPLES,
    ) {
        Ok(index_path) => world.index_path = Some(index_path),
        Err(e) => world.bundling_error = Some(e),
    }
}

/// Snapshot the index and every bundle's info.json for comparison.
fn snapshot_metadata(world: &BundleWorld) -> (String, String) {
    let index_path = world.index_path.as_ref().expect("index path set");
    let index = fs::read_to_string(index_path).expect("read index");

    let mut infos = String::new();
    let dist = layout(world).dist_dir();
    let mut bundle_dirs: Vec<Utf8PathBuf> = dist
        .read_dir_utf8()
        .expect("read dist")
        .map(|e| e.expect("entry").path().to_owned())
        .filter(|p| p.is_dir())
        .collect();
    bundle_dirs.sort();
    for dir in bundle_dirs {
        infos.push_str(&fs::read_to_string(dir.join("info.json")).expect("read info.json"));
        infos.push_str(&fs::read_to_string(dir.join("dawn_version.json")).expect("read stamp"));
    }
    (index, infos)
}

fn parsed_index(world: &BundleWorld) -> BundleIndex {
    let index_path = world.index_path.as_ref().expect("index path set");
    serde_json::from_str(&fs::read_to_string(index_path).expect("read index"))
        .expect("parse index")
}

fn windows_info(world: &BundleWorld) -> BundleInfo {
    let info_path = layout(world)
        .bundle_dir("dawn_webgpu_windows.artifactbundle")
        .join("info.json");
    serde_json::from_str(&fs::read_to_string(info_path).expect("read info.json"))
        .expect("parse info.json")
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a recorded target \"{name}\" supporting \"{triple}\"")]
fn given_recorded_target(world: &mut BundleWorld, name: String, triple: String) {
    let manifest = fake_target(layout(world), &name, &[&triple]);
    let store = FsManifestStore::for_layout(layout(world));
    store.put(&manifest).expect("record manifest");
}

#[when("the artifact bundles are created")]
fn when_bundles_created(world: &mut BundleWorld) {
    run_bundling(world);
    assert!(
        world.bundling_error.is_none(),
        "bundling failed: {:?}",
        world.bundling_error
    );
    let snapshot = snapshot_metadata(world);
    world.snapshots.push(snapshot);
}

#[when("the artifact bundles are created again")]
fn when_bundles_created_again(world: &mut BundleWorld) {
    when_bundles_created(world);
}

#[when("bundle creation is attempted")]
fn when_bundling_attempted(world: &mut BundleWorld) {
    run_bundling(world);
}

#[then("the windows bundle registers {count} artifacts")]
fn then_windows_artifact_count(world: &mut BundleWorld, count: usize) {
    let info = windows_info(world);
    assert_eq!(info.artifacts.len(), count, "artifact count mismatch");
    for name in [STATIC_LIBRARY_ARTIFACT, "dxcompiler", "dxil", "d3dcompiler_47"] {
        assert!(info.artifacts.contains_key(name), "missing artifact {name}");
    }
}

#[then("the static library artifact has {count} variants")]
fn then_static_library_variants(world: &mut BundleWorld, count: usize) {
    let info = windows_info(world);
    let library = info
        .artifacts
        .get(STATIC_LIBRARY_ARTIFACT)
        .expect("static library artifact");
    assert_eq!(library.variants.len(), count);
}

#[then("each auxiliary DLL artifact supports exactly the fixed windows triples")]
fn then_dll_artifacts_have_fixed_triples(world: &mut BundleWorld) {
    let info = windows_info(world);
    for name in ["dxcompiler", "dxil", "d3dcompiler_47"] {
        let dll = info.artifacts.get(name).expect("dll artifact");
        let mut triples: Vec<&str> = dll
            .variants
            .iter()
            .flat_map(|v| v.supported_triples.iter().map(String::as_str))
            .collect();
        triples.sort_unstable();
        assert_eq!(
            triples,
            vec!["aarch64-unknown-windows-msvc", "x86_64-unknown-windows-msvc"],
            "unexpected triples for {name}"
        );
    }
}

#[then("the windows index entry lists the two MSVC triples without duplicates")]
fn then_windows_index_triples(world: &mut BundleWorld) {
    let index = parsed_index(world);
    let entry = index
        .archives
        .iter()
        .find(|a| a.file_name.contains("windows"))
        .expect("windows index entry");

    let mut sorted = entry.supported_triples.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(
        sorted.len(),
        entry.supported_triples.len(),
        "index triples contain duplicates: {:?}",
        entry.supported_triples
    );
    assert_eq!(
        sorted,
        vec!["aarch64-unknown-windows-msvc", "x86_64-unknown-windows-msvc"]
    );
}

#[then("every index checksum matches its archive")]
fn then_checksums_match(world: &mut BundleWorld) {
    let index = parsed_index(world);
    assert!(!index.archives.is_empty(), "index lists no archives");
    for entry in &index.archives {
        let zip_path = layout(world).dist_dir().join(&entry.file_name);
        let actual = compute_sha256(&zip_path).expect("hash archive");
        assert_eq!(actual, entry.checksum, "checksum mismatch for {}", entry.file_name);
    }
}

#[then("the bundle metadata is unchanged")]
fn then_metadata_unchanged(world: &mut BundleWorld) {
    assert_eq!(world.snapshots.len(), 2, "expected two bundling runs");
    let first = world.snapshots.first().expect("first snapshot");
    let second = world.snapshots.last().expect("second snapshot");
    assert_eq!(first, second, "metadata changed between identical runs");
}

#[then("bundling fails with an unknown target error")]
fn then_unknown_target_error(world: &mut BundleWorld) {
    let err = world
        .bundling_error
        .as_ref()
        .expect("expected bundling to fail");
    assert!(
        matches!(err, BundlerError::UnknownTarget { .. }),
        "expected UnknownTarget, got {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/bundle.feature",
    name = "Windows bundle registers static variants and auxiliary DLL artifacts"
)]
fn scenario_windows_bundle(world: BundleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bundle.feature",
    name = "Index checksums match the archive bytes"
)]
fn scenario_index_checksums(world: BundleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bundle.feature",
    name = "Rebundling identical inputs reproduces the metadata"
)]
fn scenario_rebundle_deterministic(world: BundleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bundle.feature",
    name = "A manifest with an unknown target name aborts bundling"
)]
fn scenario_unknown_target(world: BundleWorld) {
    let _ = world;
}
