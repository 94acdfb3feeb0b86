//! Behaviour-driven tests for target identity and triple derivation.
//!
//! These scenarios validate the identity and triple grammar of the target
//! model. Tests use the rstest-bdd v0.5.0 mutable world pattern.

use dawn_bundler::error::BundlerError;
use dawn_bundler::presets::ci_target;
use dawn_bundler::target::{Architecture, BuildProfile, TargetConfig};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

#[derive(Default)]
struct IdentityWorld {
    config: Option<TargetConfig>,
    identity: Option<String>,
    triples: Option<Vec<String>>,
    architecture_error: Option<BundlerError>,
}

#[fixture]
fn world() -> IdentityWorld {
    IdentityWorld::default()
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("the CI target \"{name}\" with configuration \"{config}\"")]
fn given_ci_target(world: &mut IdentityWorld, name: String, config: String) {
    let profile = BuildProfile::try_from(config.as_str()).expect("valid configuration");
    world.config = Some(ci_target(&name, profile).expect("known CI target"));
}

#[when("the identity is derived")]
fn when_identity_derived(world: &mut IdentityWorld) {
    world.identity = Some(world.config.as_ref().expect("config set").identity());
}

#[when("the triples are derived")]
fn when_triples_derived(world: &mut IdentityWorld) {
    world.triples = Some(world.config.as_ref().expect("config set").triples());
}

#[when("the architecture \"{value}\" is parsed")]
fn when_architecture_parsed(world: &mut IdentityWorld, value: String) {
    match Architecture::try_from(value.as_str()) {
        Ok(_) => world.architecture_error = None,
        Err(e) => world.architecture_error = Some(e),
    }
}

#[then("the identity is \"{identity}\"")]
fn then_identity_is(world: &mut IdentityWorld, identity: String) {
    assert_eq!(world.identity.as_deref(), Some(identity.as_str()));
}

#[then("there is one triple per architecture")]
fn then_one_triple_per_architecture(world: &mut IdentityWorld) {
    let config = world.config.as_ref().expect("config set");
    let triples = world.triples.as_ref().expect("triples derived");
    assert_eq!(triples.len(), config.architectures().len());
}

#[then("the triples are \"{first}\" and \"{second}\"")]
fn then_triples_are_pair(world: &mut IdentityWorld, first: String, second: String) {
    let triples = world.triples.as_ref().expect("triples derived");
    assert_eq!(triples, &vec![first, second]);
}

#[then("the triples are exactly \"{triple}\"")]
fn then_triples_are_single(world: &mut IdentityWorld, triple: String) {
    let triples = world.triples.as_ref().expect("triples derived");
    assert_eq!(triples, &vec![triple]);
}

#[then("an invalid architecture error is reported")]
fn then_invalid_architecture(world: &mut IdentityWorld) {
    let err = world
        .architecture_error
        .as_ref()
        .expect("expected a parse error");
    assert!(
        matches!(err, BundlerError::InvalidArchitecture { .. }),
        "expected InvalidArchitecture, got {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/target_identity.feature",
    name = "Identity tokens follow the target configuration"
)]
fn scenario_identity_tokens(world: IdentityWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_identity.feature",
    name = "Each architecture yields one triple"
)]
fn scenario_one_triple_per_arch(world: IdentityWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_identity.feature",
    name = "Windows triples carry the MSVC runtime suffix"
)]
fn scenario_windows_runtime_suffix(world: IdentityWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/target_identity.feature",
    name = "Unknown architectures are rejected"
)]
fn scenario_unknown_architecture(world: IdentityWorld) {
    let _ = world;
}
