//! Fixed CI target definitions.
//!
//! Each named preset pins the SDK, deployment target, and toolchain details
//! used for that platform's CI build.

use crate::error::{BundlerError, Result};
use crate::target::{Architecture, BuildProfile, OperatingSystem, TargetConfig};

/// Names accepted by [`ci_target`], in the order CI builds them.
pub const CI_TARGET_NAMES: &[&str] = &[
    "macosx",
    "iphoneos",
    "iphonesimulator",
    "ipados",
    "linux",
    "windows",
];

/// Return the fixed target configuration for a named CI target.
///
/// # Errors
///
/// Returns [`BundlerError::InvalidTarget`] when `name` is not one of
/// [`CI_TARGET_NAMES`].
///
/// # Examples
///
/// ```
/// use dawn_bundler::presets::ci_target;
/// use dawn_bundler::target::BuildProfile;
///
/// let config = ci_target("windows", BuildProfile::Release).expect("known target");
/// assert_eq!(config.identity(), "windows_x86_64_release");
/// assert_eq!(config.triples(), vec!["x86_64-unknown-windows-msvc"]);
/// ```
pub fn ci_target(name: &str, profile: BuildProfile) -> Result<TargetConfig> {
    let config = match name {
        "macosx" => TargetConfig::new(
            OperatingSystem::Macos,
            vec![Architecture::X86_64, Architecture::Arm64],
        )?
        .with_sdk("macosx15.5")
        .with_deployment_target("15.0"),
        "iphoneos" => TargetConfig::new(OperatingSystem::Iphone, vec![Architecture::Arm64])?
            .with_sdk("iphoneos18.5")
            .with_deployment_target("18.0"),
        "iphonesimulator" => {
            TargetConfig::new(OperatingSystem::Iphone, vec![Architecture::X86_64])?
                .with_sdk("iphonesimulator18.5")
                .with_deployment_target("18.0")
        }
        "ipados" => TargetConfig::new(OperatingSystem::Ipados, vec![Architecture::Arm64])?
            .with_sdk("ipados18.5")
            .with_deployment_target("18.0"),
        "linux" => TargetConfig::new(OperatingSystem::Linux, vec![Architecture::X86_64])?,
        "windows" => TargetConfig::new(OperatingSystem::Windows, vec![Architecture::X86_64])?
            .with_runtime("msvc")
            .with_build_tool("Visual Studio 17 2022"),
        _ => {
            return Err(BundlerError::InvalidTarget {
                reason: format!("unknown CI target \"{name}\""),
            });
        }
    };
    Ok(config.with_profile(profile))
}
