//! Closed-set target identity types and triple derivation.
//!
//! Operating systems, architectures, and platform groups are closed
//! enumerations with explicit mapping tables; values outside the sets are
//! rejected at construction time rather than defaulted. A [`TargetConfig`]
//! combines them and derives the two identities the rest of the pipeline is
//! keyed on: the on-disk identity string and the list of target triples.

use crate::error::{BundlerError, Result};
use std::fmt;

/// Operating systems a Dawn target can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatingSystem {
    /// macOS desktop.
    Macos,
    /// Windows desktop.
    Windows,
    /// Linux desktop.
    Linux,
    /// iPhone (device and simulator SDKs).
    Iphone,
    /// iPadOS.
    Ipados,
}

/// Every supported operating system, for exhaustive iteration.
const ALL_OPERATING_SYSTEMS: &[OperatingSystem] = &[
    OperatingSystem::Macos,
    OperatingSystem::Windows,
    OperatingSystem::Linux,
    OperatingSystem::Iphone,
    OperatingSystem::Ipados,
];

impl OperatingSystem {
    /// Return the canonical name used in identity strings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Macos => "macosx",
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Iphone => "iphone",
            Self::Ipados => "ipados",
        }
    }

    /// Whether this is an Apple platform (macOS, iPhone, iPadOS).
    #[must_use]
    pub const fn is_apple(self) -> bool {
        matches!(self, Self::Macos | Self::Iphone | Self::Ipados)
    }

    /// Whether this is a Windows platform.
    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    /// Return the coarse platform group this operating system belongs to.
    #[must_use]
    pub const fn platform_group(self) -> PlatformGroup {
        match self {
            Self::Macos | Self::Iphone | Self::Ipados => PlatformGroup::Apple,
            Self::Windows => PlatformGroup::Windows,
            Self::Linux => PlatformGroup::Linux,
        }
    }

    /// Return the vendor component used in target triples.
    #[must_use]
    pub const fn triple_vendor(self) -> &'static str {
        if self.is_apple() { "apple" } else { "unknown" }
    }

    /// Recover the operating system from a target identity string.
    ///
    /// The leading `_`-separated token must match an operating system name
    /// exactly; prefix matching is never attempted, so no name can shadow
    /// another.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::UnknownTarget`] when the leading token matches
    /// no known operating system.
    ///
    /// # Examples
    ///
    /// ```
    /// use dawn_bundler::target::OperatingSystem;
    ///
    /// let os = OperatingSystem::from_target_name("macosx_x86_64_arm64_macosx15.5_release")
    ///     .expect("known target name");
    /// assert_eq!(os, OperatingSystem::Macos);
    /// ```
    pub fn from_target_name(target_name: &str) -> Result<Self> {
        let token = target_name.split('_').next().unwrap_or("");
        ALL_OPERATING_SYSTEMS
            .iter()
            .copied()
            .find(|os| os.name() == token)
            .ok_or_else(|| BundlerError::UnknownTarget {
                target_name: target_name.to_owned(),
            })
    }
}

impl TryFrom<&str> for OperatingSystem {
    type Error = BundlerError;

    fn try_from(value: &str) -> Result<Self> {
        ALL_OPERATING_SYSTEMS
            .iter()
            .copied()
            .find(|os| os.name() == value)
            .ok_or_else(|| BundlerError::InvalidTarget {
                reason: format!("unknown operating system \"{value}\""),
            })
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// CPU architectures a Dawn target can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// 64-bit x86.
    X86_64,
    /// 64-bit ARM (`aarch64` is accepted as an alias on input).
    Arm64,
}

impl Architecture {
    /// Return the name used in identity strings and Apple triples.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
        }
    }

    /// Return the LLVM spelling used in non-Apple triples.
    #[must_use]
    pub const fn llvm_name(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "aarch64",
        }
    }
}

impl TryFrom<&str> for Architecture {
    type Error = BundlerError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "x86_64" => Ok(Self::X86_64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            _ => Err(BundlerError::InvalidArchitecture {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Coarse platform buckets used to produce one bundle per group.
///
/// Declared in name order so the derived `Ord` matches lexicographic ordering
/// of the group names, which keeps grouped iteration deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformGroup {
    /// macOS, iPhone, and iPadOS targets.
    Apple,
    /// Linux targets.
    Linux,
    /// Windows targets.
    Windows,
}

impl PlatformGroup {
    /// Return the group name used in bundle file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for PlatformGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build configuration for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildProfile {
    /// Optimised build.
    #[default]
    Release,
    /// Debug build.
    Debug,
}

impl BuildProfile {
    /// Return the name used in identity strings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Debug => "debug",
        }
    }
}

impl TryFrom<&str> for BuildProfile {
    type Error = BundlerError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "release" => Ok(Self::Release),
            "debug" => Ok(Self::Debug),
            _ => Err(BundlerError::InvalidTarget {
                reason: format!("unknown build configuration \"{value}\"; expected release or debug"),
            }),
        }
    }
}

impl fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The default CMake generator when a target does not name one.
const DEFAULT_BUILD_TOOL: &str = "Ninja";

/// A complete build-target description.
///
/// Derives the identity string used as the on-disk key and the target triples
/// a built library is valid for.
///
/// # Examples
///
/// ```
/// use dawn_bundler::target::{Architecture, OperatingSystem, TargetConfig};
///
/// let config = TargetConfig::new(
///     OperatingSystem::Macos,
///     vec![Architecture::X86_64, Architecture::Arm64],
/// )
/// .expect("non-empty architecture list")
/// .with_sdk("macosx15.5");
///
/// assert_eq!(config.identity(), "macosx_x86_64_arm64_macosx15.5_release");
/// assert_eq!(
///     config.triples(),
///     vec!["x86_64-apple-macosx", "arm64-apple-macosx"],
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    os: OperatingSystem,
    architectures: Vec<Architecture>,
    sdk: Option<String>,
    deployment_target: Option<String>,
    profile: BuildProfile,
    runtime: Option<String>,
    build_tool: String,
}

impl TargetConfig {
    /// Create a target configuration for the given operating system and
    /// architectures, with a release profile and no SDK or runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::InvalidTarget`] when `architectures` is empty.
    pub fn new(os: OperatingSystem, architectures: Vec<Architecture>) -> Result<Self> {
        if architectures.is_empty() {
            return Err(BundlerError::InvalidTarget {
                reason: "at least one architecture is required".to_owned(),
            });
        }
        Ok(Self {
            os,
            architectures,
            sdk: None,
            deployment_target: None,
            profile: BuildProfile::Release,
            runtime: None,
            build_tool: DEFAULT_BUILD_TOOL.to_owned(),
        })
    }

    /// Set the SDK this target builds against (Apple only, e.g. `macosx15.5`).
    #[must_use]
    pub fn with_sdk(mut self, sdk: impl Into<String>) -> Self {
        self.sdk = Some(sdk.into());
        self
    }

    /// Set the minimum deployment target (Apple only, e.g. `15.0`).
    #[must_use]
    pub fn with_deployment_target(mut self, deployment_target: impl Into<String>) -> Self {
        self.deployment_target = Some(deployment_target.into());
        self
    }

    /// Set the build profile.
    #[must_use]
    pub fn with_profile(mut self, profile: BuildProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the runtime suffix appended to triples (e.g. `msvc`).
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// Set the CMake generator used to build this target.
    #[must_use]
    pub fn with_build_tool(mut self, build_tool: impl Into<String>) -> Self {
        self.build_tool = build_tool.into();
        self
    }

    /// Return the operating system.
    #[must_use]
    pub fn os(&self) -> OperatingSystem {
        self.os
    }

    /// Return the ordered architecture list (never empty).
    #[must_use]
    pub fn architectures(&self) -> &[Architecture] {
        &self.architectures
    }

    /// Return the SDK name, if any.
    #[must_use]
    pub fn sdk(&self) -> Option<&str> {
        self.sdk.as_deref()
    }

    /// Return the deployment target, if any.
    #[must_use]
    pub fn deployment_target(&self) -> Option<&str> {
        self.deployment_target.as_deref()
    }

    /// Return the build profile.
    #[must_use]
    pub fn profile(&self) -> BuildProfile {
        self.profile
    }

    /// Return the runtime suffix, if any.
    #[must_use]
    pub fn runtime(&self) -> Option<&str> {
        self.runtime.as_deref()
    }

    /// Return the CMake generator name.
    #[must_use]
    pub fn build_tool(&self) -> &str {
        &self.build_tool
    }

    /// Return the stable identity string keying this target on disk.
    ///
    /// Tokens are `[os, arch..., sdk?, profile]` joined with `_`; the result
    /// is unique per distinct (os, architectures, sdk, profile) combination
    /// and safe to use as a directory name.
    #[must_use]
    pub fn identity(&self) -> String {
        let mut parts = vec![self.os.name().to_owned()];
        for arch in &self.architectures {
            parts.push(arch.name().to_owned());
        }
        if let Some(sdk) = &self.sdk {
            parts.push(sdk.clone());
        }
        parts.push(self.profile.name().to_owned());
        parts.join("_")
    }

    /// Return the target triples this configuration's library is valid for,
    /// one per architecture in order.
    ///
    /// Each triple has the form `{arch}-{vendor}-{os}[-{runtime}]`. Apple
    /// triples use the `arm64` spelling; all others use the LLVM spelling
    /// `aarch64`.
    #[must_use]
    pub fn triples(&self) -> Vec<String> {
        let vendor = self.os.triple_vendor();
        let os = self.os.name();
        self.architectures
            .iter()
            .map(|arch| {
                let arch_name = if self.os.is_apple() {
                    arch.name()
                } else {
                    arch.llvm_name()
                };
                match &self.runtime {
                    Some(runtime) => format!("{arch_name}-{vendor}-{os}-{runtime}"),
                    None => format!("{arch_name}-{vendor}-{os}"),
                }
            })
            .collect()
    }
}

impl fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity())
    }
}
