//! CMake build orchestration for Dawn targets.
//!
//! This module drives the external toolchain through three sequential,
//! blocking phases: configure, build, install. Each phase maps a nonzero
//! exit to its own error variant carrying the captured process output; no
//! phase is retried.

use crate::error::{BundlerError, Result};
use crate::executor::CommandExecutor;
use crate::layout::WorkspaceLayout;
use crate::target::{OperatingSystem, TargetConfig};
use camino::Utf8Path;
use log::debug;
use std::fs;
use std::process::Output;

/// CMake flags common to every Dawn build.
pub const DAWN_COMMON_FLAGS: &[&str] = &[
    "-DDAWN_ENABLE_PIC=ON",
    "-DDAWN_BUILD_SAMPLES=OFF",
    "-DTINT_BUILD_TESTS=OFF",
    "-DTINT_BUILD_CMD_TOOLS=OFF",
    "-DDAWN_ENABLE_INSTALL=ON",
    "-DDAWN_FETCH_DEPENDENCIES=ON",
    "-DDAWN_BUILD_MONOLITHIC_LIBRARY=STATIC",
];

/// Generate the CMake flags for a target configuration.
///
/// Apple targets additionally pin the architectures, deployment target, and
/// (when supplied) the SDK sysroot; non-macOS Apple targets cross-compile
/// with `CMAKE_SYSTEM_NAME=iOS` and without GLFW.
#[must_use]
pub fn cmake_flags(config: &TargetConfig, sdk_path: Option<&Utf8Path>) -> Vec<String> {
    let mut flags: Vec<String> = DAWN_COMMON_FLAGS.iter().map(|&f| f.to_owned()).collect();

    if config.os().is_apple() {
        let archs: Vec<&str> = config.architectures().iter().map(|a| a.name()).collect();
        flags.push(format!("-DCMAKE_OSX_ARCHITECTURES={}", archs.join(";")));
        if let Some(deployment_target) = config.deployment_target() {
            flags.push(format!("-DCMAKE_OSX_DEPLOYMENT_TARGET={deployment_target}"));
        }
        if config.os() != OperatingSystem::Macos {
            flags.push("-DDAWN_USE_GLFW=OFF".to_owned());
            flags.push("-DCMAKE_SYSTEM_NAME=iOS".to_owned());
        }
        if let Some(sdk) = sdk_path {
            flags.push(format!("-DCMAKE_OSX_SYSROOT={sdk}"));
        }
    }

    flags.push(format!("-DCMAKE_BUILD_TYPE={}", build_type(config)));
    flags
}

fn build_type(config: &TargetConfig) -> &'static str {
    match config.profile() {
        crate::target::BuildProfile::Release => "Release",
        crate::target::BuildProfile::Debug => "Debug",
    }
}

/// Builds Dawn targets by invoking CMake through a [`CommandExecutor`].
pub struct CmakeBuilder<'a> {
    executor: &'a dyn CommandExecutor,
    layout: &'a WorkspaceLayout,
    source_dir: &'a Utf8Path,
    sdk_path: Option<&'a Utf8Path>,
}

impl<'a> CmakeBuilder<'a> {
    /// Create a builder over the given executor, layout, and Dawn source
    /// directory.
    #[must_use]
    pub fn new(
        executor: &'a dyn CommandExecutor,
        layout: &'a WorkspaceLayout,
        source_dir: &'a Utf8Path,
    ) -> Self {
        Self {
            executor,
            layout,
            source_dir,
            sdk_path: None,
        }
    }

    /// Set the SDK sysroot passed to CMake for Apple targets.
    #[must_use]
    pub fn with_sdk_path(mut self, sdk_path: &'a Utf8Path) -> Self {
        self.sdk_path = Some(sdk_path);
        self
    }

    /// Configure, build, and install the target into its install directory.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::ToolchainConfigureFailure`],
    /// [`BundlerError::ToolchainBuildFailure`], or
    /// [`BundlerError::ToolchainInstallFailure`] with captured output when the
    /// corresponding CMake phase exits nonzero, or an I/O error when the
    /// build directories cannot be created.
    pub fn build(&self, config: &TargetConfig) -> Result<()> {
        let identity = config.identity();
        let build_dir = self.layout.target_build_dir(&identity);
        let install_dir = self.layout.install_dir(&identity);
        fs::create_dir_all(&build_dir)?;
        fs::create_dir_all(&install_dir)?;

        debug!("configuring {identity} with generator {}", config.build_tool());
        self.configure(config, &build_dir)?;

        debug!("building {identity}");
        self.compile(&build_dir)?;

        debug!("installing {identity} into {install_dir}");
        self.install(&build_dir, &install_dir)?;
        Ok(())
    }

    fn configure(&self, config: &TargetConfig, build_dir: &Utf8Path) -> Result<()> {
        let mut args = vec!["-G".to_owned(), config.build_tool().to_owned()];
        args.extend(cmake_flags(config, self.sdk_path));
        args.push(self.source_dir.to_string());

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.executor.run("cmake", &arg_refs, Some(build_dir))?;
        check_phase(output, |stdout, stderr| {
            BundlerError::ToolchainConfigureFailure { stdout, stderr }
        })
    }

    fn compile(&self, build_dir: &Utf8Path) -> Result<()> {
        let output = self
            .executor
            .run("cmake", &["--build", "."], Some(build_dir))?;
        check_phase(output, |stdout, stderr| BundlerError::ToolchainBuildFailure {
            stdout,
            stderr,
        })
    }

    fn install(&self, build_dir: &Utf8Path, install_dir: &Utf8Path) -> Result<()> {
        let output = self.executor.run(
            "cmake",
            &["--install", build_dir.as_str(), "--prefix", install_dir.as_str()],
            None,
        )?;
        check_phase(output, |stdout, stderr| {
            BundlerError::ToolchainInstallFailure { stdout, stderr }
        })
    }
}

/// Map a nonzero exit status to the phase's error with captured output.
fn check_phase(
    output: Output,
    to_error: impl FnOnce(String, String) -> BundlerError,
) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Err(to_error(stdout, stderr))
}
