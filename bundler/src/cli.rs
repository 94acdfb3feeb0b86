//! CLI argument definitions for the Dawn bundler.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Build Dawn targets and package them into artifact bundles.
#[derive(Parser, Debug)]
#[command(name = "dawn-bundler")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build Dawn targets and package them into artifact bundles.\n\n",
    "Each `build-target` invocation compiles one CI target with CMake and ",
    "records a manifest describing its install layout. A subsequent `bundle` ",
    "invocation packages every recorded target into one zip per platform ",
    "group (apple, windows, linux) and writes a checksum-verified index ",
    "referencing them all.",
))]
pub struct Cli {
    /// Root directory holding the builds/ and dist/ trees.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: Utf8PathBuf,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build one CI target and record its manifest.
    BuildTarget(BuildTargetArgs),

    /// Package every recorded target into platform bundles plus the index.
    Bundle(BundleArgs),

    /// Remove the build tree and all bundle outputs.
    Clean,
}

/// Arguments for the build-target command.
#[derive(Parser, Debug, Clone)]
pub struct BuildTargetArgs {
    /// CI target to build (macosx, iphoneos, iphonesimulator, ipados, linux,
    /// windows).
    #[arg(long, value_name = "NAME")]
    pub target: String,

    /// Configuration to build (release or debug).
    #[arg(long, value_name = "CONFIG", default_value = "release")]
    pub config: String,

    /// Path to the Dawn source tree.
    #[arg(long, value_name = "DIR", default_value = "dawn_source")]
    pub source: Utf8PathBuf,

    /// SDK sysroot passed to CMake (Apple targets only).
    #[arg(long, value_name = "DIR")]
    pub sdk_path: Option<Utf8PathBuf>,
}

/// Arguments for the bundle command.
#[derive(Parser, Debug, Clone)]
pub struct BundleArgs {
    /// Upstream release version recorded in the bundles.
    #[arg(long, value_name = "VERSION")]
    pub upstream_version: String,

    /// Upstream source revision hash recorded in the bundles.
    #[arg(long, value_name = "HASH")]
    pub source_hash: String,

    /// Base name for all output files (e.g. dawn_webgpu).
    #[arg(long, value_name = "NAME")]
    pub bundle_name: String,

    /// Shared descriptor file copied into every bundle.
    #[arg(long, value_name = "FILE")]
    pub descriptor: Utf8PathBuf,
}
