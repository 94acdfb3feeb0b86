//! Dawn bundler CLI entrypoint.
//!
//! Dispatches the build-target, bundle, and clean subcommands and maps any
//! pipeline error to a nonzero exit code with the message on stderr.

use clap::Parser;
use dawn_bundler::bundle::{BundleParams, WINDOWS_DLL_ARTIFACTS};
use dawn_bundler::cli::{BuildTargetArgs, BundleArgs, Cli, Command};
use dawn_bundler::error::Result;
use dawn_bundler::executor::SystemCommandExecutor;
use dawn_bundler::index::EXTRA_APPLE_SDK_TRIPLES;
use dawn_bundler::layout::WorkspaceLayout;
use dawn_bundler::manifest::FsManifestStore;
use dawn_bundler::pipeline::{build_bundle_target, create_artifact_bundles};
use dawn_bundler::presets::ci_target;
use dawn_bundler::target::BuildProfile;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let layout = WorkspaceLayout::new(cli.root.clone());

    match &cli.command {
        Command::BuildTarget(args) => run_build_target(cli, &layout, args, stderr),
        Command::Bundle(args) => run_bundle(cli, &layout, args, stderr),
        Command::Clean => run_clean(cli, &layout, stderr),
    }
}

fn run_build_target(
    cli: &Cli,
    layout: &WorkspaceLayout,
    args: &BuildTargetArgs,
    stderr: &mut dyn Write,
) -> Result<()> {
    let profile = BuildProfile::try_from(args.config.as_str())?;
    let config = ci_target(&args.target, profile)?;

    if !cli.quiet {
        write_stderr_line(stderr, format!("Building Dawn for {}...", config.identity()));
    }

    let executor = SystemCommandExecutor;
    let store = FsManifestStore::for_layout(layout);
    let manifest = build_bundle_target(
        &executor,
        layout,
        &store,
        &config,
        &args.source,
        args.sdk_path.as_deref(),
    )?;

    if !cli.quiet {
        write_stderr_line(
            stderr,
            format!("Recorded manifest for {}", manifest.target_name),
        );
    }
    Ok(())
}

fn run_bundle(
    cli: &Cli,
    layout: &WorkspaceLayout,
    args: &BundleArgs,
    stderr: &mut dyn Write,
) -> Result<()> {
    let params = BundleParams {
        base_name: &args.bundle_name,
        upstream_version: &args.upstream_version,
        source_hash: &args.source_hash,
        descriptor: &args.descriptor,
    };
    let store = FsManifestStore::for_layout(layout);

    let index_path = create_artifact_bundles(
        layout,
        &store,
        &params,
        WINDOWS_DLL_ARTIFACTS,
        EXTRA_APPLE_SDK_TRIPLES,
    )?;

    if !cli.quiet {
        write_stderr_line(stderr, format!("Index created: {index_path}"));
    }
    Ok(())
}

fn run_clean(cli: &Cli, layout: &WorkspaceLayout, stderr: &mut dyn Write) -> Result<()> {
    if !cli.quiet {
        write_stderr_line(stderr, "Removing build directory...");
    }
    layout.remove_build_directory()?;

    if !cli.quiet {
        write_stderr_line(stderr, "Removing bundle outputs...");
    }
    layout.remove_bundle_outputs()?;
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use dawn_bundler::error::BundlerError;
    use tempfile::TempDir;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = BundlerError::UnknownTarget {
            target_name: "beos_x86_64_release".to_owned(),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("beos_x86_64_release"));
    }

    #[test]
    fn clean_on_an_empty_root_succeeds() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8Path::from_path(dir.path()).expect("utf-8 path");
        let cli = Cli::parse_from(["dawn-bundler", "--root", root.as_str(), "clean"]);

        let mut stderr = Vec::new();
        run(&cli, &mut stderr).expect("clean succeeds");
    }

    #[test]
    fn build_target_rejects_unknown_configuration() {
        let cli = Cli::parse_from([
            "dawn-bundler",
            "build-target",
            "--target",
            "linux",
            "--config",
            "profiling",
        ]);

        let mut stderr = Vec::new();
        let err = run(&cli, &mut stderr).expect_err("unknown configuration");
        assert!(matches!(err, BundlerError::InvalidTarget { .. }));
    }
}
