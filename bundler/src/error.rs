//! Error types for the Dawn bundler.
//!
//! This module defines semantic error variants for every failure the bundling
//! pipeline can hit. No error is recovered or retried locally; each one aborts
//! the current command and carries enough context (captured process output,
//! offending path) to diagnose the failure.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while building targets or assembling bundles.
#[derive(Debug, Error)]
pub enum BundlerError {
    /// A target configuration is unusable as a whole.
    #[error("invalid target: {reason}")]
    InvalidTarget {
        /// Description of why the configuration was rejected.
        reason: String,
    },

    /// An architecture string is outside the closed set.
    #[error("invalid architecture \"{value}\"; expected one of: x86_64, arm64, aarch64")]
    InvalidArchitecture {
        /// The rejected architecture string.
        value: String,
    },

    /// A persisted manifest's target name matches no known operating system.
    #[error("unknown target \"{target_name}\": leading token matches no operating system")]
    UnknownTarget {
        /// The target name that could not be classified.
        target_name: String,
    },

    /// The CMake configure step exited with a nonzero status.
    #[error("cmake configure failed\nstdout: {stdout}\nstderr: {stderr}")]
    ToolchainConfigureFailure {
        /// Captured standard output of the configure step.
        stdout: String,
        /// Captured standard error of the configure step.
        stderr: String,
    },

    /// The CMake build step exited with a nonzero status.
    #[error("cmake build failed\nstdout: {stdout}\nstderr: {stderr}")]
    ToolchainBuildFailure {
        /// Captured standard output of the build step.
        stdout: String,
        /// Captured standard error of the build step.
        stderr: String,
    },

    /// The CMake install step exited with a nonzero status.
    #[error("cmake install failed\nstdout: {stdout}\nstderr: {stderr}")]
    ToolchainInstallFailure {
        /// Captured standard output of the install step.
        stdout: String,
        /// Captured standard error of the install step.
        stderr: String,
    },

    /// A source path required during bundle assembly does not exist.
    #[error("missing install artifact at {path}")]
    MissingInstallArtifact {
        /// The absent path.
        path: Utf8PathBuf,
    },

    /// A checksum string is not a valid hex-encoded SHA-256 digest.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidDigest {
        /// Description of the validation failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing or finishing a zip archive failed.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`BundlerError`].
pub type Result<T> = std::result::Result<T, BundlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_target_names_the_offending_manifest() {
        let err = BundlerError::UnknownTarget {
            target_name: "solaris_x86_64_release".to_owned(),
        };
        assert!(err.to_string().contains("solaris_x86_64_release"));
    }

    #[test]
    fn toolchain_failures_surface_captured_output() {
        let err = BundlerError::ToolchainBuildFailure {
            stdout: "compiling".to_owned(),
            stderr: "ld: symbol not found".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("compiling"));
        assert!(msg.contains("ld: symbol not found"));
    }

    #[test]
    fn missing_install_artifact_includes_path() {
        let err = BundlerError::MissingInstallArtifact {
            path: Utf8PathBuf::from("/builds/windows_x86_64_release/install/lib"),
        };
        assert!(err.to_string().contains("install/lib"));
    }
}
