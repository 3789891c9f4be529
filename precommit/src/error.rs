//! Error types for precommit.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::Stage;

/// Result type for precommit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions that abort a pre-commit run.
///
/// A tool that runs but exits non-zero is not an error; it is reported through
/// [`crate::process::StepOutcome`] and the run continues.
#[derive(Debug, Error)]
pub enum Error {
    /// The process is not running inside a container.
    #[error(
        "Not in a docker container (no marker in {}). This tool must be run from within a \
         docker container.",
        probe.display()
    )]
    NotInContainer {
        /// Pseudo-file that was inspected.
        probe: PathBuf,
    },

    /// The project root does not exist or is not a directory.
    #[error("Cannot find project root directory: {}", .0.display())]
    ProjectRootMissing(PathBuf),

    /// Build or Test was requested before a build directory was configured.
    #[error("Could not find build directory {} to run {stage}", path.display())]
    BuildDirMissing {
        /// Stage that required the directory.
        stage: Stage,
        /// Expected build directory.
        path: PathBuf,
    },

    /// The build directory would wipe the project itself.
    #[error("Refusing to use {} as build directory: it contains the project root", .0.display())]
    UnsafeBuildDir(PathBuf),

    /// An external executable is not on the search path.
    #[error("Command {program} not found")]
    ToolMissing {
        /// Program name as it was invoked.
        program: String,
    },

    /// The HDL formatter configuration exists but could not be used.
    #[error("Invalid formatter config {}: {message}", path.display())]
    FormatterConfig {
        /// Path of the configuration file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// Filesystem or process-spawn failure.
    #[error("{context}: {source}")]
    Io {
        /// Operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Wrap an I/O error with a short description of the failed operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error comes from the environment gate.
    #[must_use]
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::NotInContainer { .. } | Self::ProjectRootMissing(_))
    }
}
