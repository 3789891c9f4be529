//! # precommit
//!
//! A library for running pre-commit checks on a mixed HDL and C++ project.
//!
//! All real work is delegated to external tools; this crate sequences them:
//!
//! - HDL formatting (`verible-verilog-format`, options from a YAML file)
//! - C++/CMake formatting through the build's `fix-format` target
//! - Configure (`cmake -GNinja`) into a freshly wiped build directory
//! - Build and test (`ninja`, `ninja check`)
//!
//! Runs are refused outside a docker container, since configure destroys the
//! build directory.
//!
//! ## Example
//!
//! ```rust,no_run
//! use precommit::{Pipeline, StageFlags, Workspace};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pipeline = Pipeline::new(Workspace::new("/code"));
//!
//!     let report = pipeline.run_with_progress(StageFlags::default(), &mut |stage| {
//!         println!("Running {stage}");
//!     })?;
//!
//!     for failure in &report.failures {
//!         println!("{} exited with {}", failure.command, failure.code);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod environment;
pub mod error;
pub mod hdl;
pub mod pipeline;
pub mod process;
pub mod stages;
pub mod workspace;

// Re-exports for convenience
pub use {
    environment::ContainerProbe,
    error::{Error, Result},
    pipeline::{Pipeline, RunReport, Stage, StageFlags},
    process::{Invocation, Launcher, Runner, StepOutcome, SystemLauncher, ToolFailure},
    workspace::{FormatSettings, StageArgs, Toolchain, Workspace},
};
