//! Launching external tools.
//!
//! Stages describe each external call as an [`Invocation`] and hand it to a
//! [`Runner`], which decides what is fatal. The actual spawning sits behind
//! the [`Launcher`] trait:
//!
//! ```text
//! +-------------+     +-------------+     +------------------+
//! |   Stages    | --> |   Runner    | --> |  Launcher trait  |
//! +-------------+     +-------------+     +--------+---------+
//!                      exit code policy            |
//!                                        +---------+---------+
//!                                        |                   |
//!                                 SystemLauncher        test doubles
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, error, warn};

use crate::error::{Error, Result};

/// Exit code recorded for a child that was killed by a signal.
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable name or path.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory of the child.
    pub cwd: PathBuf,
    /// Report a non-zero exit as a tool failure.
    pub check_exit: bool,
}

impl Invocation {
    /// New invocation with no arguments and exit checking enabled.
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            check_exit: true,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    #[must_use]
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Do not report a non-zero exit.
    #[must_use]
    pub fn unchecked(mut self) -> Self {
        self.check_exit = false;
        self
    }

    /// Program and arguments joined by spaces, for diagnostics.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Capability to run an [`Invocation`] to completion.
pub trait Launcher {
    /// Run the command, block until it exits and return its exit code.
    ///
    /// A missing executable must surface as an error of kind
    /// [`io::ErrorKind::NotFound`].
    fn launch(&mut self, invocation: &Invocation) -> io::Result<i32>;
}

impl<L: Launcher + ?Sized> Launcher for &mut L {
    fn launch(&mut self, invocation: &Invocation) -> io::Result<i32> {
        (**self).launch(invocation)
    }
}

/// Launcher that spawns real child processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&mut self, invocation: &Invocation) -> io::Result<i32> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()?;
        Ok(status.code().unwrap_or_else(|| {
            debug!("{} terminated by signal", invocation.program);
            SIGNALED_EXIT_CODE
        }))
    }
}

/// Result of a command that ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Exit code zero.
    Succeeded,
    /// Non-zero exit; logged, not fatal.
    ToolFailed {
        /// Exit code of the child.
        code: i32,
    },
}

impl StepOutcome {
    /// Returns `true` for [`StepOutcome::Succeeded`].
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// A reported non-zero exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    /// Rendered command line.
    pub command: String,
    /// Exit code of the child.
    pub code: i32,
}

/// Applies the exit-code policy on top of a [`Launcher`].
#[derive(Debug)]
pub struct Runner<L> {
    launcher: L,
    failures: Vec<ToolFailure>,
}

impl<L: Launcher> Runner<L> {
    /// Create a runner around a launcher.
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            failures: Vec::new(),
        }
    }

    /// Run one command.
    ///
    /// Non-zero exits are logged and recorded but returned as
    /// [`StepOutcome::ToolFailed`]. A missing executable is fatal.
    pub fn run(&mut self, invocation: &Invocation) -> Result<StepOutcome> {
        if !invocation.cwd.is_dir() {
            return Err(Error::io(
                format!("Working directory {}", invocation.cwd.display()),
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        debug!(
            "Running `{}` in {}",
            invocation.command_line(),
            invocation.cwd.display()
        );

        match self.launcher.launch(invocation) {
            Ok(0) => Ok(StepOutcome::Succeeded),
            Ok(code) => {
                if invocation.check_exit {
                    let command = invocation.command_line();
                    warn!("{command} exited with non-zero {code}");
                    self.failures.push(ToolFailure { command, code });
                }
                Ok(StepOutcome::ToolFailed { code })
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!("Command {} not found", invocation.program);
                Err(Error::ToolMissing {
                    program: invocation.program.clone(),
                })
            },
            Err(e) => Err(Error::io(format!("Failed to run {}", invocation.program), e)),
        }
    }

    /// Non-zero exits recorded so far.
    pub fn failures(&self) -> &[ToolFailure] {
        &self.failures
    }

    /// Drain the recorded failures.
    pub fn take_failures(&mut self) -> Vec<ToolFailure> {
        std::mem::take(&mut self.failures)
    }
}
