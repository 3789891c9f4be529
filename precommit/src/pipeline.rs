//! Top-level driver: environment gate, then format, configure, build, test.
//!
//! ```text
//! START -> [format] -> [configure -> build -> [test]] -> END
//!           skip-format   skip-build            skip-test
//! ```
//!
//! Test sits under the build gate: `--skip-build` also skips it.

use std::fmt;

use log::{debug, info};

use crate::environment::{self, ContainerProbe};
use crate::error::Result;
use crate::process::{Launcher, Runner, SystemLauncher, ToolFailure};
use crate::stages;
use crate::workspace::{FormatSettings, StageArgs, Toolchain, Workspace};

/// One discrete phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// HDL formatting followed by C++/CMake formatting.
    Format,
    /// Build-directory reset and generator run.
    Configure,
    /// Executor default target.
    Build,
    /// Executor test target.
    Test,
}

impl Stage {
    /// Lowercase stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Configure => "configure",
            Self::Build => "build",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stages to leave out. Nothing is skipped by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct StageFlags {
    /// Skip formatting.
    pub skip_format: bool,
    /// Skip configure and build (and therefore test).
    pub skip_build: bool,
    /// Skip test.
    pub skip_test: bool,
}

impl StageFlags {
    /// Stages a run with these flags executes, in order.
    pub fn planned_stages(self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(4);
        if !self.skip_format {
            stages.push(Stage::Format);
        }
        if !self.skip_build {
            stages.push(Stage::Configure);
            stages.push(Stage::Build);
            if !self.skip_test {
                stages.push(Stage::Test);
            }
        }
        stages
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Stages executed, in order.
    pub stages: Vec<Stage>,
    /// Commands that exited non-zero.
    pub failures: Vec<ToolFailure>,
}

impl RunReport {
    /// Returns `true` if every command exited zero.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sequences the stages against one workspace.
#[derive(Debug)]
pub struct Pipeline<L> {
    workspace: Workspace,
    toolchain: Toolchain,
    format: FormatSettings,
    args: StageArgs,
    probe: ContainerProbe,
    runner: Runner<L>,
}

impl Pipeline<SystemLauncher> {
    /// Pipeline that spawns real processes.
    pub fn new(workspace: Workspace) -> Self {
        Self::with_launcher(workspace, SystemLauncher)
    }
}

impl<L: Launcher> Pipeline<L> {
    /// Pipeline using a custom launcher.
    pub fn with_launcher(workspace: Workspace, launcher: L) -> Self {
        Self {
            workspace,
            toolchain: Toolchain::default(),
            format: FormatSettings::default(),
            args: StageArgs::default(),
            probe: ContainerProbe::default(),
            runner: Runner::new(launcher),
        }
    }

    /// Replace the external tools.
    #[must_use]
    pub fn toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Replace the HDL formatting settings.
    #[must_use]
    pub fn format_settings(mut self, format: FormatSettings) -> Self {
        self.format = format;
        self
    }

    /// Set extra per-stage flags.
    #[must_use]
    pub fn stage_args(mut self, args: StageArgs) -> Self {
        self.args = args;
        self
    }

    /// Replace the container probe.
    #[must_use]
    pub fn probe(mut self, probe: ContainerProbe) -> Self {
        self.probe = probe;
        self
    }

    /// The workspace this pipeline operates on.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Run the pipeline.
    pub fn run(&mut self, flags: StageFlags) -> Result<RunReport> {
        self.run_with_progress(flags, &mut |_| {})
    }

    /// Run the pipeline, calling `on_stage` as each stage starts.
    ///
    /// The environment is validated first; on failure nothing is launched.
    pub fn run_with_progress(
        &mut self,
        flags: StageFlags,
        on_stage: &mut dyn FnMut(Stage),
    ) -> Result<RunReport> {
        environment::validate(&self.probe, &self.workspace)?;
        debug!("Planned stages: {:?}", flags.planned_stages());

        let mut report = RunReport::default();
        for stage in flags.planned_stages() {
            on_stage(stage);
            info!("Running {stage} stage");
            self.run_stage(stage)?;
            report.stages.push(stage);
        }

        report.failures = self.runner.take_failures();
        Ok(report)
    }

    fn run_stage(&mut self, stage: Stage) -> Result<()> {
        let ws = &self.workspace;
        let tools = &self.toolchain;
        let runner = &mut self.runner;
        match stage {
            Stage::Format => stages::format(ws, tools, &self.format, runner)?,
            Stage::Configure => {
                stages::configure(ws, tools, runner, &self.args.configure)?;
            },
            Stage::Build => {
                stages::build(ws, tools, runner, &self.args.build)?;
            },
            Stage::Test => {
                stages::run_tests(ws, tools, runner, &self.args.test)?;
            },
        }
        Ok(())
    }
}
