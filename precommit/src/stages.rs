//! The four pipeline stages.
//!
//! Each stage builds its [`Invocation`] from the workspace and toolchain it is
//! given and hands it to the runner. Nothing here reads global state.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::hdl;
use crate::pipeline::Stage;
use crate::process::{Invocation, Launcher, Runner, StepOutcome};
use crate::workspace::{FormatSettings, Toolchain, Workspace};

/// Remove the build directory if present and recreate it empty.
///
/// Refuses to touch a build directory that is, or contains, the project root.
/// Both paths are compared after resolving symlinks and `..`.
pub fn reset_build_dir(workspace: &Workspace) -> Result<()> {
    let build_dir = &workspace.build_dir;
    if resolve_path(&workspace.project_root).starts_with(resolve_path(build_dir)) {
        return Err(Error::UnsafeBuildDir(build_dir.clone()));
    }

    if build_dir.exists() {
        debug!("Removing {}", build_dir.display());
        fs::remove_dir_all(build_dir)
            .map_err(|e| Error::io(format!("Failed to remove {}", build_dir.display()), e))?;
    }
    fs::create_dir_all(build_dir)
        .map_err(|e| Error::io(format!("Failed to create {}", build_dir.display()), e))
}

/// Configure: fresh build directory, then run the generator against the root.
pub fn configure<L: Launcher>(
    workspace: &Workspace,
    tools: &Toolchain,
    runner: &mut Runner<L>,
    extra: &[String],
) -> Result<StepOutcome> {
    reset_build_dir(workspace)?;

    let invocation = Invocation::new(&tools.generator, &workspace.build_dir)
        .args(&tools.generator_args)
        .args(extra)
        .path_arg(&workspace.project_root);
    runner.run(&invocation)
}

/// Build: run the executor in an already configured build directory.
pub fn build<L: Launcher>(
    workspace: &Workspace,
    tools: &Toolchain,
    runner: &mut Runner<L>,
    extra: &[String],
) -> Result<StepOutcome> {
    require_build_dir(workspace, Stage::Build)?;

    let invocation = Invocation::new(&tools.executor, &workspace.build_dir).args(extra);
    runner.run(&invocation)
}

/// Test: run the executor's test target in an already configured build directory.
pub fn run_tests<L: Launcher>(
    workspace: &Workspace,
    tools: &Toolchain,
    runner: &mut Runner<L>,
    extra: &[String],
) -> Result<StepOutcome> {
    require_build_dir(workspace, Stage::Test)?;

    let invocation = Invocation::new(&tools.executor, &workspace.build_dir)
        .arg(&tools.test_target)
        .args(extra);
    runner.run(&invocation)
}

/// Format everything: HDL sources first, then C++ and CMake sources.
pub fn format<L: Launcher>(
    workspace: &Workspace,
    tools: &Toolchain,
    settings: &FormatSettings,
    runner: &mut Runner<L>,
) -> Result<()> {
    format_hdl(workspace, tools, settings, runner)?;
    format_sources(workspace, tools, runner)?;
    Ok(())
}

/// Rewrite HDL sources in place with the formatter.
///
/// Returns `None` when there is nothing to format.
pub fn format_hdl<L: Launcher>(
    workspace: &Workspace,
    tools: &Toolchain,
    settings: &FormatSettings,
    runner: &mut Runner<L>,
) -> Result<Option<StepOutcome>> {
    let flags = hdl::load_formatter_flags(&workspace.resolve(&settings.config_file))?;
    let sources = hdl::discover_sources(&workspace.project_root, &settings.extensions);
    if sources.is_empty() {
        info!("No HDL sources under {}", workspace.project_root.display());
        return Ok(None);
    }
    debug!("Formatting {} HDL files", sources.len());

    let mut invocation = Invocation::new(&tools.hdl_formatter, &workspace.project_root)
        .args(&tools.hdl_formatter_args)
        .args(flags);
    for source in &sources {
        invocation = invocation.path_arg(source);
    }
    runner.run(&invocation).map(Some)
}

/// Reconfigure and run the executor's format-fix target.
pub fn format_sources<L: Launcher>(
    workspace: &Workspace,
    tools: &Toolchain,
    runner: &mut Runner<L>,
) -> Result<StepOutcome> {
    configure(workspace, tools, runner, &[])?;

    let invocation =
        Invocation::new(&tools.executor, &workspace.build_dir).arg(&tools.fix_format_target);
    runner.run(&invocation)
}

fn require_build_dir(workspace: &Workspace, stage: Stage) -> Result<()> {
    if is_dir(&workspace.build_dir) {
        Ok(())
    } else {
        Err(Error::BuildDirMissing {
            stage,
            path: workspace.build_dir.clone(),
        })
    }
}

fn is_dir(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_dir())
}

/// Canonicalize the longest existing prefix of `path`, then apply the
/// remaining components lexically.
fn resolve_path(path: &Path) -> PathBuf {
    let mut base = path.to_path_buf();
    let mut tail = Vec::new();
    while fs::symlink_metadata(&base).is_err() {
        let Some(last) = base.components().next_back() else {
            break;
        };
        let last = last.as_os_str().to_os_string();
        if !base.pop() {
            break;
        }
        tail.push(last);
    }

    let mut resolved = fs::canonicalize(&base).unwrap_or(base);
    for part in tail.iter().rev() {
        if part == ".." {
            resolved.pop();
        } else if part != "." {
            resolved.push(part);
        }
    }
    resolved
}
