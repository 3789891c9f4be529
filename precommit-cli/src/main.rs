//! precommit CLI - run pre-commit checks inside the development container.
//!
//! ## Stages
//!
//! - Format HDL sources and C++/CMake sources
//! - Configure a fresh build directory
//! - Build
//! - Test
//!
//! Each stage can be skipped; tool failures are reported but do not stop the
//! run, missing tools and environment problems do.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use env_logger::Env;
use log::debug;
use precommit::{Pipeline, StageArgs, StageFlags, Workspace};
use std::env;
use std::path::PathBuf;

mod config;
mod report;

use config::Config;

/// precommit - Format, build and test the project before committing.
///
/// Environment variables:
///   PRECOMMIT_PROJECT_ROOT   - Project root (default: /code)
///   PRECOMMIT_BUILD_DIR      - Build directory (default: <project root>/build)
#[derive(Parser)]
#[command(name = "precommit")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Must be run from within the project's docker container.")]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Skip configure, build and test.
    #[arg(long)]
    skip_build: bool,

    /// Skip tests.
    #[arg(long)]
    skip_test: bool,

    /// Skip HDL and C++/CMake formatting.
    #[arg(long)]
    skip_format: bool,

    /// Project root directory.
    #[arg(long, env = "PRECOMMIT_PROJECT_ROOT", value_name = "PATH")]
    project_root: Option<PathBuf>,

    /// Build directory (wiped on every configure).
    #[arg(long, env = "PRECOMMIT_BUILD_DIR", value_name = "PATH")]
    build_dir: Option<PathBuf>,

    /// Extra argument for the generator (can be repeated).
    #[arg(long = "configure-arg", value_name = "ARG", allow_hyphen_values = true)]
    configure_args: Vec<String>,

    /// Extra argument for the build (can be repeated).
    #[arg(long = "build-arg", value_name = "ARG", allow_hyphen_values = true)]
    build_args: Vec<String>,

    /// Extra argument for the test run (can be repeated).
    #[arg(long = "test-arg", value_name = "ARG", allow_hyphen_values = true)]
    test_args: Vec<String>,

    /// Print the run report as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Verbose output level (-v, -vv, -vvv for increasing detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long)]
    quiet: bool,

    /// Path to a configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
}

impl Cli {
    fn stage_flags(&self) -> StageFlags {
        StageFlags {
            skip_format: self.skip_format,
            skip_build: self.skip_build,
            skip_test: self.skip_test,
        }
    }

    /// CLI paths win over config paths; the build directory defaults to
    /// `<project root>/build`.
    fn workspace(&self, config: &Config) -> Workspace {
        let project_root = self
            .project_root
            .clone()
            .or_else(|| config.paths.project_root.clone());
        let workspace = project_root.map_or_else(Workspace::default, Workspace::new);

        match self
            .build_dir
            .clone()
            .or_else(|| config.paths.build_dir.clone())
        {
            Some(build_dir) => workspace.with_build_dir(build_dir),
            None => workspace,
        }
    }

    /// Config flags first, then CLI flags.
    fn stage_args(&self, config: &Config) -> StageArgs {
        let mut args = config.stage_args();
        args.configure.extend(self.configure_args.iter().cloned());
        args.build.extend(self.build_args.iter().cloned());
        args.test.extend(self.test_args.iter().cloned());
        args
    }
}

fn main() -> Result<()> {
    // --- NO_COLOR and TTY detection ---
    let stderr_is_tty = console::Term::stderr().is_term();
    if env::var("NO_COLOR").is_ok() || !stderr_is_tty {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "precommit v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    // Load configuration
    let config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    let workspace = cli.workspace(&config);
    debug!(
        "Project root {}, build directory {}",
        workspace.project_root.display(),
        workspace.build_dir.display()
    );

    let mut pipeline = Pipeline::new(workspace)
        .toolchain(config.toolchain())
        .format_settings(config.format_settings())
        .stage_args(cli.stage_args(&config))
        .probe(config.probe());

    let show_progress = !cli.quiet && !cli.json;
    let outcome = pipeline.run_with_progress(cli.stage_flags(), &mut |stage| {
        if show_progress {
            report::print_progress(stage);
        }
    });
    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            let root = pipeline.workspace().project_root.clone();
            if e.is_environment() && !cli.quiet {
                report::print_environment_hint(&root);
            }
            return Err(e).with_context(|| format!("Pre-commit run in {} aborted", root.display()));
        },
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::report_json(&report)).unwrap_or_default()
        );
    } else if !cli.quiet {
        report::print_summary(&report);
    } else if !report.is_clean() {
        eprintln!(
            "{} {} command(s) exited non-zero",
            style("⚠").yellow(),
            report.failures.len()
        );
    }

    Ok(())
}
