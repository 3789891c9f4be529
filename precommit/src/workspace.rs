//! Paths and tool settings handed to every stage.

use std::path::{self, Path, PathBuf};

/// Default project root inside the development container.
pub const DEFAULT_PROJECT_ROOT: &str = "/code";

/// Build directory name under the project root.
pub const DEFAULT_BUILD_DIR_NAME: &str = "build";

/// Project root and build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Root of the checked-out project.
    pub project_root: PathBuf,
    /// Disposable build directory, recreated on every configure.
    pub build_dir: PathBuf,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ROOT)
    }
}

impl Workspace {
    /// Workspace with the build directory at `<root>/build`.
    ///
    /// Relative paths are made absolute against the current directory, since
    /// tools run with the build directory or project root as their cwd.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = absolute(project_root.into());
        let build_dir = project_root.join(DEFAULT_BUILD_DIR_NAME);
        Self {
            project_root,
            build_dir,
        }
    }

    /// Override the build directory.
    #[must_use]
    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = absolute(build_dir.into());
        self
    }

    /// Resolve a project-relative path.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.project_root.join(relative)
    }
}

// Only fails for an empty path or an unreadable cwd; the environment check
// rejects the former and every later step would fail on the latter.
fn absolute(path: PathBuf) -> PathBuf {
    path::absolute(&path).unwrap_or(path)
}

/// External programs and their fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Build-graph generator.
    pub generator: String,
    /// Arguments selecting the generator's output format.
    pub generator_args: Vec<String>,
    /// Build executor.
    pub executor: String,
    /// Executor target that runs the test suite.
    pub test_target: String,
    /// Executor target that reformats C++ and CMake sources.
    pub fix_format_target: String,
    /// HDL source formatter.
    pub hdl_formatter: String,
    /// Arguments putting the formatter into in-place mode.
    pub hdl_formatter_args: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            generator: "cmake".to_string(),
            generator_args: vec!["-GNinja".to_string()],
            executor: "ninja".to_string(),
            test_target: "check".to_string(),
            fix_format_target: "fix-format".to_string(),
            hdl_formatter: "verible-verilog-format".to_string(),
            hdl_formatter_args: vec!["--inplace".to_string()],
        }
    }
}

/// Extra flags appended to individual stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageArgs {
    /// Appended to the generator invocation.
    pub configure: Vec<String>,
    /// Appended to the build invocation.
    pub build: Vec<String>,
    /// Appended to the test invocation.
    pub test: Vec<String>,
}

/// Where HDL formatting looks for its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSettings {
    /// Formatter options file, relative to the project root.
    pub config_file: PathBuf,
    /// HDL file extensions, searched in this order.
    pub extensions: Vec<String>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(".verible-verilog-format.yaml"),
            extensions: vec!["sv".to_string(), "v".to_string()],
        }
    }
}
