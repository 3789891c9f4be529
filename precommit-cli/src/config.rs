//! Configuration file support for precommit.
//!
//! Configuration is loaded from multiple sources with the following priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables (PRECOMMIT_*)
//! 3. Local config file (./precommit.toml)
//! 4. Global config file (~/.config/precommit/config.toml)
//!
//! `--config <PATH>` replaces layers 3 and 4.

use directories::ProjectDirs;
use log::{debug, warn};
use precommit::{ContainerProbe, FormatSettings, StageArgs, Toolchain};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Local configuration file name.
pub const LOCAL_CONFIG_FILE: &str = "precommit.toml";

/// Project and build directory locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Project root (default `/code`).
    pub project_root: Option<PathBuf>,
    /// Build directory (default `<project_root>/build`).
    pub build_dir: Option<PathBuf>,
}

/// External tool overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Build-graph generator.
    pub generator: Option<String>,
    /// Generator arguments (default `["-GNinja"]`).
    pub generator_args: Option<Vec<String>>,
    /// Build executor.
    pub executor: Option<String>,
    /// Test target name.
    pub test_target: Option<String>,
    /// Format-fix target name.
    pub fix_format_target: Option<String>,
    /// HDL formatter.
    pub hdl_formatter: Option<String>,
    /// HDL formatter arguments (default `["--inplace"]`).
    pub hdl_formatter_args: Option<Vec<String>>,
}

/// HDL formatting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Formatter options file, relative to the project root.
    pub config_file: Option<PathBuf>,
    /// HDL extensions to search for.
    pub extensions: Option<Vec<String>>,
}

/// Extra per-stage flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagesConfig {
    /// Appended to the generator invocation.
    pub configure_args: Option<Vec<String>>,
    /// Appended to the build invocation.
    pub build_args: Option<Vec<String>>,
    /// Appended to the test invocation.
    pub test_args: Option<Vec<String>>,
}

/// Container detection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// File inspected for the container marker.
    pub probe_file: Option<PathBuf>,
    /// Marker string.
    pub marker: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// External tools.
    #[serde(default)]
    pub tools: ToolsConfig,
    /// HDL formatting.
    #[serde(default)]
    pub format: FormatConfig,
    /// Per-stage flags.
    #[serde(default)]
    pub stages: StagesConfig,
    /// Container detection.
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

impl Config {
    /// Global config, then the local `precommit.toml`, each layer merged over
    /// the previous one. Missing or unusable layers are skipped.
    pub fn load() -> Self {
        Self::global_config_path()
            .into_iter()
            .chain([PathBuf::from(LOCAL_CONFIG_FILE)])
            .filter_map(|path| Self::read_layer(&path))
            .fold(Self::default(), |mut config, layer| {
                config.merge(layer);
                config
            })
    }

    /// The single file named by `--config`. Falls back to built-in settings
    /// when it cannot be used.
    pub fn load_from_path(path: &Path) -> Self {
        Self::read_layer(path).unwrap_or_else(|| {
            warn!(
                "--config {} is unusable, continuing with built-in settings",
                path.display()
            );
            Self::default()
        })
    }

    /// One config layer. `None` if the file is absent, unreadable or not
    /// valid TOML; only the last two are worth a warning.
    fn read_layer(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No precommit config at {}", path.display());
                return None;
            },
            Err(e) => {
                warn!("Ignoring precommit config {}: {e}", path.display());
                return None;
            },
        };

        match toml::from_str(&content) {
            Ok(layer) => {
                debug!("Using precommit config {}", path.display());
                Some(layer)
            },
            Err(e) => {
                warn!("Ignoring precommit config {}: {e}", path.display());
                None
            },
        }
    }

    /// Get the global configuration directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "precommit").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the global configuration file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Merge another config into this one. Set values in `other` win.
    fn merge(&mut self, other: Self) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut self.paths.project_root, other.paths.project_root);
        set(&mut self.paths.build_dir, other.paths.build_dir);

        set(&mut self.tools.generator, other.tools.generator);
        set(&mut self.tools.generator_args, other.tools.generator_args);
        set(&mut self.tools.executor, other.tools.executor);
        set(&mut self.tools.test_target, other.tools.test_target);
        set(&mut self.tools.fix_format_target, other.tools.fix_format_target);
        set(&mut self.tools.hdl_formatter, other.tools.hdl_formatter);
        set(&mut self.tools.hdl_formatter_args, other.tools.hdl_formatter_args);

        set(&mut self.format.config_file, other.format.config_file);
        set(&mut self.format.extensions, other.format.extensions);

        set(&mut self.stages.configure_args, other.stages.configure_args);
        set(&mut self.stages.build_args, other.stages.build_args);
        set(&mut self.stages.test_args, other.stages.test_args);

        set(&mut self.environment.probe_file, other.environment.probe_file);
        set(&mut self.environment.marker, other.environment.marker);
    }

    /// External tools with configured overrides applied.
    pub fn toolchain(&self) -> Toolchain {
        let defaults = Toolchain::default();
        let tools = self.tools.clone();
        Toolchain {
            generator: tools.generator.unwrap_or(defaults.generator),
            generator_args: tools.generator_args.unwrap_or(defaults.generator_args),
            executor: tools.executor.unwrap_or(defaults.executor),
            test_target: tools.test_target.unwrap_or(defaults.test_target),
            fix_format_target: tools.fix_format_target.unwrap_or(defaults.fix_format_target),
            hdl_formatter: tools.hdl_formatter.unwrap_or(defaults.hdl_formatter),
            hdl_formatter_args: tools
                .hdl_formatter_args
                .unwrap_or(defaults.hdl_formatter_args),
        }
    }

    /// HDL formatting settings with configured overrides applied.
    pub fn format_settings(&self) -> FormatSettings {
        let defaults = FormatSettings::default();
        FormatSettings {
            config_file: self
                .format
                .config_file
                .clone()
                .unwrap_or(defaults.config_file),
            extensions: self
                .format
                .extensions
                .clone()
                .unwrap_or(defaults.extensions),
        }
    }

    /// Configured per-stage flags.
    pub fn stage_args(&self) -> StageArgs {
        StageArgs {
            configure: self.stages.configure_args.clone().unwrap_or_default(),
            build: self.stages.build_args.clone().unwrap_or_default(),
            test: self.stages.test_args.clone().unwrap_or_default(),
        }
    }

    /// Container probe with configured overrides applied.
    pub fn probe(&self) -> ContainerProbe {
        let defaults = ContainerProbe::default();
        ContainerProbe {
            probe_file: self
                .environment
                .probe_file
                .clone()
                .unwrap_or(defaults.probe_file),
            marker: self.environment.marker.clone().unwrap_or(defaults.marker),
        }
    }
}
