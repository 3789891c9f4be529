//! Startup gate: refuse to run outside a container or without a project root.
//!
//! Configure wipes the build directory, so the tool only runs where that is
//! known to be disposable.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::workspace::Workspace;

/// Default process-metadata file inspected for a container runtime.
pub const DEFAULT_PROBE_FILE: &str = "/proc/1/cgroup";

/// Default marker looked for in the probe file.
pub const DEFAULT_MARKER: &str = "docker";

/// Container detection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerProbe {
    /// Pseudo-file listing the control groups of PID 1.
    pub probe_file: PathBuf,
    /// Substring identifying the container runtime.
    pub marker: String,
}

impl Default for ContainerProbe {
    fn default() -> Self {
        Self {
            probe_file: PathBuf::from(DEFAULT_PROBE_FILE),
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl ContainerProbe {
    /// Create a probe for a specific file and marker.
    pub fn new(probe_file: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            probe_file: probe_file.into(),
            marker: marker.into(),
        }
    }

    /// Returns `true` if the probe file mentions the marker.
    ///
    /// An unreadable probe file counts as "not in a container".
    pub fn in_container(&self) -> bool {
        match fs::read_to_string(&self.probe_file) {
            Ok(content) => content.contains(&self.marker),
            Err(e) => {
                debug!("Cannot read {}: {e}", self.probe_file.display());
                false
            },
        }
    }
}

/// Check both startup preconditions, container first.
pub fn validate(probe: &ContainerProbe, workspace: &Workspace) -> Result<()> {
    if !probe.in_container() {
        return Err(Error::NotInContainer {
            probe: probe.probe_file.clone(),
        });
    }
    ensure_project_root(&workspace.project_root)
}

fn ensure_project_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        debug!("Project root: {}", root.display());
        Ok(())
    } else {
        Err(Error::ProjectRootMissing(root.to_path_buf()))
    }
}
