//! HDL formatter inputs: option flags and source files.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_yml::Value;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Translate the formatter options file into `--name=value` flags.
///
/// The file is a flat YAML mapping. A missing file, or an empty document,
/// yields no flags. Anything other than a mapping of scalars is rejected.
pub fn load_formatter_flags(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        debug!("No formatter config at {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
    let invalid = |message: String| Error::FormatterConfig {
        path: path.to_path_buf(),
        message,
    };

    let document: Value = serde_yml::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    let mapping = match document {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(invalid("expected a mapping of option names to values".into())),
    };

    let mut flags = Vec::with_capacity(mapping.len());
    for (key, value) in &mapping {
        let name = scalar_to_string(key).ok_or_else(|| invalid("option names must be scalars".into()))?;
        let value = scalar_to_string(value)
            .ok_or_else(|| invalid(format!("option '{name}' must have a scalar value")))?;
        flags.push(format!("--{name}={value}"));
    }
    debug!("Formatter flags from {}: {flags:?}", path.display());
    Ok(flags)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Find HDL sources under `root`.
///
/// Files are grouped by extension in the order given; each group is sorted by
/// path. Symlinks to files count as sources; symlinked directories are not
/// descended into. Unreadable directories are skipped with a warning.
pub fn discover_sources(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut groups: Vec<Vec<PathBuf>> = vec![Vec::new(); extensions.len()];

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path during HDL search: {e}");
                continue;
            },
        };
        if !is_file_entry(&entry) {
            continue;
        }
        let Some(ext) = entry.path().extension() else {
            continue;
        };
        if let Some(idx) = extensions.iter().position(|e| OsStr::new(e) == ext) {
            groups[idx].push(entry.into_path());
        }
    }

    groups
        .into_iter()
        .flat_map(|mut group| {
            group.sort();
            group
        })
        .collect()
}

fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
