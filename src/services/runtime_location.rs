use crate::error::{SyncError, SyncResult};
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

pub const DEFAULT_RUNTIME_DIR: &str = "runtime";

/// Where the runtime directory lives relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeLocation {
    Fixed(PathBuf),
    /// Newest `vX.Y.Z` directory under the root (older release layout)
    LatestVersion,
}

impl Default for RuntimeLocation {
    fn default() -> Self {
        RuntimeLocation::Fixed(PathBuf::from(DEFAULT_RUNTIME_DIR))
    }
}

pub fn resolve_runtime_dir(root: &Path, location: &RuntimeLocation) -> Result<PathBuf> {
    let runtime_dir = match location {
        RuntimeLocation::Fixed(path) => root.join(path),
        RuntimeLocation::LatestVersion => {
            let dir = find_latest_version_dir(root)?;
            info!("Target version directory: {}", dir.display());
            dir
        }
    };

    Ok(runtime_dir)
}

/// Directory named `vMAJOR.MINOR.PATCH` with the highest version, compared
/// numerically
pub fn find_latest_version_dir(root: &Path) -> SyncResult<PathBuf> {
    let entries = fs::read_dir(root)
        .map_err(|e| SyncError::io(root, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SyncError::io(root, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let Some(version) = parse_version(&entry.file_name().to_string_lossy()) else {
            continue;
        };
        let file_type = entry.file_type().map_err(|e| SyncError::io(entry.path(), e))?;
        if file_type.is_dir() {
            candidates.push((version, entry.path()));
        }
    }

    candidates
        .into_iter()
        .max_by_key(|(version, _)| *version)
        .map(|(_, path)| path)
        .ok_or_else(|| SyncError::NoVersionDirectory(root.to_path_buf()))
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)$").expect("valid version pattern"))
}

/// `v1.10.2` -> `(1, 10, 2)`
pub fn parse_version(name: &str) -> Option<(u64, u64, u64)> {
    let caps = version_pattern().captures(name)?;
    let part = |i: usize| caps.get(i)?.as_str().parse::<u64>().ok();
    Some((part(1)?, part(2)?, part(3)?))
}

/// Resolve and make sure the directory exists
pub fn prepare_runtime_dir(root: &Path, location: &RuntimeLocation) -> Result<PathBuf> {
    let dir = resolve_runtime_dir(root, location)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create runtime directory: {:?}", dir))?;
    Ok(dir)
}
