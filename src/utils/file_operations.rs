use crate::error::{SyncError, SyncResult};
use crate::utils::ignore_rules::IgnoreRuleSet;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Copy `source` into `target`, skipping every entry matched by `rules`
/// at any depth. Ignored directories are pruned, not descended into.
///
/// Existing target content that is absent from the source is left alone
/// (merge semantics). A non-directory entry sitting at a target directory
/// path is replaced by a directory. Failures on individual entries are
/// recorded and the walk carries on.
///
/// Returns `SyncError::MissingSource` without touching `target` when the
/// source directory does not exist.
pub fn copy_filtered_tree<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    target: Q,
    rules: &IgnoreRuleSet,
) -> SyncResult<Vec<CopyResult>> {
    let source = source.as_ref();
    let target = target.as_ref();

    if !source.is_dir() {
        return Err(SyncError::MissingSource(source.to_path_buf()));
    }

    prepare_target_directory(target)?;

    let mut ignored = Vec::new();
    let mut results = Vec::new();

    let mut walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            match rules.matching_rule(&name) {
                Some(rule) if entry.depth() > 0 => {
                    debug!("Ignoring {} ({})", entry.path().display(), rule);
                    ignored.push(CopyResult::Ignored {
                        source: entry.path().to_path_buf(),
                        rule,
                    });
                    false
                }
                _ => true,
            }
        });

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let failed = e.path().unwrap_or(source).to_path_buf();
                results.push(CopyResult::Failed {
                    destination: destination_for(source, target, &failed),
                    source: failed,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let source_path = entry.path().to_path_buf();
        let dest_path = destination_for(source, target, &source_path);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            debug!("  >> {}/", source_path.display());
            if let Err(e) = prepare_target_directory(&dest_path) {
                results.push(CopyResult::Failed {
                    source: source_path,
                    destination: dest_path,
                    error: e.to_string(),
                });
                walker.skip_current_dir();
            }
        } else if file_type.is_file() {
            debug!("  >> {}", source_path.display());
            results.push(copy_single_file(source_path, dest_path));
        } else {
            warn!("Unknown entry type, skipping: {}", source_path.display());
            results.push(CopyResult::Unsupported {
                source: source_path,
            });
        }
    }

    drop(walker);
    results.append(&mut ignored);
    Ok(results)
}

/// Where `path` (somewhere under `source`) lands under `target`
fn destination_for(source: &Path, target: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(source) {
        Ok(relative) => target.join(relative),
        Err(_) => target.to_path_buf(),
    }
}

/// Make sure `target` is a directory, removing a file that squats its path
fn prepare_target_directory(target: &Path) -> SyncResult<()> {
    if let Ok(metadata) = fs::symlink_metadata(target) {
        if !metadata.is_dir() {
            debug!("Replacing non-directory entry {}", target.display());
            fs::remove_file(target).map_err(|e| SyncError::io(target, e))?;
        }
    }

    fs::create_dir_all(target).map_err(|e| SyncError::io(target, e))
}

fn copy_single_file(source: PathBuf, destination: PathBuf) -> CopyResult {
    match fs::copy(&source, &destination) {
        Ok(bytes) => CopyResult::Copied {
            source,
            destination,
            bytes,
        },
        Err(e) => CopyResult::Failed {
            source,
            destination,
            error: e.to_string(),
        },
    }
}

/// Delete a file or a directory tree; returns whether anything was removed
pub fn remove_entry_if_exists<P: AsRef<Path>>(path: P) -> SyncResult<bool> {
    let path = path.as_ref();
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(false);
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| SyncError::io(path, e))?;
    } else {
        fs::remove_file(path).map_err(|e| SyncError::io(path, e))?;
    }
    Ok(true)
}

/// Create an empty placeholder file in `dir` unless one is already there.
/// Returns `true` when a new file was written.
pub fn ensure_placeholder<P: AsRef<Path>>(dir: P, file_name: &str) -> SyncResult<bool> {
    let placeholder = dir.as_ref().join(file_name);
    if placeholder.exists() {
        return Ok(false);
    }

    fs::File::create(&placeholder).map_err(|e| SyncError::io(&placeholder, e))?;
    Ok(true)
}

/// Outcome for a single entry visited during a filtered copy
#[derive(Debug, Clone)]
pub enum CopyResult {
    Copied {
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },
    Ignored {
        source: PathBuf,
        rule: &'static str,
    },
    Unsupported {
        source: PathBuf,
    },
    Failed {
        source: PathBuf,
        destination: PathBuf,
        error: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyFailure {
    pub source: String,
    pub destination: String,
    pub error: String,
}

/// Counters folded out of a list of copy results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopySummary {
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub ignored: usize,
    pub unsupported: usize,
    pub failures: Vec<CopyFailure>,
}

impl CopySummary {
    pub fn from_results(results: &[CopyResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result {
                CopyResult::Copied { bytes, .. } => {
                    summary.files_copied += 1;
                    summary.bytes_copied += bytes;
                }
                CopyResult::Ignored { .. } => summary.ignored += 1,
                CopyResult::Unsupported { .. } => summary.unsupported += 1,
                CopyResult::Failed {
                    source,
                    destination,
                    error,
                } => summary.failures.push(CopyFailure {
                    source: source.to_string_lossy().to_string(),
                    destination: destination.to_string_lossy().to_string(),
                    error: error.clone(),
                }),
            }
            summary
        })
    }

    pub fn total_visited(&self) -> usize {
        self.files_copied + self.ignored + self.unsupported + self.failures.len()
    }
}
