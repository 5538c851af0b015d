use crate::error::{SyncError, SyncResult};
use crate::models::{AssemblyPlan, DeletionPolicy, UnitMapping};
use crate::utils::{
    copy_filtered_tree, ensure_placeholder, remove_entry_if_exists, CopySummary, IgnoreRuleSet,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Rebuild the runtime directory from every unit of `plan`.
///
/// Units are processed in order and independently: a missing source or a
/// failed copy is reported for that unit and the next one still runs.
/// Placeholders are added once all units are done.
pub fn assemble_runtime(plan: &AssemblyPlan, rules: &IgnoreRuleSet) -> Result<AssemblyReport> {
    let started_at = Utc::now();
    info!("Assembling runtime directory {}", plan.runtime_dir.display());

    fs::create_dir_all(&plan.runtime_dir).with_context(|| {
        format!("Failed to create runtime directory: {:?}", plan.runtime_dir)
    })?;

    let units: Vec<UnitReport> = plan
        .units
        .iter()
        .map(|unit| assemble_unit(unit, &plan.runtime_dir, rules))
        .collect();

    let placeholders_created = add_placeholders(plan);

    let report = AssemblyReport {
        runtime_dir: plan.runtime_dir.clone(),
        started_at,
        finished_at: Utc::now(),
        units,
        placeholders_created,
    };

    info!(
        "Runtime assembly finished. Synced: {}, Missing: {}, Failed: {}",
        report.count(UnitStatus::Synced),
        report.count(UnitStatus::SourceMissing),
        report.count(UnitStatus::Failed)
    );

    Ok(report)
}

fn assemble_unit(unit: &UnitMapping, runtime_dir: &Path, rules: &IgnoreRuleSet) -> UnitReport {
    let target = unit.target_in(runtime_dir);
    info!("Updating {} ({} -> {})", unit.name, unit.source.display(), target.display());

    let removed = match apply_deletion(&unit.deletion, &target) {
        Ok(removed) => removed,
        Err(e) => {
            error!("Failed to clear target of {}: {}", unit.name, e);
            return UnitReport::new(unit, target, UnitStatus::Failed).with_error(e.to_string());
        }
    };

    match copy_filtered_tree(&unit.source, &target, rules) {
        Ok(results) => {
            let copy = CopySummary::from_results(&results);
            let status = if copy.failures.is_empty() {
                UnitStatus::Synced
            } else {
                UnitStatus::Failed
            };
            info!(
                "{} updated: {} files copied, {} ignored",
                unit.name, copy.files_copied, copy.ignored
            );
            for failure in &copy.failures {
                error!("  {} -> {}: {}", failure.source, failure.destination, failure.error);
            }

            UnitReport {
                removed,
                copy,
                ..UnitReport::new(unit, target, status)
            }
        }
        Err(SyncError::MissingSource(source)) => {
            warn!("Source directory {} does not exist, skipping {}", source.display(), unit.name);
            UnitReport {
                removed,
                ..UnitReport::new(unit, target, UnitStatus::SourceMissing)
            }
        }
        Err(e) => {
            error!("Failed to copy {}: {}", unit.name, e);
            UnitReport {
                removed,
                ..UnitReport::new(unit, target, UnitStatus::Failed)
            }
            .with_error(e.to_string())
        }
    }
}

/// Clear the target according to the unit's policy; returns what was removed
fn apply_deletion(policy: &DeletionPolicy, target: &Path) -> SyncResult<Vec<PathBuf>> {
    match policy {
        DeletionPolicy::ReplaceTarget => {
            let removed = remove_entry_if_exists(target)?;
            Ok(removed.then(|| target.to_path_buf()).into_iter().collect())
        }
        DeletionPolicy::RemoveEntries(names) => {
            let mut removed = Vec::new();
            for name in names {
                let path = target.join(name);
                if remove_entry_if_exists(&path)? {
                    removed.push(path);
                }
            }
            Ok(removed)
        }
        DeletionPolicy::MergeOnly => Ok(Vec::new()),
    }
}

/// Drop a placeholder into every flagged unit directory that exists.
/// Targets left absent by a missing source stay absent.
fn add_placeholders(plan: &AssemblyPlan) -> Vec<PathBuf> {
    plan.units
        .iter()
        .filter(|unit| unit.placeholder)
        .map(|unit| unit.target_in(&plan.runtime_dir))
        .filter(|target| target.is_dir())
        .filter_map(|target| match ensure_placeholder(&target, &plan.placeholder_name) {
            Ok(true) => Some(target.join(&plan.placeholder_name)),
            Ok(false) => None,
            Err(e) => {
                warn!("Failed to create placeholder in {}: {}", target.display(), e);
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Synced,
    SourceMissing,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub name: String,
    pub source: PathBuf,
    pub target: PathBuf,
    pub status: UnitStatus,
    pub removed: Vec<PathBuf>,
    pub copy: CopySummary,
    pub error: Option<String>,
}

impl UnitReport {
    fn new(unit: &UnitMapping, target: PathBuf, status: UnitStatus) -> Self {
        Self {
            name: unit.name.clone(),
            source: unit.source.clone(),
            target,
            status,
            removed: Vec::new(),
            copy: CopySummary::default(),
            error: None,
        }
    }

    fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

/// Report for a whole assembly run
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyReport {
    pub runtime_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub units: Vec<UnitReport>,
    pub placeholders_created: Vec<PathBuf>,
}

impl AssemblyReport {
    pub fn unit(&self, name: &str) -> Option<&UnitReport> {
        self.units.iter().find(|unit| unit.name == name)
    }

    pub fn count(&self, status: UnitStatus) -> usize {
        self.units.iter().filter(|unit| unit.status == status).count()
    }

    pub fn files_copied(&self) -> usize {
        self.units.iter().map(|unit| unit.copy.files_copied).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.count(UnitStatus::Failed) > 0
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize assembly report")?;
        fs::write(path, json).with_context(|| format!("Failed to write report: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLACEHOLDER_FILE;
    use tempfile::TempDir;

    fn single_unit_plan(root: &Path, deletion: DeletionPolicy) -> AssemblyPlan {
        AssemblyPlan::new(
            root.join("runtime"),
            vec![UnitMapping::new("main", root.join("dist"), "main", deletion, true)],
        )
    }

    #[test]
    fn test_replace_target_removes_stale_files() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("dist")).unwrap();
        fs::write(root.path().join("dist/app.js"), "new").unwrap();
        let stale_dir = root.path().join("runtime/main/old");
        fs::create_dir_all(&stale_dir).unwrap();
        fs::write(stale_dir.join("stale.js"), "stale").unwrap();

        let plan = single_unit_plan(root.path(), DeletionPolicy::ReplaceTarget);
        let report = assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

        let main = root.path().join("runtime/main");
        assert!(!main.join("old").exists());
        assert_eq!(fs::read_to_string(main.join("app.js")).unwrap(), "new");
        assert_eq!(report.unit("main").unwrap().status, UnitStatus::Synced);
        assert_eq!(report.unit("main").unwrap().removed, vec![main.clone()]);
    }

    #[test]
    fn test_merge_only_keeps_existing_files() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("dist")).unwrap();
        fs::write(root.path().join("dist/app.js"), "new").unwrap();
        fs::create_dir_all(root.path().join("runtime/main")).unwrap();
        fs::write(root.path().join("runtime/main/keep.txt"), "keep").unwrap();

        let plan = single_unit_plan(root.path(), DeletionPolicy::MergeOnly);
        assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

        assert!(root.path().join("runtime/main/keep.txt").exists());
        assert!(root.path().join("runtime/main/app.js").exists());
    }

    #[test]
    fn test_missing_source_leaves_target_absent_without_placeholder() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("runtime/main")).unwrap();
        fs::write(root.path().join("runtime/main/stale.js"), "stale").unwrap();

        let plan = single_unit_plan(root.path(), DeletionPolicy::ReplaceTarget);
        let report = assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

        assert!(!root.path().join("runtime/main").exists());
        assert_eq!(report.unit("main").unwrap().status, UnitStatus::SourceMissing);
        assert!(report.placeholders_created.is_empty());
        assert!(!report.has_failures());
    }

    #[test]
    fn test_file_at_unit_target_is_removed_when_source_missing() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("runtime")).unwrap();
        let stale = root.path().join("runtime/main");
        fs::write(&stale, "stale file where the unit directory belongs").unwrap();

        let plan = single_unit_plan(root.path(), DeletionPolicy::ReplaceTarget);
        let report = assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

        let main = report.unit("main").unwrap();
        assert_eq!(main.status, UnitStatus::SourceMissing);
        assert_eq!(main.removed, vec![stale.clone()]);
        assert!(fs::symlink_metadata(&stale).is_err());
    }

    #[test]
    fn test_placeholder_added_once() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("dist")).unwrap();
        let plan = single_unit_plan(root.path(), DeletionPolicy::MergeOnly);
        let rules = IgnoreRuleSet::build_artifacts();

        let first = assemble_runtime(&plan, &rules).unwrap();
        let second = assemble_runtime(&plan, &rules).unwrap();

        let main = root.path().join("runtime/main");
        assert_eq!(first.placeholders_created, vec![main.join(PLACEHOLDER_FILE)]);
        assert!(second.placeholders_created.is_empty());
        assert_eq!(fs::read_dir(&main).unwrap().count(), 1);
    }

    #[test]
    fn test_remove_entries_only_touches_named_entries() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("public")).unwrap();
        fs::write(root.path().join("public/preload.js"), "fresh").unwrap();
        let runtime = root.path().join("runtime");
        fs::create_dir_all(runtime.join("runtime")).unwrap();
        fs::write(runtime.join("preload.js"), "old").unwrap();
        fs::write(runtime.join("window_preload.js"), "old").unwrap();
        fs::write(runtime.join("plugin.json"), "{}").unwrap();

        let plan = AssemblyPlan::new(
            &runtime,
            vec![UnitMapping::new(
                "preload",
                root.path().join("public"),
                "",
                DeletionPolicy::RemoveEntries(vec![
                    "preload.js".to_string(),
                    "window_preload.js".to_string(),
                    "runtime".to_string(),
                ]),
                false,
            )],
        );
        let report = assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

        assert_eq!(fs::read_to_string(runtime.join("preload.js")).unwrap(), "fresh");
        assert!(!runtime.join("window_preload.js").exists());
        assert!(!runtime.join("runtime").exists());
        assert!(runtime.join("plugin.json").exists());
        assert_eq!(report.unit("preload").unwrap().removed.len(), 3);
        assert!(report.placeholders_created.is_empty());
    }

    #[test]
    fn test_report_serializes_with_snake_case_status() {
        let root = TempDir::new().unwrap();
        let plan = single_unit_plan(root.path(), DeletionPolicy::ReplaceTarget);
        let report = assemble_runtime(&plan, &IgnoreRuleSet::build_artifacts()).unwrap();

        let path = root.path().join("report.json");
        report.write_json(&path).unwrap();
        let json = fs::read_to_string(path).unwrap();
        assert!(json.contains("\"source_missing\""));
        assert!(json.contains("\"started_at\""));
    }
}
