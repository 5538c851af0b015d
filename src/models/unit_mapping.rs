use serde::Serialize;
use std::path::{Path, PathBuf};

/// Placeholder that keeps otherwise empty unit directories under version control
pub const PLACEHOLDER_FILE: &str = ".gitkeep";

/// Preload scripts the backend drops straight into the runtime root
pub const PRELOAD_FILES: [&str; 3] = ["preload.js", "window_preload.js", "fast_window_preload.js"];

/// What to remove from a unit's target before copying into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeletionPolicy {
    /// Drop the whole target directory
    ReplaceTarget,
    /// Drop only the named entries directly inside the target
    RemoveEntries(Vec<String>),
    MergeOnly,
}

/// One row of the mapping table: a build output and where it lands in the
/// runtime directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitMapping {
    pub name: String,
    pub source: PathBuf,
    /// Relative to the runtime directory; empty means the runtime root
    pub target: PathBuf,
    pub deletion: DeletionPolicy,
    pub placeholder: bool,
}

impl UnitMapping {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        deletion: DeletionPolicy,
        placeholder: bool,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            deletion,
            placeholder,
        }
    }

    /// Absolute target of this unit inside `runtime_dir`
    pub fn target_in(&self, runtime_dir: &Path) -> PathBuf {
        if self.target.as_os_str().is_empty() {
            runtime_dir.to_path_buf()
        } else {
            runtime_dir.join(&self.target)
        }
    }
}

/// Ordered list of units to assemble into one runtime directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyPlan {
    pub runtime_dir: PathBuf,
    pub units: Vec<UnitMapping>,
    pub placeholder_name: String,
}

impl AssemblyPlan {
    pub fn new(runtime_dir: impl Into<PathBuf>, units: Vec<UnitMapping>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            units,
            placeholder_name: PLACEHOLDER_FILE.to_string(),
        }
    }

    /// The project layout: three frontends get their own directory, the
    /// backend's public assets go to the runtime root
    pub fn standard(root: &Path, runtime_dir: impl Into<PathBuf>) -> Self {
        let apps = root.join("apps");
        let mut preload_entries: Vec<String> = PRELOAD_FILES.iter().map(|f| f.to_string()).collect();
        // left behind when the backend once shipped a nested runtime copy
        preload_entries.push("runtime".to_string());

        Self::new(
            runtime_dir,
            vec![
                UnitMapping::new(
                    "main",
                    apps.join("main").join("dist"),
                    "main",
                    DeletionPolicy::ReplaceTarget,
                    true,
                ),
                UnitMapping::new(
                    "window",
                    apps.join("window").join("dist"),
                    "window",
                    DeletionPolicy::ReplaceTarget,
                    true,
                ),
                UnitMapping::new(
                    "fast_window",
                    apps.join("fast-window"),
                    "fast_window",
                    DeletionPolicy::ReplaceTarget,
                    true,
                ),
                UnitMapping::new(
                    "preload",
                    apps.join("backend").join("public"),
                    "",
                    DeletionPolicy::RemoveEntries(preload_entries),
                    false,
                ),
            ],
        )
    }

    pub fn unit(&self, name: &str) -> Option<&UnitMapping> {
        self.units.iter().find(|unit| unit.name == name)
    }
}
