pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::PathBuf;
use std::time::Duration;

// Re-export commonly used types
pub use error::{SyncError, SyncResult};
pub use models::{AssemblyPlan, DeletionPolicy, SummaryEntry, SummaryPlan, SummarySection, UnitMapping};
pub use services::{
    assemble_runtime, run_summary, AssemblyReport, ClipboardSink, MemorySink, RuntimeLocation,
    SummaryReport, TextSink, UnitStatus,
};
pub use utils::{copy_filtered_tree, IgnoreRuleSet};

/// Settings for the `assemble` command
#[derive(Debug, Clone, Default)]
pub struct AssemblyConfig {
    pub location: RuntimeLocation,
    pub report_path: Option<PathBuf>,
}

/// Settings for the `summarize` command
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Defaults to `result.txt` under the project root
    pub output: Option<PathBuf>,
    pub publish_to_clipboard: bool,
    pub clipboard_hold: Duration,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            output: None,
            publish_to_clipboard: true,
            clipboard_hold: services::text_sink::DEFAULT_CLIPBOARD_HOLD,
        }
    }
}

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: PathBuf,
    pub assembly: AssemblyConfig,
    pub summary: SummaryConfig,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            assembly: AssemblyConfig::default(),
            summary: SummaryConfig::default(),
            log_level: "info".to_string(),
        }
    }
}
