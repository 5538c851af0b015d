pub mod file_operations;
pub mod ignore_rules;

pub use file_operations::{
    copy_filtered_tree, ensure_placeholder, remove_entry_if_exists,
    CopyFailure, CopyResult, CopySummary,
};
pub use ignore_rules::{IgnoreRule, IgnoreRuleSet};
