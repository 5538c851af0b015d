pub mod summary_source;
pub mod unit_mapping;

pub use summary_source::{SummaryEntry, SummaryPlan, SummarySection, ALLOWED_EXTENSIONS};
pub use unit_mapping::{AssemblyPlan, DeletionPolicy, UnitMapping, PLACEHOLDER_FILE, PRELOAD_FILES};
