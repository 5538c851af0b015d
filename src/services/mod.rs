pub mod runtime_assembly;
pub mod runtime_location;
pub mod text_aggregation;
pub mod text_sink;

pub use runtime_assembly::{assemble_runtime, AssemblyReport, UnitReport, UnitStatus};
pub use runtime_location::{
    find_latest_version_dir, prepare_runtime_dir, resolve_runtime_dir, RuntimeLocation,
};
pub use text_aggregation::{build_summary, run_summary, write_summary, SummaryReport};
pub use text_sink::{ClipboardSink, MemorySink, TextSink};
