pub mod analyze;
pub mod consolidate;

pub use analyze::{AnalyzeCommand, handle_analyze_command};
pub use consolidate::{ConsolidateCommand, handle_consolidate_command};
