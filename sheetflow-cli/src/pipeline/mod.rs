//! The two end-to-end pipelines

pub mod analyze;
pub mod consolidate;

pub use analyze::run as run_analyze;
pub use consolidate::run as run_consolidate;
