//! Load step: write results to a relational table or a workbook

pub mod database;
pub mod workbook;

pub use database::replace_table;
pub use workbook::WorkbookWriter;
