//! Transform steps: combine, clean, join, derive and aggregate datasets

pub mod aggregate;
pub mod clean;
pub mod combine;
pub mod derive;
pub mod join;

pub use aggregate::{monthly_sum, pivot_sum, sum_by};
pub use clean::{drop_duplicates, fill_missing, parse_datetimes};
pub use combine::combine;
pub use derive::{add_month_column, multiply_columns};
pub use join::{expected_join_rows, left_join};
