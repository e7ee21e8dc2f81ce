//! Terminal output.

pub mod table;

pub use table::{print_summary, summary_table};
