//! Terminal output for the CLI

pub mod output;
pub mod table;

pub use output::{error, header, info, section, success, theme, warn, Theme};
pub use table::{columns_table, stats_table, violations_table};
