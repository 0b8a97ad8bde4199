//! CLI command handlers

pub mod commands;
pub mod format;

pub use commands::{
    answer, answer_with_table, ask, periods, OutputFormat, OutputOptions, DEFAULT_DATA_PATH,
};
