//! Output formatting module
//!
//! Renders runs, stored history and probe reports for the terminal or files.

mod formatter;

pub use formatter::{write_summary_to_file, OutputFormat, ResultFormatter};
