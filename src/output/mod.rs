//! Output formatting for suite results

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod json;
pub mod report;
pub mod table;

pub use report::RunSummary;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;
}

/// Format and print data to stdout
pub fn print<T: Formattable>(data: &T, format: OutputFormat) -> Result<()> {
    let output = data.format(format)?;
    println!("{}", output);
    Ok(())
}
