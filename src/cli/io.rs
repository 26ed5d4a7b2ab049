//! File and stdout I/O for the CLI
//!
//! - Input: one SQL statement in a UTF-8 text file
//! - Output: one tuple per line, written in a single pass after the whole
//!   result is known

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::executor::ExecutionResult;

use super::errors::{CliError, CliResult};

/// Reads the SQL text of a query file
pub fn read_query(path: &Path) -> CliResult<String> {
    let sql = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    if sql.trim().is_empty() {
        return Err(CliError::io_error(format!(
            "Query file {} is empty",
            path.display()
        )));
    }
    Ok(sql)
}

/// Creates (or truncates) `path` and writes the result into it
pub fn write_result(path: &Path, result: &ExecutionResult) -> CliResult<()> {
    let file = File::create(path)
        .map_err(|e| CliError::io_error(format!("Failed to create {}: {}", path.display(), e)))?;
    let mut out = BufWriter::new(file);
    result.write_to(&mut out)?;
    out.flush()?;
    Ok(())
}

/// Write a raw JSON string to stdout
pub fn write_json(json_str: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json_str)?;
    stdout.flush()?;

    Ok(())
}
