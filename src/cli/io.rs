//! JSON I/O handling for CLI
//!
//! - Input: one JSON value per stdin line, blank lines skipped
//! - Output: one JSON object per stdout line
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Reads JSON records from `reader`, one per non-blank line
pub fn read_records<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<Value>> {
    reader
        .lines()
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            serde_json::from_str(&line).map_err(CliError::from)
        })
}

/// Writes one JSON value as a line
pub fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Writes a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &json!({"status": "ok", "data": data}))
}

/// Writes an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(
        &mut io::stdout(),
        &json!({"status": "error", "code": code, "message": message}),
    )
}
