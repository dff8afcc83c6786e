//! Protocol codec
//!
//! JSON-lines framing for requests and responses that leave the process.
//!
//! ## Wire Format
//! ```text
//! {"Action":"get","KeyFamily":"f","Key":"a","Value":""}\n
//! {"StatusOk":true,"Message":["\"1\""]}\n
//! ```
//!
//! One message per line. Blank lines are skipped.

use std::io::{BufRead, Write};

use crate::error::{JsonKvError, Result};
use super::{Request, Response};

/// Maximum accepted line length (1 MB)
pub const MAX_LINE_SIZE: usize = 1024 * 1024;

/// Read the next request, `None` at end of input
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<Request>> {
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        if line.len() > MAX_LINE_SIZE {
            return Err(JsonKvError::Protocol(format!(
                "Request line too large: {} bytes (max {})",
                line.len(),
                MAX_LINE_SIZE
            )));
        }
        if line.trim().is_empty() {
            continue;
        }
        return serde_json::from_str(line.trim())
            .map(Some)
            .map_err(|e| JsonKvError::Protocol(format!("Invalid request: {}", e)));
    }
}

/// Write one response as a single JSON line
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    serde_json::to_writer(&mut *writer, response).map_err(JsonKvError::Encode)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
