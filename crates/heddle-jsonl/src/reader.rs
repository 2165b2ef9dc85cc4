//! JSONL reading operations.
//!
//! Lines are read through a buffered async reader that tracks 1-based line
//! numbers so that warnings can point at the offending line.

use crate::{Result, Warning};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async line reader for JSONL data.
///
/// Lines are read as raw bytes so that a line with invalid UTF-8 can be
/// reported and skipped instead of aborting the whole read.
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// Line number of the last line returned, 0 before the first read.
    line_number: usize,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the line number of the last line read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line, without its line terminator.
    ///
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    pub async fn next_line(&mut self) -> Result<Option<&[u8]>> {
        loop {
            self.buf.clear();
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if !self.buf.trim_ascii().is_empty() {
                let line = self.buf.strip_suffix(b"\n").unwrap_or(self.buf.as_slice());
                return Ok(Some(line.strip_suffix(b"\r").unwrap_or(line)));
            }
        }
    }

    /// Deserializes every remaining line, skipping lines that fail to parse.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures; undecodable or unparsable
    /// lines become warnings.
    pub async fn read_all_resilient<T: DeserializeOwned>(
        &mut self,
    ) -> Result<(Vec<T>, Vec<Warning>)> {
        let mut values = Vec::new();
        let mut warnings = Vec::new();

        while let Some(line) = self.next_line().await? {
            let Ok(text) = std::str::from_utf8(line) else {
                let line_number = self.line_number;
                tracing::debug!(line_number, "Skipping JSONL line with invalid UTF-8");
                warnings.push(Warning::InvalidUtf8 { line_number });
                continue;
            };

            match serde_json::from_str::<T>(text) {
                Ok(value) => values.push(value),
                Err(e) => {
                    let line_number = self.line_number;
                    tracing::debug!(line_number, error = %e, "Skipping malformed JSONL line");
                    warnings.push(Warning::MalformedJson {
                        line_number,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok((values, warnings))
    }
}

/// Reads a JSONL file, collecting warnings for malformed lines.
///
/// A file that does not exist reads as empty, so a freshly initialized
/// repository needs no special casing.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be opened or read.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = match File::open(path.as_ref()).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.as_ref().display(), "JSONL file missing, reading as empty");
            return Ok((Vec::new(), Vec::new()));
        }
        Err(e) => return Err(e.into()),
    };

    JsonlReader::new(file).read_all_resilient().await
}
