//! JSON Lines support for heddle issue files.
//!
//! Issues are persisted one JSON object per line. This crate provides the
//! two operations the issue repository needs:
//!
//! - [`read_jsonl_resilient`]: load every well-formed record, collecting a
//!   [`Warning`] for each line that cannot be parsed instead of failing.
//! - [`write_jsonl_atomic`]: rewrite a whole file crash-safely using the
//!   temp-file-then-rename pattern.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::write_jsonl_atomic;
pub use error::{Error, Result};
pub use reader::{read_jsonl_resilient, JsonlReader};
pub use warning::Warning;
pub use writer::JsonlWriter;
