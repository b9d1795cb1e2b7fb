//! `StreamTee` + `ChunkParser` (spec.md §4.6, §4.7).

pub mod parser;
pub mod tee;

pub use parser::{extract_content, ParseError};
pub use tee::{tee, CaptureOutcome, LiveStream};
