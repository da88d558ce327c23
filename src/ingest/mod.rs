//! Document ingestion: header parsing and fixed-width chunking.

mod chunker;
mod processor;

pub use chunker::split_fixed;
pub use processor::{DocumentProcessor, ParsedDocument};
