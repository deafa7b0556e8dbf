use std::io;

use pegmark_syntax::{EngineError, Rule};

/// Everything that can abort a document.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error("Grammar engine failed: {0}")]
    Engine(#[from] EngineError),

    /// The previous rule did not consume what the driver assumed it would.
    #[error("Engine buffer not empty before rule {rule}: {remainder:?}")]
    BufferNotEmpty { rule: Rule, remainder: String },

    #[error("Raw blocks nested deeper than {limit} levels")]
    RawNestingTooDeep { limit: usize },

    /// Re-parsing a raw chunk produced the same raw chunk again.
    #[error("Raw block did not reduce when parsed with rule {rule}")]
    RawNotReduced { rule: Rule },

    #[error("Formatter failed: {0}")]
    Format(#[source] io::Error),
}
