//! Error types for the accessibility checker.
//!
//! Only a handful of errors are fatal to a checking run: a document whose
//! container cannot be parsed, unsupported encryption, and I/O failures.
//! Everything else degrades to a builder warning or a per-technique
//! `Error` verdict so that one broken object never aborts the whole run.

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while checking a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The PDF container could not be parsed (corrupt header, broken
    /// cross-reference table, malformed objects). Fatal to the run.
    #[error("failed to parse PDF container: {0}")]
    Parse(#[from] lopdf::Error),

    /// The document is encrypted. Decryption is not attempted, so no
    /// document model can be built. Fatal to the run.
    #[error("document is encrypted; content cannot be inspected")]
    Encrypted,

    /// A reference points at an object that is absent from the graph.
    #[error("broken reference: object {0} {1} R not found")]
    BrokenReference(u32, u16),

    /// Resolving a reference revisited an object already on the current
    /// resolution path.
    #[error("circular reference detected while resolving object {0} {1} R")]
    CircularReference(u32, u16),

    /// A stream declares a filter the checker cannot decode.
    #[error("unsupported stream filter: {0}")]
    UnsupportedFilter(String),

    /// A stream's declared filter chain failed to decode.
    #[error("stream decoding failed: {0}")]
    Decode(String),

    /// A single technique's evaluator failed. Converted by the engine to
    /// an `Error` verdict for that technique only.
    #[error("evaluator failed: {0}")]
    Evaluator(String),

    /// IO error while reading the input file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error aborts the whole checking run.
    ///
    /// Non-fatal errors are downgraded to builder warnings or `Error`
    /// verdicts by the callers that encounter them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Encrypted | Error::Io(_))
    }
}
