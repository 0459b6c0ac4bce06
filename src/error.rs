//! Error types for the `chatfolio` crate.

use thiserror::Error;

/// Errors that can occur in the chat resume core.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration validation error (bad chunk sizing, missing builder fields).
    ///
    /// Fatal at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The embedding capability failed (non-2xx response, network failure,
    /// or malformed payload).
    ///
    /// Fatal during ingestion; degrades to an empty result during query-time
    /// search.
    #[error("Embedding unavailable ({provider}): {message}")]
    EmbeddingUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The persistence backend failed.
    ///
    /// Never propagates past the retrieval path; the conversation degrades
    /// to "no extra context" instead.
    #[error("Storage unavailable ({backend}): {message}")]
    StorageUnavailable {
        /// The storage backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Input rejected before entering the pipeline (unknown file type,
    /// empty pasted text).
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// A generation capability (structured or streaming) failed.
    #[error("Generation error: {0}")]
    Model(String),

    /// Document ingestion aborted mid-pipeline.
    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    /// A tool call could not be executed.
    #[error("Tool error: {0}")]
    Tool(String),
}

/// A convenience result type for chatfolio operations.
pub type Result<T> = std::result::Result<T, Error>;
