//! Error taxonomy for the cipher engine.
//!
//! Every failure surfaces to the caller as data; the core recovers from none
//! of them and performs no logging on error paths.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MangoError {
    /// Plaintext or ciphertext was zero-length where that is disallowed.
    #[error("input is empty")]
    EmptyInput,

    /// Magic mismatch, truncation, unknown version, or an out-of-range field
    /// while parsing a ciphertext header.
    #[error("bad header: {0}")]
    BadHeader(&'static str),

    /// A sequence referenced a transform id that is not in the library.
    #[error("unknown transform id {0}")]
    UnknownTransform(u8),

    /// The SHA-256 of the recovered plaintext did not match the header tag.
    #[error("integrity check failed: recovered plaintext does not match header tag")]
    IntegrityFailure,

    /// No usable profile exists for the classified input (including the
    /// Combined fallback).
    #[error("no profile available for input class '{0}'")]
    NoProfileAvailable(String),

    /// Block-mode calls presented out of order or mixed with the
    /// whole-buffer API on the same instance.
    #[error("block session misuse: {0}")]
    BlockSessionMisuse(&'static str),

    /// The profile catalog document failed to parse. Fatal at startup.
    #[error("catalog parse error: {0}")]
    BadCatalog(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MangoError>;
