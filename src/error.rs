//! Error taxonomy for transport and store operations

use thiserror::Error;

/// Errors surfaced by the transport adapter and the account store.
#[derive(Debug, Error)]
pub enum Error {
    /// The listing page came back without the token table, which is
    /// what Steam serves when the browser session is not logged in.
    /// The store recovers from this by polling until login succeeds.
    #[error("not logged in to Steam")]
    NeedsLogin,

    /// The listing page had a token table, but a row did not match the
    /// expected shape. Signals an upstream markup change we cannot
    /// handle; never retried.
    #[error("unknown page structure: {0}")]
    MalformedPage(String),

    /// Request-level failure (connect, timeout, TLS, ...).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The store was closed while an operation was waiting.
    #[error("store closed")]
    Closed,

    /// A spawned batch item panicked or was aborted.
    #[error("batch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
