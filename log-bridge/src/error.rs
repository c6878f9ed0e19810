use thiserror::Error;

/// Result of the fallible operations in this crate.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors returned by the bridge.
///
/// The translation paths never fail; these come from parsing helpers, the
/// journal writer and the test fixtures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    /// A level name could not be parsed.
    #[error("unknown log level {0:?}")]
    UnknownLevel(String),

    /// The journal rejected the entry or could not be reached.
    #[error("journal is not available: {0}")]
    JournalUnavailable(String),

    /// Something that should not happen, such as a poisoned lock.
    #[error("internal failure: {0}")]
    InternalFailure(String),
}
