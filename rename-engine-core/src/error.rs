use thiserror::Error;

/// Errors surfaced by the manager's public API.
///
/// Worker-internal failures (a single item's regex call erroring, a single item's
/// rename failing) never reach this type - they are absorbed into the event stream
/// per the error handling design (no per-item error surfaced for a null regex match,
/// `OnRenameCompleted` fires regardless of individual rename outcomes).
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("no items are eligible for rename")]
    NoWork,

    #[error("the regex adapter could not be created or is unavailable")]
    AdapterUnavailable,

    #[error("failed to spawn worker thread: {0}")]
    AllocationFailure(#[from] std::io::Error),

    #[error("the manager has been shut down")]
    Shutdown,

    #[error("unknown observer cookie {0}")]
    UnknownCookie(u64),
}

pub type Result<T> = std::result::Result<T, ManagerError>;
