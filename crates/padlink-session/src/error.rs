use thiserror::Error;

/// Error type for session controller operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request worker thread could not be spawned.
    #[error("failed to start dispatcher: {0}")]
    Spawn(#[from] std::io::Error),
    /// The request worker is gone and accepts no more jobs.
    #[error("dispatcher stopped")]
    DispatcherStopped,
}

/// Convenient result alias for session controller operations.
pub type Result<T> = std::result::Result<T, Error>;
