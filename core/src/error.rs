use shex_store::StoreError;
use thiserror::Error;

/// errors that can occur while running a scenario.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Worker thread '{0}' panicked")]
    WorkerPanicked(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DemoError {
    /// process exit code: 2 for a bad configuration, 1 for anything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            DemoError::InvalidConfig(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
