use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GamesError {
    #[error("Games service error: {0}")]
    Service(#[from] BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Achievement reset rejected with HTTP status {status}")]
    ResetRejected { status: u16 },

    #[error("Games coordinator has stopped")]
    CoordinatorStopped,
}

pub type Result<T> = std::result::Result<T, GamesError>;
