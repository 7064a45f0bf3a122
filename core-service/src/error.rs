use core_ads::AdError;
use core_games::GamesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The actor behind a command has shut down.
    #[error("Platform bridge has stopped")]
    BridgeStopped,

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Games error: {0}")]
    Games(GamesError),
}

impl From<GamesError> for CoreError {
    fn from(err: GamesError) -> Self {
        match err {
            GamesError::CoordinatorStopped => CoreError::BridgeStopped,
            other => CoreError::Games(other),
        }
    }
}

impl From<AdError> for CoreError {
    fn from(err: AdError) -> Self {
        match err {
            AdError::ControllerStopped => CoreError::BridgeStopped,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
