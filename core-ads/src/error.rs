use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdError {
    #[error("Ad controller has stopped")]
    ControllerStopped,
}

pub type Result<T> = std::result::Result<T, AdError>;
