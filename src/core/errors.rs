use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Icon error: {0}")]
    Icon(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<bincode::Error> for CoreError {
    fn from(value: bincode::Error) -> Self {
        Self::Snapshot(value.to_string())
    }
}

impl From<image::ImageError> for CoreError {
    fn from(value: image::ImageError) -> Self {
        Self::Icon(value.to_string())
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> Self {
        err.to_string()
    }
}
