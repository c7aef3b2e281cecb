use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("elevator server not connected")]
    Disconnected,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("floor {0} out of range")]
    InvalidFloor(u8),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
