use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gyroscope unavailable: {0}")]
    Unavailable(String),
    #[error("gyroscope timeout")]
    Timeout,
    #[error("unparseable sysfs value: {0}")]
    Parse(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
