// Gestion des erreurs du client de commandes

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum AppError {
    /// No reply arrived before the deadline.
    Timeout(Duration),
    /// Socket or name resolution failure.
    TransportError(std::io::Error),
    /// A reply arrived but does not follow the `OK`/`ERR` grammar.
    ProtocolError(String),
    /// The device answered `ERR <reason>`.
    DeviceError(String),
    ConfigError(String),
    InvalidCommand(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Timeout(after) => write!(f, "timeout waiting reply (>{}ms)", after.as_millis()),
            AppError::TransportError(err) => write!(f, "Transport error: {}", err),
            AppError::ProtocolError(msg) => write!(f, "Protocol error: {}", msg),
            AppError::DeviceError(reason) => write!(f, "Device error: {}", reason),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::InvalidCommand(msg) => write!(f, "Invalid command: {}", msg),
        }
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AppError::TransportError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::TransportError(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
