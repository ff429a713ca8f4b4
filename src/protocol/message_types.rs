// Commandes envoyées à udp_cfgd et réponses renvoyées par le démon.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, Result};

pub const MAX_DIMENSION: u32 = 16384;
pub const MAX_FPS: u32 = 240;
/// udp_cfgd accepts a bitrate strictly below 10000.
pub const MAX_BITRATE: u32 = 9999;

/// The four stream parameters the device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    pub width: u32,
    pub height: u32,
    pub bitrate: u32,
    pub fps: u32,
}

impl StreamSettings {
    pub fn new(width: u32, height: u32, bitrate: u32, fps: u32) -> Self {
        Self { width, height, bitrate, fps }
    }

    /// Checks the ranges the device accepts. Callers are expected to run this
    /// before building a `SET`; the codec itself serializes whatever it gets.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DIMENSION).contains(&self.width) {
            return Err(AppError::InvalidCommand(format!(
                "width {} out of range (1..{})",
                self.width, MAX_DIMENSION
            )));
        }
        if !(1..=MAX_DIMENSION).contains(&self.height) {
            return Err(AppError::InvalidCommand(format!(
                "height {} out of range (1..{})",
                self.height, MAX_DIMENSION
            )));
        }
        if !(1..=MAX_BITRATE).contains(&self.bitrate) {
            return Err(AppError::InvalidCommand(format!(
                "bitrate {} out of range (1..{})",
                self.bitrate, MAX_BITRATE
            )));
        }
        if !(1..=MAX_FPS).contains(&self.fps) {
            return Err(AppError::InvalidCommand(format!(
                "fps {} out of range (1..{})",
                self.fps, MAX_FPS
            )));
        }
        Ok(())
    }
}

impl fmt::Display for StreamSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "width={} height={} bitrate={} fps={}",
            self.width, self.height, self.bitrate, self.fps
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Set(StreamSettings),
    Get,
}

impl Command {
    /// Builds a `SET` after range-checking the settings.
    pub fn set(settings: StreamSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Command::Set(settings))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Set(_) => "SET",
            Command::Get => "GET",
        }
    }
}

/// Outcome carried by a well-formed reply datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK`, with the current settings when the device returned them.
    Ok(Option<StreamSettings>),
    /// `ERR <reason>`.
    Err(String),
}

impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }

    /// Turns a device-side `ERR` into `AppError::DeviceError`.
    pub fn into_result(self) -> Result<Option<StreamSettings>> {
        match self {
            Response::Ok(values) => Ok(values),
            Response::Err(reason) => Err(AppError::DeviceError(reason)),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok(None) => write!(f, "OK"),
            Response::Ok(Some(s)) => write!(f, "OK {} {} {} {}", s.width, s.height, s.bitrate, s.fps),
            Response::Err(reason) if reason.is_empty() => write!(f, "ERR"),
            Response::Err(reason) => write!(f, "ERR {}", reason),
        }
    }
}
