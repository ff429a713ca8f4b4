// Library interface for talking to the udp_cfgd stream-configuration daemon.

pub mod client;
pub mod error;
pub mod init;
pub mod net_utils;
pub mod protocol;
pub mod read_config;

pub use client::{DeviceClient, Endpoint};
pub use error::{AppError, Result};
pub use protocol::{Command, Response, StreamSettings};
