use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

pub const DEFAULT_PORT: u16 = 5600;

/// Where the device daemon listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let endpoint = Self { host: host.into().trim().to_string(), port };
        endpoint.validate()?;
        Ok(endpoint)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(AppError::ConfigError("host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(AppError::ConfigError("port out of range (1..65535)".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Accepts `host`, `host:port`, `[v6]` and `[v6]:port`; the port defaults to 5600.
impl FromStr for Endpoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| AppError::ConfigError(format!("unterminated '[' in {:?}", s)))?;
            match tail.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None if tail.is_empty() => (host, None),
                None => return Err(AppError::ConfigError(format!("invalid endpoint {:?}", s))),
            }
        } else {
            match s.rsplit_once(':') {
                // A bare IPv6 literal has several colons and no port.
                Some((host, port)) if !host.contains(':') => (host, Some(port)),
                _ => (s, None),
            }
        };

        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| AppError::ConfigError(format!("invalid port {:?}", p)))?,
            None => DEFAULT_PORT,
        };
        Endpoint::new(host, port)
    }
}
