// Line codec for the udp_cfgd ASCII protocol.
//
// Requests:  "SET <w> <h> <bitrate> <fps>\n" | "GET\n"
// Replies:   "OK\n" | "OK <w> <h> <bitrate> <fps>\n" | "ERR <reason>\n"

use crate::error::{AppError, Result};
use crate::protocol::message_types::{Command, Response, StreamSettings};

pub struct PacketParser;

impl PacketParser {
    pub fn serialize_command(command: &Command) -> Vec<u8> {
        Self::command_line(command).into_bytes()
    }

    /// The request line, terminator included.
    pub fn command_line(command: &Command) -> String {
        match command {
            Command::Set(s) => format!("SET {} {} {} {}\n", s.width, s.height, s.bitrate, s.fps),
            Command::Get => "GET\n".to_string(),
        }
    }

    pub fn parse_response(data: &[u8]) -> Result<Response> {
        let text = String::from_utf8_lossy(data);
        let line = text.trim();
        if line.is_empty() {
            return Err(AppError::ProtocolError("empty reply".to_string()));
        }
        if line.contains('\n') {
            return Err(AppError::ProtocolError(format!("multi-line reply: {:?}", line)));
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim_start()),
            None => (line, ""),
        };

        match keyword {
            "OK" => Self::parse_values(rest).map(Response::Ok),
            "ERR" => Ok(Response::Err(rest.to_string())),
            _ => Err(AppError::ProtocolError(format!("unexpected reply: {:?}", line))),
        }
    }

    fn parse_values(rest: &str) -> Result<Option<StreamSettings>> {
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Ok(None),
            [w, h, b, f] => Ok(Some(StreamSettings {
                width: Self::parse_number("width", w)?,
                height: Self::parse_number("height", h)?,
                bitrate: Self::parse_number("bitrate", b)?,
                fps: Self::parse_number("fps", f)?,
            })),
            _ => Err(AppError::ProtocolError(format!(
                "expected 0 or 4 values after OK, got {}: {:?}",
                tokens.len(),
                rest
            ))),
        }
    }

    fn parse_number(field: &str, token: &str) -> Result<u32> {
        token
            .parse::<u32>()
            .map_err(|_| AppError::ProtocolError(format!("invalid {} value: {:?}", field, token)))
    }
}
