pub mod message_types;
pub mod packet_parser;

pub use message_types::{Command, Response, StreamSettings};
pub use packet_parser::PacketParser;
