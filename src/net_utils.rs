// Fonctions utilitaires réseau pour l'échange d'un datagramme

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use crate::error::{AppError, Result};

pub const RECV_BUFFER_SIZE: usize = 2048;

/// Resolves `host:port`, preferring an IPv4 address when the name has both.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port)).await?.collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| {
            AppError::TransportError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no address found for {}", host),
            ))
        })
}

/// Binds an unconnected ephemeral socket of the same family as `peer`.
/// The reply may come from any source address, as long as it reaches this port.
pub async fn bind_ephemeral(peer: &SocketAddr) -> Result<UdpSocket> {
    let local: SocketAddr = match peer {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    Ok(UdpSocket::bind(local).await?)
}

pub async fn send_text(socket: &UdpSocket, peer: &SocketAddr, payload: &[u8], log_prefix: &str) -> Result<()> {
    let sent = socket.send_to(payload, *peer).await?;
    if sent != payload.len() {
        return Err(AppError::TransportError(std::io::Error::new(
            std::io::ErrorKind::WriteZero,
            format!("short send: {} of {} bytes", sent, payload.len()),
        )));
    }
    log::debug!("{} {} bytes sent to {}", log_prefix, sent, peer);
    Ok(())
}

/// Waits for the next datagram on `socket`. The deadline is the caller's.
///
/// A datagram larger than `RECV_BUFFER_SIZE` is rejected rather than cut.
pub async fn recv_one(socket: &UdpSocket) -> Result<(Vec<u8>, SocketAddr)> {
    let mut buf = [0u8; RECV_BUFFER_SIZE + 1];
    let (len, src) = socket.recv_from(&mut buf).await?;
    if len > RECV_BUFFER_SIZE {
        return Err(AppError::ProtocolError(format!(
            "reply from {} exceeds {} bytes",
            src, RECV_BUFFER_SIZE
        )));
    }
    Ok((buf[..len].to_vec(), src))
}
