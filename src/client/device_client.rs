// Côté client de l'échange avec udp_cfgd : un datagramme de commande envoyé,
// un datagramme de réponse reçu, ou un timeout.

use std::time::Duration;
use log::{debug, info, warn};

use crate::client::endpoint::Endpoint;
use crate::error::{AppError, Result};
use crate::net_utils;
use crate::protocol::{Command, PacketParser, Response, StreamSettings};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone)]
pub struct DeviceClient {
    endpoint: Endpoint,
    timeout: Duration,
}

impl DeviceClient {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        endpoint.validate()?;
        if timeout.is_zero() {
            return Err(AppError::ConfigError("timeout must be positive".to_string()));
        }
        Ok(Self { endpoint, timeout })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `command` as a single datagram and waits for one reply.
    ///
    /// The timeout bounds the whole call: name resolution, send and receive.
    /// Each call binds its own ephemeral socket, so calls from concurrent
    /// tasks never read each other's replies. A device-side `ERR` comes back
    /// as `Ok(Response::Err(..))`; use [`Response::into_result`] to treat it
    /// as an error.
    pub async fn send(&self, command: &Command) -> Result<Response> {
        let reply = match tokio::time::timeout(self.timeout, self.exchange(command)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!("Exchange with {} failed: {}", self.endpoint, e);
                return Err(e);
            }
            Err(_) => {
                warn!("No reply from {} within {}ms", self.endpoint, self.timeout.as_millis());
                return Err(AppError::Timeout(self.timeout));
            }
        };
        PacketParser::parse_response(&reply)
    }

    async fn exchange(&self, command: &Command) -> Result<Vec<u8>> {
        let peer = net_utils::resolve(&self.endpoint.host, self.endpoint.port).await?;
        let socket = net_utils::bind_ephemeral(&peer).await?;

        let payload = PacketParser::serialize_command(command);
        info!("[SEND] {} to {} ({})", command.name(), self.endpoint, peer);
        net_utils::send_text(&socket, &peer, &payload, "[SEND]").await?;

        let (reply, src) = net_utils::recv_one(&socket).await?;
        debug!("[RECV] {} bytes from {}: {:?}", reply.len(), src, String::from_utf8_lossy(&reply));
        Ok(reply)
    }

    /// Same exchange as [`send`](Self::send) for callers without a runtime.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn send_blocking(&self, command: &Command) -> Result<Response> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.send(command))
    }

    /// Applies new stream settings.
    pub async fn set(&self, settings: StreamSettings) -> Result<()> {
        let command = Command::set(settings)?;
        self.send(&command).await?.into_result().map(|_| ())
    }

    /// Reads the settings currently applied on the device.
    pub async fn get(&self) -> Result<StreamSettings> {
        self.send(&Command::Get)
            .await?
            .into_result()?
            .ok_or_else(|| AppError::ProtocolError("OK reply to GET carried no values".to_string()))
    }
}
