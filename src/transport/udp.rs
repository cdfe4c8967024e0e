//! UDP transport: one ephemeral socket per command

use crate::config::DispatchConfig;
use crate::transport::traits::CommandSender;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use grid_dispatch_shared::{codec, defaults, SendOutcome, UdpCommand};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Sends each command as a single datagram from a fresh socket
///
/// No state is kept between sends: the socket is bound, written once and
/// dropped before `send` returns, including on the timeout and
/// cancellation paths.
#[derive(Debug, Clone)]
pub struct UdpSender {
    send_timeout: Duration,
}

impl UdpSender {
    /// Create a sender bounding resolution plus write by `send_timeout`
    pub fn new(send_timeout: Duration) -> Self {
        Self { send_timeout }
    }

    /// Create a sender using the configured timeout
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(config.send_timeout())
    }

    async fn try_send(&self, command: &UdpCommand) -> Result<SocketAddr> {
        let payload = codec::encode(command)?;
        let target = resolve(&command.target_host, command.target_port).await?;

        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.send_to(&payload, target).await?;

        Ok(target)
    }
}

impl Default for UdpSender {
    fn default() -> Self {
        Self::new(Duration::from_millis(defaults::SEND_TIMEOUT_MS))
    }
}

/// Resolve a host, preferring IPv4 so `localhost` reaches IPv4 listeners
async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| anyhow!("no addresses found for host {}", host))
}

#[async_trait]
impl CommandSender for UdpSender {
    async fn send(&self, command: &UdpCommand) -> SendOutcome {
        match timeout(self.send_timeout, self.try_send(command)).await {
            Ok(Ok(target)) => {
                debug!(
                    "[UDP] Sent '{}' ({} bytes) to {} ({})",
                    command.command,
                    command.command.len(),
                    command.destination(),
                    target
                );
                SendOutcome::sent(command)
            }
            Ok(Err(e)) => {
                warn!("[UDP] Send to {} failed: {}", command.destination(), e);
                SendOutcome::failed(e)
            }
            Err(_) => {
                warn!(
                    "[UDP] Send to {} timed out after {:?}",
                    command.destination(),
                    self.send_timeout
                );
                SendOutcome::failed(format!("timed out after {:?}", self.send_timeout))
            }
        }
    }

    fn name(&self) -> &'static str {
        "UDP"
    }
}
