use anyhow::{Context, Result};
use grid_dispatch_shared::codec::{self, CodecError};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let addr = std::env::var("GRID_LISTENER_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());
    let socket = UdpSocket::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listener bound on {}", socket.local_addr()?);

    let mut buf = vec![0u8; codec::MAX_DATAGRAM_SIZE];

    loop {
        match recv_command(&socket, &mut buf).await {
            Ok((src, Ok(command))) => {
                info!("[{}] COMMAND: '{}' ({} bytes)", src, command, command.len());
            }
            Ok((src, Err(e))) => {
                warn!("[{}] Undecodable datagram: {}", src, e);
            }
            Err(e) => {
                error!("Receive error: {}", e);
            }
        }
    }
}

/// Receive one datagram and decode it as a command
async fn recv_command(
    socket: &UdpSocket,
    buf: &mut [u8],
) -> std::io::Result<(SocketAddr, Result<String, CodecError>)> {
    let (n, src) = socket.recv_from(buf).await?;
    Ok((src, codec::decode(&buf[..n])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recv_command() {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .send_to(b"img-center", listener.local_addr().unwrap())
            .await
            .unwrap();

        let mut buf = vec![0u8; 64];
        let (src, command) = recv_command(&listener, &mut buf).await.unwrap();

        assert_eq!(src, client.local_addr().unwrap());
        assert_eq!(command.unwrap(), "img-center");
    }

    #[tokio::test]
    async fn test_recv_invalid_utf8() {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .send_to(&[0xff, 0xfe], listener.local_addr().unwrap())
            .await
            .unwrap();

        let mut buf = vec![0u8; 64];
        let (_, command) = recv_command(&listener, &mut buf).await.unwrap();

        assert!(matches!(command, Err(CodecError::InvalidUtf8(_))));
    }
}
