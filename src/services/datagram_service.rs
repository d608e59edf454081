use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::UdpSocket;

use crate::errors::BoardError;
use crate::state::{Message, ReceiveClock, Record};
use crate::storage::Storage;

/// Sending half of the datagram channel.
///
/// Delivery is at-most-once, unordered and unacknowledged: a send that
/// succeeds only means the datagram left this socket.
#[derive(Debug, Clone)]
pub struct DatagramSender {
    target: SocketAddr,
    max_size: usize,
}

impl DatagramSender {
    pub fn new(target: SocketAddr, max_size: usize) -> Self {
        Self { target, max_size }
    }

    /// Encode `msg` as JSON and send it as one datagram.
    ///
    /// A fresh socket is bound for each call and closed on return.
    pub async fn send(&self, msg: &Message) -> Result<usize, BoardError> {
        let payload = serde_json::to_vec(msg)?;

        if payload.len() > self.max_size {
            tracing::warn!(
                "Datagram of {} bytes exceeds the {} byte receive buffer and will be truncated",
                payload.len(),
                self.max_size
            );
        }

        let local = if self.target.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(local).await?;
        let sent = socket.send_to(&payload, self.target).await?;

        tracing::debug!("Relayed {} bytes to {}", sent, self.target);
        Ok(sent)
    }
}

/// Bind the receiving end of the channel.
pub async fn bind_receiver(addr: SocketAddr) -> Result<UdpSocket, BoardError> {
    Ok(UdpSocket::bind(addr).await?)
}

/// Receive datagrams forever, storing each one before reading the next.
///
/// A datagram that cannot be decoded or stored is logged and dropped; the
/// loop carries on with the next one.
pub async fn run_receiver(socket: UdpSocket, storage: Arc<Storage>, max_size: usize) {
    let mut buf = vec![0u8; max_size];
    let mut clock = ReceiveClock::new();

    match socket.local_addr() {
        Ok(addr) => tracing::info!("Starting UDP receiver on {}", addr),
        Err(_) => tracing::info!("Starting UDP receiver"),
    }

    loop {
        let (n, peer) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Failed to receive datagram: {e}");
                continue;
            }
        };

        match handle_datagram(&buf[..n], &mut clock, &storage).await {
            Ok(timestamp) => tracing::info!("Stored message {} from {}", timestamp, peer),
            Err(e @ BoardError::Io(_)) => {
                tracing::error!("Failed to store datagram from {}: {}", peer, e)
            }
            Err(e) => tracing::warn!("Dropped datagram from {}: {}", peer, e),
        }
    }
}

/// Decode one payload, stamp it with the receive time and persist it.
///
/// Returns the timestamp the message was stored under.
pub async fn handle_datagram(
    payload: &[u8],
    clock: &mut ReceiveClock,
    storage: &Storage,
) -> Result<String, BoardError> {
    let message: Message = serde_json::from_slice(payload)?;
    let timestamp = clock.stamp();

    storage
        .merge_and_persist(Record {
            timestamp: timestamp.clone(),
            message,
        })
        .await?;

    Ok(timestamp)
}
