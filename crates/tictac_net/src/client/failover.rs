//! Locating a server over the multicast group.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tictac_protocol::{DATAGRAM_SIZE, DiscoveryDatagram};
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::NetConfig;
use crate::error::ClientError;

/// Remaining failed connections the client will tolerate.
///
/// Carried explicitly by the client rather than hidden in the failover
/// routine, so every reconnect draws from the same budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    initial: u32,
    remaining: u32,
}

impl AttemptBudget {
    /// A budget of `attempts` failures.
    pub fn new(attempts: u32) -> Self {
        Self {
            initial: attempts,
            remaining: attempts,
        }
    }

    /// Attempts still available.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Records one failed connection. Fails once the budget is already empty.
    pub fn spend(&mut self) -> Result<(), ClientError> {
        if self.remaining == 0 {
            return Err(ClientError::AttemptsExhausted {
                attempts: self.initial,
            });
        }
        self.remaining -= 1;
        Ok(())
    }
}

/// Client end of the discovery exchange.
#[derive(Debug)]
pub struct Discovery {
    socket: UdpSocket,
    target: SocketAddr,
    timeout: Duration,
}

impl Discovery {
    /// Opens an ephemeral UDP socket aimed at the configured group.
    pub async fn bind(config: &NetConfig) -> Result<Self, ClientError> {
        let socket =
            UdpSocket::bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))).await?;
        socket.set_multicast_loop_v4(true)?;
        Ok(Self::from_parts(
            socket,
            config.group_addr(),
            config.discovery_timeout(),
        ))
    }

    /// Uses an existing socket and target (any address, not only a group).
    pub fn from_parts(socket: UdpSocket, target: SocketAddr, timeout: Duration) -> Self {
        Self {
            socket,
            target,
            timeout,
        }
    }

    /// Asks for a game and returns the first server that offers one.
    ///
    /// The advertised address is the responder's source IP with the port
    /// carried in its reply.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn locate(&self) -> Result<SocketAddr, ClientError> {
        self.socket
            .send_to(&DiscoveryDatagram::RequestGame.encode(), self.target)
            .await?;
        debug!("Discovery request sent");

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; DATAGRAM_SIZE * 4];
        loop {
            let (len, from) =
                match tokio::time::timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                    Ok(received) => received?,
                    Err(_) => {
                        warn!(timeout_ms = self.timeout.as_millis(), "No server answered");
                        return Err(ClientError::NoServerAvailable {
                            waited_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                        });
                    }
                };

            match DiscoveryDatagram::decode(&buf[..len]) {
                Ok(DiscoveryDatagram::GameAvailable { port }) => {
                    let server = SocketAddr::new(from.ip(), port);
                    info!(%server, "Server offered a game");
                    return Ok(server);
                }
                Ok(DiscoveryDatagram::RequestGame) => {
                    debug!(%from, "Ignoring another client's request");
                }
                Err(e) => warn!(%from, error = %e, "Ignoring malformed discovery reply"),
            }
        }
    }
}
