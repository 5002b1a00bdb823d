//! Single-task readiness loop.
//!
//! One future waits on the listener, the discovery socket and every bound
//! slot's stream at once. Whichever is ready first is handled to
//! completion before the next wait, so slot state is only ever touched by
//! this task and needs no locking.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tictac_protocol::{DiscoveryDatagram, SessionMessage, SlotNumber, write_message};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{debug, info, instrument, warn};

use super::discovery;
use super::roster::Roster;
use super::session::{Directive, ReleaseReason, Violation};
use crate::config::NetConfig;
use crate::error::ServerError;

const READ_CHUNK: usize = 64;
/// Pause after a failed accept. Errors such as EMFILE persist, and the
/// listener stays ready while they do.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// What woke the reactor.
enum Readiness {
    Discovery(io::Result<()>),
    Accept(io::Result<(TcpStream, SocketAddr)>),
    Slot(SlotNumber, io::Result<()>),
}

/// The game server: endpoints plus the roster they feed.
#[derive(Debug)]
pub struct GameServer {
    listener: TcpListener,
    discovery: UdpSocket,
    port: u16,
    roster: Roster<TcpStream>,
}

impl GameServer {
    /// Binds the session listener on `port` and joins the discovery group.
    #[instrument(skip(config), fields(group = %config.multicast_group()))]
    pub async fn bind(port: u16, config: &NetConfig) -> Result<Self, ServerError> {
        let session_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
        let listener = TcpListener::bind(session_addr)
            .await
            .map_err(|source| ServerError::Bind {
                endpoint: "session",
                addr: session_addr,
                source,
            })?;

        let discovery_addr = SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::UNSPECIFIED,
            *config.multicast_port(),
        ));
        let discovery = UdpSocket::bind(discovery_addr)
            .await
            .map_err(|source| ServerError::Bind {
                endpoint: "discovery",
                addr: discovery_addr,
                source,
            })?;
        discovery
            .join_multicast_v4(*config.multicast_group(), *config.multicast_interface())
            .map_err(|source| ServerError::JoinGroup {
                group: *config.multicast_group(),
                source,
            })?;

        info!(port, discovery = %discovery_addr, "Server endpoints ready");
        Self::from_parts(listener, discovery, *config.max_sessions())
    }

    /// Builds a server from endpoints that are already bound.
    pub fn from_parts(
        listener: TcpListener,
        discovery: UdpSocket,
        capacity: u8,
    ) -> Result<Self, ServerError> {
        let addr = listener.local_addr().map_err(|source| ServerError::Bind {
            endpoint: "session",
            addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)),
            source,
        })?;
        Ok(Self {
            listener,
            discovery,
            port: addr.port(),
            roster: Roster::new(capacity),
        })
    }

    /// Address the session listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Address the discovery socket is bound to.
    pub fn discovery_addr(&self) -> io::Result<SocketAddr> {
        self.discovery.local_addr()
    }

    /// Number of slots with a bound connection.
    pub fn bound_sessions(&self) -> usize {
        self.roster.bound()
    }

    /// Roster size.
    pub fn capacity(&self) -> usize {
        self.roster.capacity()
    }

    /// Serves forever.
    pub async fn run(&mut self) {
        info!(
            port = self.port,
            capacity = self.capacity(),
            "Serving games"
        );
        loop {
            self.turn().await;
        }
    }

    /// Waits for one readiness event and handles it.
    pub async fn turn(&mut self) {
        match self.wait_ready().await {
            Readiness::Discovery(Ok(())) => self.on_discovery().await,
            Readiness::Accept(Ok((stream, peer))) => self.on_accept(stream, peer),
            Readiness::Slot(slot, Ok(())) => self.on_slot_readable(slot).await,
            Readiness::Discovery(Err(e)) => warn!(error = %e, "Discovery socket wait failed"),
            Readiness::Accept(Err(e)) => Self::accept_failed(&e).await,
            Readiness::Slot(slot, Err(e)) => {
                warn!(%slot, error = %e, "Session wait failed");
                self.release(slot, ReleaseReason::TransportFailure);
            }
        }
    }

    async fn wait_ready(&self) -> Readiness {
        let mut slots: FuturesUnordered<_> = self
            .roster
            .bound_handles()
            .map(|(slot, stream)| async move { (slot, stream.readable().await) })
            .collect();

        tokio::select! {
            ready = self.discovery.readable() => Readiness::Discovery(ready),
            accepted = self.listener.accept() => Readiness::Accept(accepted),
            Some((slot, ready)) = slots.next(), if !slots.is_empty() => Readiness::Slot(slot, ready),
        }
    }

    #[instrument(skip(self))]
    async fn on_discovery(&mut self) {
        let mut buf = [0u8; READ_CHUNK];
        let (len, peer) = match self.discovery.try_recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                warn!(error = %e, "Discovery receive failed");
                return;
            }
        };

        let datagram = match DiscoveryDatagram::decode(&buf[..len]) {
            Ok(datagram) => datagram,
            Err(e) => {
                warn!(%peer, error = %e, "Ignoring malformed discovery datagram");
                return;
            }
        };
        debug!(%peer, %datagram, "Discovery datagram");

        if let Some(reply) = discovery::respond(datagram, self.roster.has_free_slot(), self.port) {
            match self.discovery.send_to(&reply.encode(), peer).await {
                Ok(_) => info!(%peer, port = self.port, "Offered a game"),
                Err(e) => warn!(%peer, error = %e, "Discovery reply failed"),
            }
        }
    }

    async fn accept_failed(error: &io::Error) {
        warn!(%error, backoff_ms = ACCEPT_BACKOFF.as_millis() as u64, "Accept failed");
        tokio::time::sleep(ACCEPT_BACKOFF).await;
    }

    fn on_accept(&mut self, stream: TcpStream, peer: SocketAddr) {
        match self.roster.bind(stream) {
            Ok(slot) => info!(%peer, %slot, "Connection bound to slot"),
            Err(stream) => {
                info!(%peer, "Roster full; closing connection");
                drop(stream);
            }
        }
    }

    #[instrument(skip(self))]
    async fn on_slot_readable(&mut self, slot: SlotNumber) {
        let mut buf = [0u8; READ_CHUNK];
        let Some(entry) = self.roster.get_mut(slot) else {
            return;
        };
        let Some(stream) = entry.handle() else {
            return;
        };

        match stream.try_read(&mut buf) {
            Ok(0) => {
                self.release(slot, ReleaseReason::TransportFailure);
                return;
            }
            Ok(n) => entry.frames_mut().extend(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                warn!(error = %e, "Session receive failed");
                self.release(slot, ReleaseReason::TransportFailure);
                return;
            }
        }

        self.dispatch_frames(slot).await;
    }

    /// Runs every complete buffered frame through the slot's game.
    async fn dispatch_frames(&mut self, slot: SlotNumber) {
        loop {
            let Some(entry) = self.roster.get_mut(slot) else {
                return;
            };
            let frame = match entry.frames_mut().next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => return,
                Err(e) => {
                    self.release(slot, ReleaseReason::ProtocolViolation(Violation::Malformed(e)));
                    return;
                }
            };

            match entry.game_mut().handle(slot, frame) {
                Directive::Send(reply) => {
                    if !self.send(slot, &reply).await {
                        self.release(slot, ReleaseReason::TransportFailure);
                        return;
                    }
                }
                Directive::Finish(reply, reason) => {
                    self.send(slot, &reply).await;
                    self.release(slot, reason);
                    return;
                }
                Directive::Release(reason) => {
                    self.release(slot, reason);
                    return;
                }
            }
        }
    }

    async fn send(&mut self, slot: SlotNumber, message: &SessionMessage) -> bool {
        let Some(stream) = self.roster.get_mut(slot).and_then(|s| s.handle_mut()) else {
            return false;
        };
        match write_message(stream, message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%slot, error = %e, "Session send failed");
                false
            }
        }
    }

    fn release(&mut self, slot: SlotNumber, reason: ReleaseReason) {
        match reason {
            ReleaseReason::ProtocolViolation(_) | ReleaseReason::TransportFailure => {
                warn!(%slot, %reason, "Releasing slot")
            }
            ReleaseReason::GameFinished(_) | ReleaseReason::PeerLeft => {
                info!(%slot, %reason, "Releasing slot")
            }
        }
        drop(self.roster.release(slot));
    }
}
