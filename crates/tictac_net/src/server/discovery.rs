//! Server side of the discovery exchange.

use tictac_protocol::DiscoveryDatagram;
use tracing::{debug, warn};

/// Decides the reply to a discovery datagram.
///
/// A RequestGame gets a GameAvailable carrying `port` when a slot is free
/// and no reply otherwise. A GameAvailable sent to a server is logged and
/// dropped.
pub fn respond(
    datagram: DiscoveryDatagram,
    has_free_slot: bool,
    port: u16,
) -> Option<DiscoveryDatagram> {
    match datagram {
        DiscoveryDatagram::RequestGame if has_free_slot => {
            Some(DiscoveryDatagram::GameAvailable { port })
        }
        DiscoveryDatagram::RequestGame => {
            debug!("Roster full; not answering discovery request");
            None
        }
        DiscoveryDatagram::GameAvailable { port: other } => {
            warn!(port = other, "Server received GameAvailable; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_with_port_when_free() {
        assert_eq!(
            respond(DiscoveryDatagram::RequestGame, true, 4321),
            Some(DiscoveryDatagram::GameAvailable { port: 4321 })
        );
    }

    #[test]
    fn test_silent_when_full() {
        assert_eq!(respond(DiscoveryDatagram::RequestGame, false, 4321), None);
    }

    #[test]
    fn test_never_answers_other_servers() {
        let offer = DiscoveryDatagram::GameAvailable { port: 9 };
        assert_eq!(respond(offer, true, 4321), None);
    }
}
