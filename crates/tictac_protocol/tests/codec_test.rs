//! Encoding, decoding and framing tests for both message families.

use strum::IntoEnumIterator;
use tictac_engine::{Board, Mark, Position, Square};
use tictac_protocol::{
    BoardSnapshot, DecodeError, DiscoveryCommand, DiscoveryDatagram, FrameError, PROTOCOL_VERSION,
    SessionCommand, SessionMessage, SlotNumber, read_frame, read_message, write_message,
    write_resume,
};

fn sample_messages() -> Vec<SessionMessage> {
    vec![
        SessionMessage::new_game(),
        SessionMessage::move_to(Position::TopLeft, SlotNumber::new(1)),
        SessionMessage::move_to(Position::BottomRight, SlotNumber::new(10)),
        SessionMessage::game_over(SlotNumber::new(7)),
        SessionMessage::resume_game(),
    ]
}

#[test]
fn test_session_message_survives_encoding() {
    for msg in sample_messages() {
        assert_eq!(SessionMessage::decode(&msg.encode()), Ok(msg));
    }
}

#[test]
fn test_corrupted_session_version_is_rejected() {
    for msg in sample_messages() {
        for bad in [0, PROTOCOL_VERSION - 1, PROTOCOL_VERSION + 1, 0xff] {
            let mut bytes = msg.encode();
            bytes[0] = bad;
            assert_eq!(
                SessionMessage::decode(&bytes),
                Err(DecodeError::UnsupportedVersion {
                    found: bad,
                    expected: PROTOCOL_VERSION
                })
            );
        }
    }
}

#[test]
fn test_corrupted_session_command_is_rejected() {
    let valid: Vec<u8> = SessionCommand::iter().map(SessionCommand::code).collect();
    for msg in sample_messages() {
        for bad in (0..=u8::MAX).filter(|c| !valid.contains(c)) {
            let mut bytes = msg.encode();
            bytes[1] = bad;
            assert_eq!(
                SessionMessage::decode(&bytes),
                Err(DecodeError::UnknownCommand(bad))
            );
        }
    }
}

#[test]
fn test_datagram_survives_encoding() {
    for datagram in [
        DiscoveryDatagram::RequestGame,
        DiscoveryDatagram::GameAvailable { port: 1 },
        DiscoveryDatagram::GameAvailable { port: 8080 },
        DiscoveryDatagram::GameAvailable { port: u16::MAX },
    ] {
        assert_eq!(DiscoveryDatagram::decode(&datagram.encode()), Ok(datagram));
    }
}

#[test]
fn test_corrupted_datagram_is_rejected() {
    let valid: Vec<u8> = DiscoveryCommand::iter().map(DiscoveryCommand::code).collect();
    let good = DiscoveryDatagram::GameAvailable { port: 4000 }.encode();

    let mut bytes = good;
    bytes[0] = PROTOCOL_VERSION + 1;
    assert!(matches!(
        DiscoveryDatagram::decode(&bytes),
        Err(DecodeError::UnsupportedVersion { .. })
    ));

    for bad in (0..=u8::MAX).filter(|c| !valid.contains(c)) {
        let mut bytes = good;
        bytes[1] = bad;
        assert_eq!(
            DiscoveryDatagram::decode(&bytes),
            Err(DecodeError::UnknownCommand(bad))
        );
    }

    assert!(matches!(
        DiscoveryDatagram::decode(&good[..3]),
        Err(DecodeError::WrongLength { found: 3, .. })
    ));
}

#[test]
fn test_snapshot_reproduces_board() {
    let mut board = Board::new();
    board.set(Position::TopLeft, Square::Occupied(Mark::X));
    board.set(Position::Center, Square::Occupied(Mark::O));
    board.set(Position::TopRight, Square::Occupied(Mark::X));

    let snapshot = BoardSnapshot::from_board(&board);
    let decoded = BoardSnapshot::decode(snapshot.as_bytes()).unwrap();
    assert_eq!(decoded.to_board(), Ok(board));
}

#[test]
fn test_snapshot_accepts_one_mark_difference_either_way() {
    let x_ahead = BoardSnapshot::from_bytes([b'X', b'O', b'X', 0, 0, 0, 0, 0, 0]);
    let o_ahead = BoardSnapshot::from_bytes([b'O', 0, 0, 0, 0, 0, 0, 0, 0]);
    assert!(x_ahead.to_board().is_ok());
    assert!(o_ahead.to_board().is_ok());
}

#[test]
fn test_snapshot_rejects_mismatched_counts() {
    let snapshot = BoardSnapshot::from_bytes([b'O', b'O', b'X', b'O', b'O', 0, 0, 0, 0]);
    assert_eq!(
        snapshot.to_board(),
        Err(DecodeError::UnbalancedSnapshot { x: 1, o: 4 })
    );
}

#[tokio::test]
async fn test_frames_over_a_stream() {
    let (mut client, mut server) = tokio::io::duplex(64);

    let mut board = Board::new();
    board.set(Position::Center, Square::Occupied(Mark::X));
    let snapshot = BoardSnapshot::from_board(&board);

    write_message(&mut client, &SessionMessage::new_game())
        .await
        .unwrap();
    write_resume(&mut client, &snapshot).await.unwrap();

    let first = read_frame(&mut server).await.unwrap();
    assert_eq!(first.message.command(), SessionCommand::NewGame);
    assert_eq!(first.snapshot, None);

    let second = read_frame(&mut server).await.unwrap();
    assert_eq!(second.message.command(), SessionCommand::ResumeGame);
    assert_eq!(second.snapshot, Some(snapshot));
}

#[tokio::test]
async fn test_closed_stream_reads_as_disconnect() {
    let (client, mut server) = tokio::io::duplex(64);
    drop(client);
    assert!(matches!(
        read_message(&mut server).await,
        Err(FrameError::Disconnected)
    ));
}

#[tokio::test]
async fn test_partial_message_then_close_is_disconnect() {
    use tokio::io::AsyncWriteExt;

    let (mut client, mut server) = tokio::io::duplex(64);
    client.write_all(&[PROTOCOL_VERSION, 1]).await.unwrap();
    drop(client);
    let err = read_message(&mut server).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_bad_version_on_stream_is_decode_error() {
    use tokio::io::AsyncWriteExt;

    let (mut client, mut server) = tokio::io::duplex(64);
    client.write_all(&[PROTOCOL_VERSION + 1, 0, 0, 0]).await.unwrap();
    let err = read_message(&mut server).await.unwrap_err();
    assert!(matches!(err, FrameError::Decode(_)));
    assert!(!err.is_transport());
}
