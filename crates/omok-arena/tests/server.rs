//! End-to-end tests: real WebSocket clients against a running server,
//! covering the lobby flow, the one-vs-many game loop, and teardown.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use omok_arena::ServerBuilder;
use omok_protocol::{
    ClientCommand, MatchPhase, Outcome, PlayerId, Position, Role, RoomId,
    RoomStatus, RoomSummary, ServerEvent, Stone,
};
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random port and returns its address.
async fn start_server() -> String {
    let server = ServerBuilder::new()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, command: &ClientCommand) {
    let json = serde_json::to_string(command).expect("encode command");
    ws.send(Message::text(json)).await.expect("send command");
}

/// Receives the next event, raw (lobby pushes included).
async fn recv(ws: &mut ClientWs) -> ServerEvent {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for an event")
        .expect("stream ended")
        .expect("recv failed");
    match msg {
        Message::Text(text) => {
            serde_json::from_str(text.as_str()).expect("decode event")
        }
        other => panic!("expected text frame, got {other:?}"),
    }
}

/// Receives the next event that is not a lobby listing push.
async fn recv_game(ws: &mut ClientWs) -> ServerEvent {
    loop {
        match recv(ws).await {
            ServerEvent::RoomList { .. } => continue,
            event => return event,
        }
    }
}

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

/// Connects a host and creates a room, draining the create events.
async fn setup_room(addr: &str) -> (ClientWs, RoomSummary) {
    let mut host = connect(addr).await;
    send(
        &mut host,
        &ClientCommand::CreateRoom {
            room_name: "arena".into(),
            player_name: "dana".into(),
        },
    )
    .await;
    let room = match recv_game(&mut host).await {
        ServerEvent::RoomCreated { room } => room,
        other => panic!("expected RoomCreated, got {other:?}"),
    };
    (host, room)
}

/// Connects a challenger and joins the room; drains the join events on
/// both sides. Returns the challenger socket and its assigned identity.
async fn join(
    addr: &str,
    host: &mut ClientWs,
    room_id: &RoomId,
    name: &str,
) -> (ClientWs, PlayerId) {
    let mut challenger = connect(addr).await;
    send(
        &mut challenger,
        &ClientCommand::JoinRoom {
            room_id: room_id.clone(),
            player_name: name.into(),
        },
    )
    .await;
    let player = match recv_game(&mut challenger).await {
        ServerEvent::RoomJoined { player, .. } => player,
        other => panic!("expected RoomJoined, got {other:?}"),
    };
    match recv_game(host).await {
        ServerEvent::PlayerJoined { player: joined } => {
            assert_eq!(joined.id, player.id);
        }
        other => panic!("expected PlayerJoined, got {other:?}"),
    }
    (challenger, player.id)
}

/// Host + one challenger with the game started and start events drained.
async fn setup_started_pair(
    addr: &str,
) -> (ClientWs, ClientWs, PlayerId) {
    let (mut host, room) = setup_room(addr).await;
    let (mut challenger, challenger_id) =
        join(addr, &mut host, &room.id, "kim").await;

    send(&mut host, &ClientCommand::StartGame).await;
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameStarted
    ));
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameState { .. }
    ));
    assert!(matches!(
        recv_game(&mut challenger).await,
        ServerEvent::GameStarted
    ));
    assert!(matches!(
        recv_game(&mut challenger).await,
        ServerEvent::GameState { .. }
    ));

    (host, challenger, challenger_id)
}

/// One full exchange: host places, challenger replies, both streams
/// drained (including the host's AllChallengersResponded).
async fn exchange(
    host: &mut ClientWs,
    challenger: &mut ClientWs,
    host_at: Position,
    reply_at: Position,
) {
    send(host, &ClientCommand::PlaceStone { position: host_at }).await;
    assert!(matches!(
        recv_game(host).await,
        ServerEvent::HostMoved { .. }
    ));
    assert!(matches!(
        recv_game(host).await,
        ServerEvent::GameState { .. }
    ));
    assert!(matches!(
        recv_game(challenger).await,
        ServerEvent::HostMoved { .. }
    ));
    assert!(matches!(
        recv_game(challenger).await,
        ServerEvent::GameState { .. }
    ));

    send(
        challenger,
        &ClientCommand::PlaceStone { position: reply_at },
    )
    .await;
    assert!(matches!(
        recv_game(challenger).await,
        ServerEvent::GameState { .. }
    ));
    assert!(matches!(
        recv_game(host).await,
        ServerEvent::GameState { .. }
    ));
    assert!(matches!(
        recv_game(host).await,
        ServerEvent::ChallengerMoved { .. }
    ));
    assert!(matches!(
        recv_game(host).await,
        ServerEvent::AllChallengersResponded
    ));
}

// =========================================================================
// Lobby flow
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_summary_and_pushes_lobby() {
    let addr = start_server().await;
    let mut host = connect(&addr).await;

    send(
        &mut host,
        &ClientCommand::CreateRoom {
            room_name: "friday".into(),
            player_name: "dana".into(),
        },
    )
    .await;

    let room = match recv(&mut host).await {
        ServerEvent::RoomCreated { room } => room,
        other => panic!("expected RoomCreated, got {other:?}"),
    };
    assert_eq!(room.name, "friday");
    assert_eq!(room.host_name, "dana");
    assert_eq!(room.challenger_count, 0);
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.id.as_str().len(), 6);

    // The lobby push follows, listing the new room.
    match recv(&mut host).await {
        ServerEvent::RoomList { rooms } => {
            assert_eq!(rooms.len(), 1);
            assert_eq!(rooms[0].id, room.id);
        }
        other => panic!("expected RoomList, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_rooms_on_request() {
    let addr = start_server().await;
    let (_host, room) = setup_room(&addr).await;

    let mut visitor = connect(&addr).await;
    send(&mut visitor, &ClientCommand::ListRooms).await;

    match recv(&mut visitor).await {
        ServerEvent::RoomList { rooms } => {
            assert_eq!(rooms.len(), 1);
            assert_eq!(rooms[0].id, room.id);
        }
        other => panic!("expected RoomList, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_room_flow() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;

    let mut challenger = connect(&addr).await;
    send(
        &mut challenger,
        &ClientCommand::JoinRoom {
            room_id: room.id.clone(),
            player_name: "kim".into(),
        },
    )
    .await;

    match recv_game(&mut challenger).await {
        ServerEvent::RoomJoined { room, player } => {
            assert_eq!(player.name, "kim");
            assert_eq!(player.role, Role::Challenger);
            assert_eq!(room.challenger_count, 1);
        }
        other => panic!("expected RoomJoined, got {other:?}"),
    }

    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::PlayerJoined { .. }
    ));
}

#[tokio::test]
async fn test_join_unknown_room_errors() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;

    send(
        &mut client,
        &ClientCommand::JoinRoom {
            room_id: RoomId::from("NOSUCH"),
            player_name: "kim".into(),
        },
    )
    .await;

    match recv(&mut client).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not found"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_joining_twice_errors() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (mut challenger, _) = join(&addr, &mut host, &room.id, "kim").await;

    send(
        &mut challenger,
        &ClientCommand::JoinRoom {
            room_id: room.id.clone(),
            player_name: "kim".into(),
        },
    )
    .await;

    match recv_game(&mut challenger).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("already in room"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_after_start_errors() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (_challenger, _) = join(&addr, &mut host, &room.id, "kim").await;

    send(&mut host, &ClientCommand::StartGame).await;
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameStarted
    ));
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameState { .. }
    ));

    // A started room has left the lobby and rejects late joiners.
    let mut late = connect(&addr).await;
    send(
        &mut late,
        &ClientCommand::JoinRoom {
            room_id: room.id.clone(),
            player_name: "late".into(),
        },
    )
    .await;
    match recv(&mut late).await {
        ServerEvent::Error { message } => {
            assert!(
                message.contains("not accepting"),
                "got: {message}"
            );
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

// =========================================================================
// Starting the game
// =========================================================================

#[tokio::test]
async fn test_start_game_requires_host() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (mut challenger, _) = join(&addr, &mut host, &room.id, "kim").await;

    send(&mut challenger, &ClientCommand::StartGame).await;

    match recv_game(&mut challenger).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("host"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_without_challengers_errors() {
    let addr = start_server().await;
    let (mut host, _room) = setup_room(&addr).await;

    send(&mut host, &ClientCommand::StartGame).await;

    match recv_game(&mut host).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("challengers"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_game_start_sends_fresh_boards() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (mut challenger, challenger_id) =
        join(&addr, &mut host, &room.id, "kim").await;

    send(&mut host, &ClientCommand::StartGame).await;

    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameStarted
    ));
    match recv_game(&mut host).await {
        ServerEvent::GameState { state } => {
            assert_eq!(state.challenger_id, challenger_id);
            assert_eq!(state.phase, MatchPhase::HostToMove);
            assert!(state.last_move.is_none());
        }
        other => panic!("expected GameState, got {other:?}"),
    }

    assert!(matches!(
        recv_game(&mut challenger).await,
        ServerEvent::GameStarted
    ));
    match recv_game(&mut challenger).await {
        ServerEvent::GameState { state } => {
            assert_eq!(state.challenger_id, challenger_id);
            assert_eq!(state.phase, MatchPhase::HostToMove);
        }
        other => panic!("expected GameState, got {other:?}"),
    }
}

// =========================================================================
// The full game: host five-in-a-row on row 7
// =========================================================================

#[tokio::test]
async fn test_full_game_host_wins() {
    let addr = start_server().await;
    let (mut host, mut challenger, _challenger_id) =
        setup_started_pair(&addr).await;

    // Host marches (7,3)..(7,6); the challenger shadows (8,3)..(8,6).
    for col in 3..=6 {
        exchange(&mut host, &mut challenger, pos(7, col), pos(8, col))
            .await;
    }

    // The fifth host stone completes the row.
    send(
        &mut host,
        &ClientCommand::PlaceStone {
            position: pos(7, 7),
        },
    )
    .await;

    match recv_game(&mut host).await {
        ServerEvent::HostMoved { position } => {
            assert_eq!(position, pos(7, 7));
        }
        other => panic!("expected HostMoved, got {other:?}"),
    }
    match recv_game(&mut host).await {
        ServerEvent::GameState { state } => {
            assert_eq!(
                state.phase,
                MatchPhase::Finished {
                    outcome: Outcome::HostWin
                }
            );
        }
        other => panic!("expected GameState, got {other:?}"),
    }
    match recv_game(&mut host).await {
        ServerEvent::GameOver { state } => {
            assert_eq!(
                state.phase,
                MatchPhase::Finished {
                    outcome: Outcome::HostWin
                }
            );
            assert_eq!(state.last_move, Some(pos(7, 7)));
        }
        other => panic!("expected GameOver, got {other:?}"),
    }

    assert!(matches!(
        recv_game(&mut challenger).await,
        ServerEvent::HostMoved { .. }
    ));
    assert!(matches!(
        recv_game(&mut challenger).await,
        ServerEvent::GameState { .. }
    ));
    assert!(matches!(
        recv_game(&mut challenger).await,
        ServerEvent::GameOver { .. }
    ));

    // The match is decided; nothing further is accepted.
    send(
        &mut challenger,
        &ClientCommand::PlaceStone {
            position: pos(0, 0),
        },
    )
    .await;
    match recv_game(&mut challenger).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not in progress"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

// =========================================================================
// Board independence across challengers
// =========================================================================

#[tokio::test]
async fn test_two_challengers_have_independent_boards() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (mut c1, c1_id) = join(&addr, &mut host, &room.id, "kim").await;
    let (mut c2, c2_id) = join(&addr, &mut host, &room.id, "lee").await;
    // c1 also hears about c2 joining.
    assert!(matches!(
        recv_game(&mut c1).await,
        ServerEvent::PlayerJoined { .. }
    ));

    send(&mut host, &ClientCommand::StartGame).await;
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameStarted
    ));
    for _ in 0..2 {
        assert!(matches!(
            recv_game(&mut host).await,
            ServerEvent::GameState { .. }
        ));
    }
    for ws in [&mut c1, &mut c2] {
        assert!(matches!(recv_game(ws).await, ServerEvent::GameStarted));
        assert!(matches!(
            recv_game(ws).await,
            ServerEvent::GameState { .. }
        ));
    }

    // One host move lands on both boards.
    send(
        &mut host,
        &ClientCommand::PlaceStone {
            position: pos(7, 7),
        },
    )
    .await;
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::HostMoved { .. }
    ));
    for _ in 0..2 {
        match recv_game(&mut host).await {
            ServerEvent::GameState { state } => {
                assert_eq!(
                    state.board.stone_at(pos(7, 7)),
                    Some(Stone::Black)
                );
            }
            other => panic!("expected GameState, got {other:?}"),
        }
    }
    for ws in [&mut c1, &mut c2] {
        assert!(matches!(
            recv_game(ws).await,
            ServerEvent::HostMoved { .. }
        ));
        assert!(matches!(
            recv_game(ws).await,
            ServerEvent::GameState { .. }
        ));
    }

    // c1 replies at (0,0); only c1's board takes it.
    send(
        &mut c1,
        &ClientCommand::PlaceStone {
            position: pos(0, 0),
        },
    )
    .await;
    match recv_game(&mut c1).await {
        ServerEvent::GameState { state } => {
            assert_eq!(state.challenger_id, c1_id);
            assert_eq!(state.board.stone_at(pos(0, 0)), Some(Stone::White));
        }
        other => panic!("expected GameState, got {other:?}"),
    }
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameState { .. }
    ));
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::ChallengerMoved { .. }
    ));

    // c2 replies at (1,1): its board has no stone at (0,0).
    send(
        &mut c2,
        &ClientCommand::PlaceStone {
            position: pos(1, 1),
        },
    )
    .await;
    match recv_game(&mut c2).await {
        ServerEvent::GameState { state } => {
            assert_eq!(state.challenger_id, c2_id);
            assert_eq!(state.board.stone_at(pos(1, 1)), Some(Stone::White));
            assert_eq!(state.board.stone_at(pos(0, 0)), None);
        }
        other => panic!("expected GameState, got {other:?}"),
    }
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::GameState { .. }
    ));
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::ChallengerMoved { .. }
    ));
    // Both pending replies are now in.
    assert!(matches!(
        recv_game(&mut host).await,
        ServerEvent::AllChallengersResponded
    ));
}

// =========================================================================
// Leaving and teardown
// =========================================================================

#[tokio::test]
async fn test_host_leave_evicts_challengers() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (mut challenger, _) = join(&addr, &mut host, &room.id, "kim").await;

    send(&mut host, &ClientCommand::LeaveRoom).await;

    match recv_game(&mut challenger).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("host left"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }

    // The room is gone from the lobby...
    send(&mut challenger, &ClientCommand::ListRooms).await;
    match recv(&mut challenger).await {
        ServerEvent::RoomList { rooms } => assert!(rooms.is_empty()),
        other => panic!("expected RoomList, got {other:?}"),
    }

    // ...and the challenger's membership was cleared: they can host now.
    send(
        &mut challenger,
        &ClientCommand::CreateRoom {
            room_name: "rematch".into(),
            player_name: "kim".into(),
        },
    )
    .await;
    assert!(matches!(
        recv_game(&mut challenger).await,
        ServerEvent::RoomCreated { .. }
    ));
}

#[tokio::test]
async fn test_challenger_leave_notifies_host() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (mut challenger, challenger_id) =
        join(&addr, &mut host, &room.id, "kim").await;

    send(&mut challenger, &ClientCommand::LeaveRoom).await;

    match recv_game(&mut host).await {
        ServerEvent::PlayerLeft { player_id } => {
            assert_eq!(player_id, challenger_id);
        }
        other => panic!("expected PlayerLeft, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_acts_as_leave() {
    let addr = start_server().await;
    let (mut host, room) = setup_room(&addr).await;
    let (mut challenger, challenger_id) =
        join(&addr, &mut host, &room.id, "kim").await;

    challenger.close(None).await.expect("close");

    match recv_game(&mut host).await {
        ServerEvent::PlayerLeft { player_id } => {
            assert_eq!(player_id, challenger_id);
        }
        other => panic!("expected PlayerLeft, got {other:?}"),
    }
}

// =========================================================================
// Rejected commands
// =========================================================================

#[tokio::test]
async fn test_place_before_start_rejected() {
    let addr = start_server().await;
    let (mut host, _room) = setup_room(&addr).await;

    send(
        &mut host,
        &ClientCommand::PlaceStone {
            position: pos(7, 7),
        },
    )
    .await;

    match recv_game(&mut host).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not in progress"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_place_while_in_no_room_rejected() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;

    send(
        &mut client,
        &ClientCommand::PlaceStone {
            position: pos(7, 7),
        },
    )
    .await;

    match recv(&mut client).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not in any room"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_out_of_turn_move_rejected() {
    let addr = start_server().await;
    let (_host, mut challenger, _) = setup_started_pair(&addr).await;

    // The host has not moved yet; the challenger owes nothing.
    send(
        &mut challenger,
        &ClientCommand::PlaceStone {
            position: pos(0, 0),
        },
    )
    .await;

    match recv_game(&mut challenger).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("invalid move"), "got: {message}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_frame_is_skipped() {
    let addr = start_server().await;
    let mut client = connect(&addr).await;

    // Garbage, then a valid command; the connection must survive.
    client
        .send(Message::text("not json at all"))
        .await
        .expect("send garbage");
    send(&mut client, &ClientCommand::ListRooms).await;

    assert!(matches!(
        recv(&mut client).await,
        ServerEvent::RoomList { .. }
    ));
}
