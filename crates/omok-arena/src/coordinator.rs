//! The coordinator: one task that owns all mutable game state.
//!
//! Every command from every connection funnels through a single queue
//! and is handled to completion before the next one is looked at. That
//! serialization is the whole concurrency story: room and directory
//! mutation is atomic with respect to other commands without a single
//! lock, and the effects of an earlier command are always broadcast
//! before a later command is processed.
//!
//! The coordinator is also where fan-out is decided: the host receives
//! every board's state, each challenger only their own, and lobby
//! listings go to every connected client whenever they change.

use omok_gateway::Gateway;
use omok_protocol::{
    ClientCommand, Participant, PlayerId, Position, RoomId, RoomStatus,
    ServerEvent,
};
use omok_room::{Departure, RoomDirectory, RoomError};
use tokio::sync::{mpsc, oneshot};

/// Messages sent to the coordinator through its queue.
pub(crate) enum CoordinatorMessage {
    /// A new connection wants an identity and an outbound event stream.
    Connect {
        reply: oneshot::Sender<(
            PlayerId,
            mpsc::UnboundedReceiver<ServerEvent>,
        )>,
    },

    /// A decoded command from a connected player.
    Command {
        player: PlayerId,
        command: ClientCommand,
    },

    /// The player's connection ended. Treated as leaving their room,
    /// then the peer is forgotten.
    Disconnected { player: PlayerId },
}

pub(crate) struct Coordinator {
    directory: RoomDirectory,
    gateway: Gateway,
    receiver: mpsc::UnboundedReceiver<CoordinatorMessage>,
}

impl Coordinator {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<CoordinatorMessage>,
    ) -> Self {
        Self {
            directory: RoomDirectory::new(),
            gateway: Gateway::new(),
            receiver,
        }
    }

    /// Runs the command loop until every queue sender is gone.
    pub(crate) async fn run(mut self) {
        tracing::info!("coordinator started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CoordinatorMessage::Connect { reply } => {
                    let _ = reply.send(self.gateway.register());
                }
                CoordinatorMessage::Command { player, command } => {
                    self.handle_command(player, command);
                }
                CoordinatorMessage::Disconnected { player } => {
                    self.handle_leave(player);
                    self.gateway.unregister(player);
                }
            }
        }

        tracing::info!("coordinator stopped");
    }

    fn handle_command(&mut self, player: PlayerId, command: ClientCommand) {
        match command {
            ClientCommand::CreateRoom {
                room_name,
                player_name,
            } => self.handle_create(player, room_name, player_name),
            ClientCommand::JoinRoom {
                room_id,
                player_name,
            } => self.handle_join(player, room_id, player_name),
            ClientCommand::LeaveRoom => self.handle_leave(player),
            ClientCommand::StartGame => self.handle_start(player),
            ClientCommand::PlaceStone { position } => {
                self.handle_place(player, position);
            }
            ClientCommand::ListRooms => {
                self.gateway.send(
                    player,
                    ServerEvent::RoomList {
                        rooms: self.directory.waiting_rooms(),
                    },
                );
            }
        }
    }

    /// Surfaces a rejected command to its originator. No state changed.
    fn reject(&self, player: PlayerId, error: &RoomError) {
        tracing::debug!(%player, %error, "command rejected");
        self.gateway.send(
            player,
            ServerEvent::Error {
                message: error.to_string(),
            },
        );
    }

    /// Pushes the current lobby listing to every connected client.
    fn push_room_list(&self) {
        self.gateway.broadcast_all(&ServerEvent::RoomList {
            rooms: self.directory.waiting_rooms(),
        });
    }

    fn handle_create(
        &mut self,
        player: PlayerId,
        room_name: String,
        player_name: String,
    ) {
        let host = Participant::host(player, player_name);
        match self.directory.create_room(&room_name, host) {
            Ok(room) => {
                let room_id = room.id().clone();
                let summary = room.to_summary();
                self.gateway.join_group(&room_id, player);
                self.gateway
                    .send(player, ServerEvent::RoomCreated { room: summary });
                self.push_room_list();
            }
            Err(error) => self.reject(player, &error),
        }
    }

    fn handle_join(
        &mut self,
        player: PlayerId,
        room_id: RoomId,
        player_name: String,
    ) {
        let participant = Participant::challenger(player, player_name);
        match self.directory.join_room(&room_id, participant.clone()) {
            Ok(room) => {
                let summary = room.to_summary();
                // Announce to the members present before the join, then
                // add the joiner to the group.
                self.gateway.broadcast_group(
                    &room_id,
                    &ServerEvent::PlayerJoined {
                        player: participant.clone(),
                    },
                );
                self.gateway.join_group(&room_id, player);
                self.gateway.send(
                    player,
                    ServerEvent::RoomJoined {
                        room: summary,
                        player: participant,
                    },
                );
                self.push_room_list();
            }
            Err(error) => self.reject(player, &error),
        }
    }

    /// Leaving while in no room is a quiet no-op (disconnects funnel
    /// through here too).
    fn handle_leave(&mut self, player: PlayerId) {
        match self.directory.leave_room(player) {
            Some(Departure::Host(room)) => {
                let room_id = room.id();
                // Room teardown is a designed consequence, not a fault:
                // the remaining members get told why, then evicted.
                self.gateway.leave_group(room_id, player);
                self.gateway.broadcast_group(
                    room_id,
                    &ServerEvent::Error {
                        message: "the host left the room".into(),
                    },
                );
                self.gateway.drop_group(room_id);
                self.push_room_list();
            }
            Some(Departure::Challenger(room_id)) => {
                self.gateway.leave_group(&room_id, player);
                self.gateway.broadcast_group(
                    &room_id,
                    &ServerEvent::PlayerLeft { player_id: player },
                );
                self.push_room_list();
            }
            None => {}
        }
    }

    fn handle_start(&mut self, player: PlayerId) {
        let Some(room) = self.directory.room_by_participant_mut(player)
        else {
            return self.reject(player, &RoomError::NotInRoom(player));
        };
        if !room.is_host(player) {
            return self.reject(player, &RoomError::NotHost(player));
        }
        if !room.start_game() {
            let error = if room.status() != RoomStatus::Waiting {
                RoomError::AlreadyStarted(room.id().clone())
            } else {
                RoomError::NoChallengers
            };
            return self.reject(player, &error);
        }

        let room_id = room.id().clone();
        let host_id = room.host().id;
        let snapshots = room.snapshots();

        self.gateway
            .broadcast_group(&room_id, &ServerEvent::GameStarted);
        for snapshot in &snapshots {
            self.gateway.send(
                snapshot.challenger_id,
                ServerEvent::GameState {
                    state: snapshot.clone(),
                },
            );
        }
        for snapshot in snapshots {
            self.gateway
                .send(host_id, ServerEvent::GameState { state: snapshot });
        }
        // The room just left the lobby.
        self.push_room_list();
    }

    fn handle_place(&mut self, player: PlayerId, position: Position) {
        let Some(room) = self.directory.room_by_participant_mut(player)
        else {
            return self.reject(player, &RoomError::NotInRoom(player));
        };
        if room.status() != RoomStatus::Playing {
            let error = RoomError::NotPlaying(room.id().clone());
            return self.reject(player, &error);
        }

        if room.is_host(player) {
            // Fan the same position out to every live board. Boards that
            // can't take it skip it; the authoritative per-board results
            // go out as snapshots either way.
            room.place_host_stone(position);

            let room_id = room.id().clone();
            let host_id = room.host().id;
            let snapshots = room.snapshots();
            let game_over = room.is_game_over();
            if game_over {
                room.finish();
            }

            self.gateway.broadcast_group(
                &room_id,
                &ServerEvent::HostMoved { position },
            );
            for snapshot in snapshots {
                self.gateway.send(
                    snapshot.challenger_id,
                    ServerEvent::GameState {
                        state: snapshot.clone(),
                    },
                );
                self.gateway.send(
                    host_id,
                    ServerEvent::GameState {
                        state: snapshot.clone(),
                    },
                );
                if snapshot.phase.is_finished() {
                    self.gateway.send(
                        snapshot.challenger_id,
                        ServerEvent::GameOver {
                            state: snapshot.clone(),
                        },
                    );
                    self.gateway.send(
                        host_id,
                        ServerEvent::GameOver { state: snapshot },
                    );
                }
            }
            if game_over {
                self.push_room_list();
            }
        } else {
            if !room.place_challenger_stone(player, position) {
                return self.reject(player, &RoomError::InvalidMove);
            }

            let host_id = room.host().id;
            let snapshot = room
                .match_snapshot(player)
                .expect("move was just accepted on this match");
            let all_responded = room.all_challengers_responded();
            let game_over = room.is_game_over();
            if game_over {
                room.finish();
            }

            self.gateway.send(
                player,
                ServerEvent::GameState {
                    state: snapshot.clone(),
                },
            );
            self.gateway.send(
                host_id,
                ServerEvent::GameState {
                    state: snapshot.clone(),
                },
            );
            self.gateway.send(
                host_id,
                ServerEvent::ChallengerMoved {
                    challenger_id: player,
                    position,
                },
            );
            if snapshot.phase.is_finished() {
                self.gateway.send(
                    player,
                    ServerEvent::GameOver {
                        state: snapshot.clone(),
                    },
                );
                self.gateway
                    .send(host_id, ServerEvent::GameOver { state: snapshot });
            }
            if all_responded {
                self.gateway
                    .send(host_id, ServerEvent::AllChallengersResponded);
            }
            if game_over {
                self.push_room_list();
            }
        }
    }
}
