//! Per-connection handler: registration, the writer task, and the read
//! loop.
//!
//! Each accepted connection gets one of these in its own task. The flow:
//!   1. Register with the coordinator → identity + outbound event stream
//!   2. Spawn a writer task draining events to the socket
//!   3. Loop: decode frames into commands for the coordinator
//!   4. On EOF or error, enqueue `Disconnected` (the disconnect *is* a
//!      leave-room) and let the writer wind down.

use omok_protocol::{ClientCommand, Codec, JsonCodec};
use omok_transport::WebSocketConnection;
use tokio::sync::{mpsc, oneshot};

use crate::coordinator::CoordinatorMessage;
use crate::ArenaError;

pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    queue: mpsc::UnboundedSender<CoordinatorMessage>,
) -> Result<(), ArenaError> {
    let conn_id = conn.id();
    let codec = JsonCodec;

    let (reply_tx, reply_rx) = oneshot::channel();
    queue
        .send(CoordinatorMessage::Connect { reply: reply_tx })
        .map_err(|_| ArenaError::CoordinatorGone)?;
    let (player_id, mut events) =
        reply_rx.await.map_err(|_| ArenaError::CoordinatorGone)?;

    tracing::info!(%conn_id, %player_id, "connection established");

    let (mut sink, mut source) = conn.split();

    // Writer: ends when the gateway drops this player's sender
    // (unregistration) or the socket breaks.
    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::error!(%error, "failed to encode event");
                    continue;
                }
            };
            if sink.send(&bytes).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Reader: one command per frame. Frames that don't decode are
    // logged and skipped.
    loop {
        match source.recv().await {
            Ok(Some(frame)) => {
                match codec.decode::<ClientCommand>(&frame) {
                    Ok(command) => {
                        if queue
                            .send(CoordinatorMessage::Command {
                                player: player_id,
                                command,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::debug!(
                            %player_id,
                            %error,
                            "undecodable frame, skipping"
                        );
                    }
                }
            }
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(error) => {
                tracing::debug!(%player_id, %error, "recv error");
                break;
            }
        }
    }

    let _ = queue.send(CoordinatorMessage::Disconnected {
        player: player_id,
    });
    let _ = writer.await;
    Ok(())
}
