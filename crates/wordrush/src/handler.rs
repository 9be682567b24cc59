//! Per-connection handler: request routing and event fan-out.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Assign a `PlayerId` from the connection id
//!   2. Loop: wait for either a frame from the client or an event from the
//!      player's room, whichever comes first
//!   3. Frames are decoded into requests and routed to the registry (for
//!      create/join) or straight to the cached room handle
//!   4. On exit, a drop guard reports the disconnect to the registry

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::Level;
use wordrush_protocol::{
    ClientAction, Codec, Envelope, ErrorCode, PlayerId, Reply, Request, ServerEvent,
    ServerMessage,
};
use wordrush_room::{ErrorKind, JoinTicket, RoomError, RoomHandle};
use wordrush_transport::{Connection, TransportError, WebSocketConnection};
use wordrush_words::WordSource;

use crate::WordrushError;
use crate::server::ServerState;

/// Drop guard that reports the player's disconnect when the handler exits.
///
/// Covers every exit path, panics included. `Drop` is synchronous, so the
/// registry call runs in a fire-and-forget task.
struct DisconnectGuard<S: WordSource, C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<S, C>>,
}

impl<S: WordSource, C: Codec> Drop for DisconnectGuard<S, C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let destroyed = state.rooms.lock().await.disconnect(player_id).await;
            tracing::debug!(%player_id, room_destroyed = destroyed, "player disconnected");
        });
    }
}

/// What woke the handler loop.
enum Inbound {
    Frame(Result<Option<String>, TransportError>),
    Event(ServerEvent),
}

/// Stamps and sends server messages on one connection.
struct Outbound<'a, C: Codec> {
    conn: &'a WebSocketConnection,
    codec: &'a C,
    seq: u64,
    start: Instant,
}

impl<C: Codec> Outbound<'_, C> {
    async fn send(&mut self, payload: ServerMessage) -> Result<(), WordrushError> {
        let envelope = Envelope {
            seq: self.seq,
            timestamp: self.start.elapsed().as_millis() as u64,
            payload,
        };
        self.seq += 1;
        let text = self.codec.encode(&envelope)?;
        self.conn.send(text).await?;
        Ok(())
    }

    async fn reply(&mut self, reply: Reply) -> Result<(), WordrushError> {
        self.send(ServerMessage::Reply(reply)).await
    }

    async fn error(
        &mut self,
        request_id: Option<u64>,
        code: ErrorCode,
        message: String,
    ) -> Result<(), WordrushError> {
        self.reply(Reply::Error {
            request_id,
            code,
            message,
        })
        .await
    }

    async fn refuse(
        &mut self,
        request_id: Option<u64>,
        error: &RoomError,
    ) -> Result<(), WordrushError> {
        if refusal_level(error) == Level::WARN {
            tracing::warn!(code = ?error.code(), error = %error, "request failed");
        } else {
            tracing::debug!(code = ?error.code(), error = %error, "request refused");
        }
        self.error(request_id, error.code(), error.to_string()).await
    }
}

/// Refused requests are routine; a missing catalogue or a vanished room
/// is not.
fn refusal_level(error: &RoomError) -> Level {
    match error.kind() {
        ErrorKind::Validation | ErrorKind::Policy => Level::DEBUG,
        ErrorKind::Supply | ErrorKind::Internal => Level::WARN,
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, C>>,
) -> Result<(), WordrushError>
where
    S: WordSource,
    C: Codec,
{
    let player_id = PlayerId(conn.id().into_inner());
    tracing::info!(%player_id, peer = %conn.peer_addr(), "player connected");

    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut out = Outbound {
        conn: &conn,
        codec: &state.codec,
        seq: 1,
        start: Instant::now(),
    };
    let mut room: Option<RoomHandle> = None;

    loop {
        let inbound = tokio::select! {
            frame = conn.recv() => Inbound::Frame(frame),
            Some(event) = events_rx.recv() => Inbound::Event(event),
        };

        let text = match inbound {
            Inbound::Event(event) => {
                out.send(ServerMessage::Event(event)).await?;
                continue;
            }
            Inbound::Frame(Ok(Some(text))) => text,
            Inbound::Frame(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Inbound::Frame(Err(TransportError::InvalidFrame)) => {
                out.error(None, ErrorCode::BadRequest, "frame is not valid UTF-8".into())
                    .await?;
                continue;
            }
            Inbound::Frame(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let request = match state.codec.decode::<Envelope<Request>>(&text) {
            Ok(envelope) => envelope.payload,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode request");
                out.error(None, ErrorCode::BadRequest, e.to_string()).await?;
                continue;
            }
        };

        handle_request(&state, &mut out, player_id, &events_tx, &mut room, request).await?;
    }

    // _guard drops here → disconnect is reported.
    Ok(())
}

async fn handle_request<S, C>(
    state: &ServerState<S, C>,
    out: &mut Outbound<'_, C>,
    player_id: PlayerId,
    events_tx: &mpsc::UnboundedSender<ServerEvent>,
    room: &mut Option<RoomHandle>,
    request: Request,
) -> Result<(), WordrushError>
where
    S: WordSource,
    C: Codec,
{
    let request_id = request.id;

    match request.action {
        ClientAction::CreateRoom { nickname } => {
            let result = state
                .rooms
                .lock()
                .await
                .create_room(player_id, &nickname, events_tx.clone());
            joined(out, room, request_id, result).await
        }

        ClientAction::JoinRoom {
            room_code,
            nickname,
        } => {
            // The registry lock is held across the room's answer so two
            // joins can't race each other into one slot.
            let result = state
                .rooms
                .lock()
                .await
                .join_room(player_id, &room_code, &nickname, events_tx.clone())
                .await;
            joined(out, room, request_id, result).await
        }

        ClientAction::StartGame => {
            let Some(handle) = room.as_ref() else {
                return out
                    .refuse(request_id, &RoomError::NotInRoom(player_id))
                    .await;
            };
            match handle.start_game(player_id).await {
                Ok(()) => out.reply(Reply::Ok { request_id }).await,
                Err(e) => out.refuse(request_id, &e).await,
            }
        }

        ClientAction::PlayAgain => {
            let Some(handle) = room.as_ref() else {
                return out
                    .refuse(request_id, &RoomError::NotInRoom(player_id))
                    .await;
            };
            match handle.play_again(player_id).await {
                Ok(()) => out.reply(Reply::Ok { request_id }).await,
                Err(e) => out.refuse(request_id, &e).await,
            }
        }

        ClientAction::SubmitGuess { guess } => {
            // Guesses are never answered, not even when refused.
            if let Some(handle) = room.as_ref() {
                if let Err(e) = handle.submit_guess(player_id, guess).await {
                    tracing::debug!(%player_id, error = %e, "guess dropped");
                }
            }
            Ok(())
        }
    }
}

async fn joined<C: Codec>(
    out: &mut Outbound<'_, C>,
    room: &mut Option<RoomHandle>,
    request_id: Option<u64>,
    result: Result<JoinTicket, RoomError>,
) -> Result<(), WordrushError> {
    match result {
        Ok(ticket) => {
            *room = Some(ticket.handle);
            out.reply(Reply::RoomJoined {
                request_id,
                room_code: ticket.room_code,
                player_id: ticket.player_id,
            })
            .await
        }
        Err(e) => out.refuse(request_id, &e).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordrush_protocol::RoomCode;
    use wordrush_words::SupplyError;

    #[test]
    fn test_refusal_level_policy_and_validation_are_debug() {
        assert_eq!(refusal_level(&RoomError::NotHost), Level::DEBUG);
        assert_eq!(refusal_level(&RoomError::InvalidNickname), Level::DEBUG);
        assert_eq!(
            refusal_level(&RoomError::RoomFull(RoomCode::new("ABCDEF"))),
            Level::DEBUG
        );
    }

    #[test]
    fn test_refusal_level_supply_and_internal_are_warn() {
        assert_eq!(refusal_level(&SupplyError::Empty.into()), Level::WARN);
        assert_eq!(
            refusal_level(&RoomError::Unavailable(RoomCode::new("ABCDEF"))),
            Level::WARN
        );
    }
}
