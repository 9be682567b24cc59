//! Room registry: creates, tracks, and routes players to rooms.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use wordrush_protocol::{PlayerId, RoomCode};
use wordrush_words::{WordCache, WordSource};

use crate::code::generate_unique_code;
use crate::room::{RoomSpawn, spawn_room};
use crate::text::normalize_nickname;
use crate::{FeatureGate, PlayerSender, RegistryConfig, RoomError, RoomHandle, RoomInfo};

/// What a player gets back from creating or joining a room.
#[derive(Clone)]
pub struct JoinTicket {
    pub room_code: RoomCode,
    pub player_id: PlayerId,
    /// Talk to the room directly from here on.
    pub handle: RoomHandle,
}

/// Registry counters, as exposed to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStatus {
    pub enabled: bool,
    pub active_rooms: usize,
    pub max_rooms: usize,
}

/// Every room in the process, and which player is in which.
///
/// Callers serialize access (the server keeps it behind a mutex), which
/// also serializes room code generation against the set of live codes.
pub struct RoomRegistry<S: WordSource> {
    rooms: HashMap<RoomCode, RoomHandle>,

    /// A player is in at most one room at a time.
    player_rooms: HashMap<PlayerId, RoomCode>,

    words: Arc<WordCache<S>>,
    gate: Arc<FeatureGate>,
    config: RegistryConfig,
}

impl<S: WordSource> RoomRegistry<S> {
    pub fn new(config: RegistryConfig, words: Arc<WordCache<S>>) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            words,
            gate: Arc::new(FeatureGate::new(config.enabled)),
            config,
        }
    }

    /// Opens a new room in the lobby with `player_id` as its host.
    pub fn create_room(
        &mut self,
        player_id: PlayerId,
        nickname: &str,
        sender: PlayerSender,
    ) -> Result<JoinTicket, RoomError> {
        self.ensure_not_in_room(player_id)?;
        let nickname = normalize_nickname(nickname, self.config.game.max_nickname_len)?;
        if !self.gate.is_enabled() {
            return Err(RoomError::GamePaused);
        }
        if self.rooms.len() >= self.config.max_rooms {
            return Err(RoomError::CapacityExceeded(self.config.max_rooms));
        }

        let room_code = generate_unique_code(&self.rooms, &mut rand::rng());
        let handle = spawn_room(RoomSpawn {
            code: room_code.clone(),
            config: self.config.game.clone(),
            host: player_id,
            nickname,
            sender,
            words: Arc::clone(&self.words),
            gate: Arc::clone(&self.gate),
        });
        self.rooms.insert(room_code.clone(), handle.clone());
        self.player_rooms.insert(player_id, room_code.clone());
        tracing::info!(%room_code, host = %player_id, rooms = self.rooms.len(), "room created");

        Ok(JoinTicket {
            room_code,
            player_id,
            handle,
        })
    }

    /// Adds a player to the room `code` (as typed by the user).
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        code: &str,
        nickname: &str,
        sender: PlayerSender,
    ) -> Result<JoinTicket, RoomError> {
        self.ensure_not_in_room(player_id)?;
        let nickname = normalize_nickname(nickname, self.config.game.max_nickname_len)?;
        let room_code = RoomCode::parse(code);
        let handle = self
            .rooms
            .get(&room_code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_code.clone()))?;

        if let Err(e) = handle.join(player_id, nickname, sender).await {
            if matches!(e, RoomError::Unavailable(_)) {
                self.forget_room(&room_code);
            }
            return Err(e);
        }
        self.player_rooms.insert(player_id, room_code.clone());

        Ok(JoinTicket {
            room_code,
            player_id,
            handle,
        })
    }

    /// The room a player is in.
    pub fn handle_for(&self, player_id: PlayerId) -> Result<RoomHandle, RoomError> {
        self.player_rooms
            .get(&player_id)
            .and_then(|code| self.rooms.get(code))
            .cloned()
            .ok_or(RoomError::NotInRoom(player_id))
    }

    /// Reports a player's lost connection to their room, destroying the
    /// room if nobody in it is connected any more. Returns `true` if the
    /// room was destroyed.
    pub async fn disconnect(&mut self, player_id: PlayerId) -> bool {
        let Some(room_code) = self.player_rooms.remove(&player_id) else {
            return false;
        };
        let Some(handle) = self.rooms.get(&room_code).cloned() else {
            return false;
        };

        let abandoned = match handle.disconnect(player_id).await {
            Ok(abandoned) => abandoned,
            Err(e) => {
                tracing::warn!(%room_code, %player_id, error = %e, "room gone during disconnect");
                true
            }
        };
        if abandoned {
            self.destroy_room(&room_code).await;
        }
        abandoned
    }

    /// Stops a room's actor (cancelling its timers) and forgets it.
    pub async fn destroy_room(&mut self, room_code: &RoomCode) -> bool {
        let Some(handle) = self.forget_room(room_code) else {
            return false;
        };
        let _ = handle.shutdown().await;
        tracing::info!(%room_code, rooms = self.rooms.len(), "room destroyed");
        true
    }

    fn forget_room(&mut self, room_code: &RoomCode) -> Option<RoomHandle> {
        let handle = self.rooms.remove(room_code)?;
        self.player_rooms.retain(|_, code| code != room_code);
        Some(handle)
    }

    fn ensure_not_in_room(&self, player_id: PlayerId) -> Result<(), RoomError> {
        match self.player_rooms.get(&player_id) {
            Some(code) => Err(RoomError::AlreadyInRoom(player_id, code.clone())),
            None => Ok(()),
        }
    }

    // -- administration ---------------------------------------------------

    /// The shared feature gate. Flipping it affects every room at once.
    pub fn gate(&self) -> Arc<FeatureGate> {
        Arc::clone(&self.gate)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.gate.set_enabled(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    pub fn status(&self) -> RegistryStatus {
        RegistryStatus {
            enabled: self.gate.is_enabled(),
            active_rooms: self.rooms.len(),
            max_rooms: self.config.max_rooms,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn words(&self) -> &Arc<WordCache<S>> {
        &self.words
    }

    // -- introspection ----------------------------------------------------

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Codes of every tracked room, sorted.
    pub fn room_codes(&self) -> Vec<RoomCode> {
        let mut codes: Vec<_> = self.rooms.keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn room(&self, room_code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(room_code).cloned()
    }

    pub async fn room_info(&self, room_code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(room_code)
            .ok_or_else(|| RoomError::NotFound(room_code.clone()))?;
        handle.info().await
    }

    pub fn player_room(&self, player_id: PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(&player_id)
    }
}
