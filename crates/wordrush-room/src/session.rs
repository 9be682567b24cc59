//! The game state machine of one room.
//!
//! [`GameSession`] is plain synchronous state: every operation takes the
//! current instant as an argument, mutates the room, and queues the events
//! the members should see. It owns no timers. The room actor reads
//! [`GameSession::round_deadline`] and the game status after each
//! operation and arms its own timers to match, then drains
//! [`GameSession::take_events`] and broadcasts them.
//!
//! ```text
//!  Lobby ──start──→ InGame ──end──→ Finished ──play_again──→ Lobby
//!                    │  ↑
//!                    └──┘ rounds: begin → guessed | timed out → begin
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use tokio::time::Instant;
use wordrush_protocol::{
    GameEndReason, PlayerId, RoomCode, RoomSnapshot, RoomStatus, RoundEndReason, RoundWinner,
    ServerEvent,
};
use wordrush_words::WordRecord;

use crate::deck::WordDeck;
use crate::mask::mask_word;
use crate::roster::Roster;
use crate::scoring::points_for;
use crate::text::normalize_guess;
use crate::{GameConfig, RoomError};

/// The word currently being guessed.
#[derive(Debug, Clone)]
pub struct Round {
    pub word: WordRecord,
    pub mask: String,
    pub started_at: Instant,
    pub ends_at: Instant,
    pub winner: Option<PlayerId>,
}

/// What became of a submitted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The guess solved the round.
    Correct { points: u32 },
    /// A live round, but the wrong word.
    Wrong,
    /// No round to guess at, or the guesser can't play right now.
    Ignored,
}

/// State and rules of one room.
#[derive(Debug)]
pub struct GameSession {
    code: RoomCode,
    config: GameConfig,
    status: RoomStatus,
    roster: Roster,
    deck: WordDeck,
    round: Option<Round>,
    game_ends_at: Option<Instant>,
    events: Vec<ServerEvent>,
}

impl GameSession {
    /// Opens a room in the lobby with `host` as its only member.
    pub fn new(code: RoomCode, config: GameConfig, host: PlayerId, nickname: String) -> Self {
        let mut roster = Roster::new();
        roster.add(host, nickname);
        let mut session = Self {
            code,
            config,
            status: RoomStatus::Lobby,
            roster,
            deck: WordDeck::new(),
            round: None,
            game_ends_at: None,
            events: Vec::new(),
        };
        session.emit_state();
        session
    }

    // -- membership -------------------------------------------------------

    /// Adds a player to the lobby. `nickname` must already be normalized.
    pub fn join(&mut self, id: PlayerId, nickname: String) -> Result<(), RoomError> {
        if !self.status.is_joinable() {
            return Err(RoomError::NotJoinable(self.code.clone()));
        }
        if self.roster.contains(id) {
            return Err(RoomError::AlreadyInRoom(id, self.code.clone()));
        }
        if self.roster.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        if self.roster.has_nickname(&nickname) {
            return Err(RoomError::DuplicateNickname(nickname));
        }

        self.roster.add(id, nickname);
        tracing::info!(
            room_code = %self.code,
            player_id = %id,
            players = self.roster.len(),
            "player joined"
        );
        self.emit_state();
        Ok(())
    }

    /// Handles a lost connection. Returns `true` if nobody in the room is
    /// connected any more, in which case the room should be destroyed.
    ///
    /// Mid-game the player only goes offline, keeping their score for the
    /// rankings; the game ends once the last player goes. In the lobby or
    /// after a game the player is removed outright.
    pub fn disconnect(&mut self, id: PlayerId) -> bool {
        if !self.roster.contains(id) {
            return self.is_abandoned();
        }

        if self.status.is_in_game() {
            if let Some(player) = self.roster.get_mut(id) {
                player.connected = false;
            }
            tracing::info!(room_code = %self.code, player_id = %id, "player went offline mid-game");
            self.emit_state();
            if self.roster.connected_count() == 0 {
                self.end(GameEndReason::AllPlayersLeft);
            }
        } else {
            self.roster.remove(id);
            tracing::info!(
                room_code = %self.code,
                player_id = %id,
                players = self.roster.len(),
                "player left"
            );
            if !self.roster.is_empty() {
                self.emit_state();
            }
        }

        self.is_abandoned()
    }

    // -- game lifecycle ---------------------------------------------------

    /// Checks whether `requester` may start a game right now, without
    /// touching the word supply.
    pub fn ensure_can_start(&self, requester: PlayerId, enabled: bool) -> Result<(), RoomError> {
        if !self.roster.is_host(requester) {
            return Err(RoomError::NotHost);
        }
        if self.status != RoomStatus::Lobby {
            return Err(RoomError::AlreadyStarted);
        }
        if !enabled {
            return Err(RoomError::GamePaused);
        }
        Ok(())
    }

    /// Starts a game with a shuffled copy of `catalogue`.
    ///
    /// Re-runs [`ensure_can_start`](Self::ensure_can_start), since the
    /// room may have changed while the catalogue was being fetched. On
    /// error nothing changes.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        requester: PlayerId,
        catalogue: &[WordRecord],
        enabled: bool,
        now: Instant,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        self.ensure_can_start(requester, enabled)?;
        if self.deck.shuffle_from(catalogue, rng) == 0 {
            return Err(wordrush_words::SupplyError::Empty.into());
        }

        self.roster.reset_scores();
        self.round = None;
        self.game_ends_at = Some(now + self.config.game_duration);
        self.status = RoomStatus::InGame;
        tracing::info!(
            room_code = %self.code,
            players = self.roster.len(),
            words = self.deck.remaining(),
            "game started"
        );

        self.emit(ServerEvent::GameStarted {
            duration_ms: duration_ms(self.config.game_duration),
        });
        self.emit_state();
        self.begin_round(now);
        Ok(())
    }

    /// Submits a guess for the current round.
    ///
    /// Guesses that can't count (no game, offline or unknown player, blank
    /// guess, no live round, round already past its deadline) are ignored
    /// without an error. A correct guess resolves the round and the next
    /// one begins immediately, so a second identical guess finds a new
    /// word and is simply wrong.
    pub fn guess(&mut self, id: PlayerId, raw: &str, now: Instant) -> GuessOutcome {
        if !self.status.is_in_game() {
            return GuessOutcome::Ignored;
        }
        if !self.roster.get(id).is_some_and(|p| p.connected) {
            return GuessOutcome::Ignored;
        }
        if self.game_ends_at.is_some_and(|end| now >= end) {
            self.end(GameEndReason::TimeUp);
            return GuessOutcome::Ignored;
        }
        let guess = normalize_guess(raw);
        if guess.is_empty() {
            return GuessOutcome::Ignored;
        }
        let Some(round) = self.round.as_mut() else {
            return GuessOutcome::Ignored;
        };
        if round.winner.is_some() || now >= round.ends_at {
            return GuessOutcome::Ignored;
        }
        if guess != round.word.word {
            return GuessOutcome::Wrong;
        }

        round.winner = Some(id);
        let remaining = round.ends_at.saturating_duration_since(now);
        let points = points_for(remaining, self.config.round_duration, self.config.max_points);
        let word = round.word.clone();
        self.round = None;

        let nickname = match self.roster.get_mut(id) {
            Some(player) => {
                player.score += points;
                player.nickname.clone()
            }
            None => String::new(),
        };
        self.deck.mark_solved(&word);
        tracing::debug!(room_code = %self.code, player_id = %id, points, "round solved");

        self.emit(ServerEvent::RoundEnded {
            reason: RoundEndReason::Guessed,
            word: word.word,
            winner: Some(RoundWinner {
                player_id: id,
                nickname,
            }),
            points_awarded: points,
        });
        self.emit_state();
        self.begin_round(now);
        GuessOutcome::Correct { points }
    }

    /// Resolves the current round as timed out if its deadline has passed.
    ///
    /// Does nothing for a round that is already resolved or not yet due,
    /// so a stale timer wake-up is harmless.
    pub fn on_round_deadline(&mut self, now: Instant) {
        if !self.status.is_in_game() {
            return;
        }
        let due = self
            .round
            .as_ref()
            .is_some_and(|r| r.winner.is_none() && now >= r.ends_at);
        if !due {
            return;
        }
        if self.game_ends_at.is_some_and(|end| now >= end) {
            self.end(GameEndReason::TimeUp);
            return;
        }

        let Some(round) = self.round.take() else {
            return;
        };
        tracing::debug!(room_code = %self.code, word = %round.word.word, "round timed out");
        self.emit(ServerEvent::RoundEnded {
            reason: RoundEndReason::TimedOut,
            word: round.word.word.clone(),
            winner: None,
            points_awarded: 0,
        });
        self.deck.recycle(round.word);
        self.begin_round(now);
    }

    /// Broadcasts the remaining game time, and ends the game once it is
    /// zero, whatever state the round is in.
    pub fn on_tick(&mut self, now: Instant) {
        let Some(end) = self.game_ends_at else {
            return;
        };
        let remaining = end.saturating_duration_since(now);
        self.emit(ServerEvent::Tick {
            remaining_ms: duration_ms(remaining),
        });
        if remaining.is_zero() {
            self.end(GameEndReason::TimeUp);
        }
    }

    /// Returns a finished room to the lobby for another game. Offline
    /// players are dropped and scores reset.
    pub fn play_again(&mut self, requester: PlayerId) -> Result<(), RoomError> {
        if !self.roster.is_host(requester) {
            return Err(RoomError::NotHost);
        }
        if self.status != RoomStatus::Finished {
            return Err(RoomError::NotFinished);
        }

        self.status = RoomStatus::Lobby;
        self.round = None;
        self.game_ends_at = None;
        self.deck.clear();
        let purged = self.roster.purge_disconnected();
        self.roster.reset_scores();
        tracing::info!(room_code = %self.code, purged, "room back in lobby");
        self.emit_state();
        Ok(())
    }

    fn begin_round(&mut self, now: Instant) {
        let Some(end) = self.game_ends_at else {
            return;
        };
        let remaining = end.saturating_duration_since(now);
        if remaining.is_zero() {
            self.end(GameEndReason::TimeUp);
            return;
        }
        let Some(word) = self.deck.draw() else {
            self.end(GameEndReason::WordPoolExhausted);
            return;
        };

        let duration = remaining.min(self.config.round_duration);
        let mask = mask_word(&word.word);
        self.emit(ServerEvent::RoundStarted {
            masked_word: mask.clone(),
            hint: word.hint.clone(),
            length: word.length,
            duration_ms: duration_ms(duration),
            ends_at_ms: unix_ms_after(duration),
        });
        self.round = Some(Round {
            word,
            mask,
            started_at: now,
            ends_at: now + duration,
            winner: None,
        });
    }

    fn end(&mut self, reason: GameEndReason) {
        if !self.status.is_in_game() {
            return;
        }
        self.status = RoomStatus::Finished;
        self.game_ends_at = None;
        self.round = None;
        self.roster.ensure_connected_host();

        let rankings = self.roster.rankings();
        let winner_ids = self.roster.winners();
        tracing::info!(
            room_code = %self.code,
            %reason,
            winners = winner_ids.len(),
            "game ended"
        );
        self.emit(ServerEvent::GameEnded {
            reason,
            rankings,
            winner_ids,
        });
        self.emit_state();
    }

    // -- accessors --------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// When the current round times out, if one is live.
    pub fn round_deadline(&self) -> Option<Instant> {
        self.round
            .as_ref()
            .filter(|r| r.winner.is_none())
            .map(|r| r.ends_at)
    }

    pub fn game_ends_at(&self) -> Option<Instant> {
        self.game_ends_at
    }

    /// Whether no member is connected.
    pub fn is_abandoned(&self) -> bool {
        self.roster.connected_count() == 0
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_code: self.code.clone(),
            status: self.status,
            host: self.roster.host(),
            players: self.roster.views(),
        }
    }

    /// Drains the events queued since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<ServerEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ServerEvent) {
        self.events.push(event);
    }

    fn emit_state(&mut self) {
        let snapshot = self.snapshot();
        self.emit(ServerEvent::RoomState(snapshot));
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Wall-clock Unix milliseconds `offset` from now, for clients.
fn unix_ms_after(offset: Duration) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    duration_ms(now + offset)
}
