//! Room actor: an isolated Tokio task that owns one [`GameSession`].
//!
//! Every mutation of a room, whether it comes from a player, the round
//! deadline, or the game ticker, is handled by this one task in arrival
//! order. That is what makes "first correct guess wins" and "the game clock
//! beats a simultaneous round timeout" hold without any locking.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use wordrush_clock::{Deadline, Ticker};
use wordrush_protocol::{PlayerId, RoomCode, RoomSnapshot, RoomStatus, ServerEvent};
use wordrush_words::{SupplyError, WordCache, WordRecord, WordSource};

use crate::session::{GameSession, GuessOutcome};
use crate::{FeatureGate, GameConfig, RoomError};

/// Channel for delivering room events to one player's connection handler.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Command channel capacity per room.
pub(crate) const ROOM_CHANNEL_SIZE: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
        reply: Reply<()>,
    },

    Start {
        player_id: PlayerId,
        reply: Reply<()>,
    },

    /// Sent by the actor to itself once a catalogue fetch for a pending
    /// start has finished. Carries the original requester's reply.
    CatalogueReady {
        player_id: PlayerId,
        catalogue: Result<Arc<[WordRecord]>, SupplyError>,
        reply: Reply<()>,
    },

    /// Fire-and-forget.
    Guess {
        player_id: PlayerId,
        guess: String,
    },

    PlayAgain {
        player_id: PlayerId,
        reply: Reply<()>,
    },

    /// Replies `true` if the room has nobody connected left.
    Disconnect {
        player_id: PlayerId,
        reply: oneshot::Sender<bool>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    GetSnapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    Shutdown,
}

/// Room metadata (not the full player list).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub player_count: usize,
    pub connected_count: usize,
    pub max_players: usize,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Connection handlers keep one for the room they are in
/// so that game traffic doesn't go through the registry.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub(crate) async fn join(
        &self,
        player_id: PlayerId,
        nickname: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            nickname,
            sender,
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.unavailable())?
    }

    /// Asks the room to start a game. Resolves once the game has started
    /// or the start was refused, which may involve fetching the catalogue.
    pub async fn start_game(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Start { player_id, reply }).await?;
        rx.await.map_err(|_| self.unavailable())?
    }

    /// Submits a guess. There is no answer; the outcome is broadcast.
    pub async fn submit_guess(&self, player_id: PlayerId, guess: String) -> Result<(), RoomError> {
        self.send(RoomCommand::Guess { player_id, guess }).await
    }

    pub async fn play_again(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::PlayAgain { player_id, reply }).await?;
        rx.await.map_err(|_| self.unavailable())?
    }

    /// Reports a lost connection. Returns `true` if the room is abandoned.
    pub(crate) async fn disconnect(&self, player_id: PlayerId) -> Result<bool, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Disconnect { player_id, reply }).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply }).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::GetSnapshot { reply }).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    pub(crate) async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }
}

/// What woke the actor up.
enum Wake {
    Tick,
    RoundDeadline,
    Command(Option<RoomCommand>),
}

struct RoomActor<S: WordSource> {
    session: GameSession,
    senders: HashMap<PlayerId, PlayerSender>,
    words: Arc<WordCache<S>>,
    gate: Arc<FeatureGate>,
    ticker: Ticker,
    round_deadline: Deadline,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Lets catalogue fetches report back without keeping the room alive.
    mailbox: mpsc::WeakSender<RoomCommand>,
    start_pending: bool,
}

impl<S: WordSource> RoomActor<S> {
    async fn run(mut self) {
        tracing::info!(room_code = %self.session.code(), "room actor started");
        self.flush();

        loop {
            // The game clock is polled first: when its last tick and a
            // round deadline are due together, time_up wins.
            let wake = tokio::select! {
                biased;
                _ = self.ticker.wait_for_tick() => Wake::Tick,
                _ = self.round_deadline.wait() => Wake::RoundDeadline,
                cmd = self.receiver.recv() => Wake::Command(cmd),
            };

            match wake {
                Wake::Tick => self.session.on_tick(Instant::now()),
                Wake::RoundDeadline => self.session.on_round_deadline(Instant::now()),
                Wake::Command(None) => break,
                Wake::Command(Some(RoomCommand::Shutdown)) => {
                    tracing::info!(room_code = %self.session.code(), "room shutting down");
                    break;
                }
                Wake::Command(Some(cmd)) => self.handle(cmd),
            }

            self.flush();
            self.sync_timers();
        }

        self.ticker.stop();
        self.round_deadline.disarm();
        tracing::info!(room_code = %self.session.code(), "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                player_id,
                nickname,
                sender,
                reply,
            } => {
                let result = self.session.join(player_id, nickname);
                if result.is_ok() {
                    self.senders.insert(player_id, sender);
                }
                let _ = reply.send(result);
            }
            RoomCommand::Start { player_id, reply } => self.handle_start(player_id, reply),
            RoomCommand::CatalogueReady {
                player_id,
                catalogue,
                reply,
            } => {
                let result = self.handle_catalogue(player_id, catalogue);
                let _ = reply.send(result);
            }
            RoomCommand::Guess { player_id, guess } => {
                let outcome = self.session.guess(player_id, &guess, Instant::now());
                if let GuessOutcome::Correct { points } = outcome {
                    tracing::debug!(
                        room_code = %self.session.code(),
                        %player_id,
                        points,
                        "correct guess"
                    );
                }
            }
            RoomCommand::PlayAgain { player_id, reply } => {
                let _ = reply.send(self.session.play_again(player_id));
            }
            RoomCommand::Disconnect { player_id, reply } => {
                self.senders.remove(&player_id);
                let abandoned = self.session.disconnect(player_id);
                let _ = reply.send(abandoned);
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            RoomCommand::Shutdown => {}
        }
    }

    /// Validates the request, then fetches the catalogue off the actor so
    /// a slow word store never stalls this room's clock or other rooms.
    fn handle_start(&mut self, player_id: PlayerId, reply: Reply<()>) {
        if self.start_pending {
            let _ = reply.send(Err(RoomError::AlreadyStarted));
            return;
        }
        if let Err(e) = self
            .session
            .ensure_can_start(player_id, self.gate.is_enabled())
        {
            let _ = reply.send(Err(e));
            return;
        }
        let Some(mailbox) = self.mailbox.upgrade() else {
            let _ = reply.send(Err(RoomError::Unavailable(self.session.code().clone())));
            return;
        };

        self.start_pending = true;
        let words = Arc::clone(&self.words);
        tokio::spawn(async move {
            let catalogue = words.catalogue().await;
            let _ = mailbox
                .send(RoomCommand::CatalogueReady {
                    player_id,
                    catalogue,
                    reply,
                })
                .await;
        });
    }

    fn handle_catalogue(
        &mut self,
        player_id: PlayerId,
        catalogue: Result<Arc<[WordRecord]>, SupplyError>,
    ) -> Result<(), RoomError> {
        self.start_pending = false;
        let words = catalogue.inspect_err(|e| {
            tracing::warn!(room_code = %self.session.code(), error = %e, "cannot start game");
        })?;

        let now = Instant::now();
        let mut rng = rand::rng();
        self.session
            .start(player_id, &words, self.gate.is_enabled(), now, &mut rng)?;
        self.ticker.start(now);
        Ok(())
    }

    /// Sends queued session events to every player with a live channel.
    fn flush(&mut self) {
        for event in self.session.take_events() {
            for sender in self.senders.values() {
                // A closed channel means the handler is on its way out; its
                // disconnect will arrive shortly.
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Points the timers at whatever the session now expects.
    fn sync_timers(&mut self) {
        if !self.session.status().is_in_game() {
            self.ticker.stop();
        }
        self.round_deadline.set(self.session.round_deadline());
    }

    fn info(&self) -> RoomInfo {
        let roster = self.session.roster();
        RoomInfo {
            code: self.session.code().clone(),
            status: self.session.status(),
            player_count: roster.len(),
            connected_count: roster.connected_count(),
            max_players: self.session.config().max_players,
        }
    }
}

/// Parameters for a new room actor.
pub(crate) struct RoomSpawn<S: WordSource> {
    pub code: RoomCode,
    pub config: GameConfig,
    pub host: PlayerId,
    pub nickname: String,
    pub sender: PlayerSender,
    pub words: Arc<WordCache<S>>,
    pub gate: Arc<FeatureGate>,
}

/// Spawns a room actor with its host already seated.
pub(crate) fn spawn_room<S: WordSource>(spawn: RoomSpawn<S>) -> RoomHandle {
    let (tx, rx) = mpsc::channel(ROOM_CHANNEL_SIZE);
    let code = spawn.code.clone();

    let mut senders = HashMap::new();
    senders.insert(spawn.host, spawn.sender);

    let actor = RoomActor {
        ticker: Ticker::every(spawn.config.tick_interval),
        session: GameSession::new(spawn.code, spawn.config, spawn.host, spawn.nickname),
        senders,
        words: spawn.words,
        gate: spawn.gate,
        round_deadline: Deadline::new(),
        receiver: rx,
        mailbox: tx.downgrade(),
        start_pending: false,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
