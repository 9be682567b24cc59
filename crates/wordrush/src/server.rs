//! `WordrushServer` builder and server loop.
//!
//! This is the entry point for running a Wordrush server. It ties the
//! layers together: transport → protocol → room registry → room actors.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use wordrush_protocol::{Codec, JsonCodec};
use wordrush_room::{FeatureGate, GameConfig, RegistryConfig, RegistryStatus, RoomRegistry};
use wordrush_transport::{Transport, WebSocketTransport};
use wordrush_words::{WordCache, WordCacheConfig, WordSource};

use crate::WordrushError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: WordSource, C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry<S>>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Wordrush server.
///
/// ```rust,no_run
/// # async fn run() -> Result<(), wordrush::WordrushError> {
/// use wordrush::prelude::*;
///
/// let source = StaticWordSource::from_pairs([("apple", "a fruit")]);
/// let server = WordrushServerBuilder::new()
///     .bind("127.0.0.1:8080")
///     .max_rooms(50)
///     .build(source)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct WordrushServerBuilder {
    bind_addr: String,
    registry: RegistryConfig,
    cache: WordCacheConfig,
}

impl WordrushServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            registry: RegistryConfig::default(),
            cache: WordCacheConfig::default(),
        }
    }

    /// Sets the address to listen on. Port 0 picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_owned();
        self
    }

    /// Sets the ceiling on simultaneously tracked rooms.
    pub fn max_rooms(mut self, max_rooms: usize) -> Self {
        self.registry.max_rooms = max_rooms;
        self
    }

    /// Sets whether new rooms and games are allowed at startup.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.registry.enabled = enabled;
        self
    }

    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.registry.game = game;
        self
    }

    /// Replaces the whole registry configuration.
    pub fn registry_config(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    pub fn cache_config(mut self, cache: WordCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Binds the WebSocket transport and prepares the registry.
    ///
    /// Uses [`JsonCodec`] for every frame.
    pub async fn build<S: WordSource>(
        self,
        source: S,
    ) -> Result<WordrushServer<S, JsonCodec>, WordrushError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let words = Arc::new(WordCache::with_config(source, self.cache));
        let registry = RoomRegistry::new(self.registry, words);
        let gate = registry.gate();

        let state = Arc::new(ServerState {
            rooms: Mutex::new(registry),
            codec: JsonCodec,
        });

        Ok(WordrushServer {
            transport,
            state,
            gate,
        })
    }
}

impl Default for WordrushServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Wordrush server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordrushServer<S: WordSource, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S, C>>,
    gate: Arc<FeatureGate>,
}

impl<S, C> WordrushServer<S, C>
where
    S: WordSource,
    C: Codec,
{
    pub fn local_addr(&self) -> Result<SocketAddr, WordrushError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle for operators. Stays valid while the server runs.
    pub fn admin(&self) -> AdminHandle<S, C> {
        AdminHandle {
            state: Arc::clone(&self.state),
            gate: Arc::clone(&self.gate),
        }
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), WordrushError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Wordrush server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Operator controls: the game feature gate and registry counters.
pub struct AdminHandle<S: WordSource, C: Codec> {
    state: Arc<ServerState<S, C>>,
    gate: Arc<FeatureGate>,
}

impl<S: WordSource, C: Codec> Clone for AdminHandle<S, C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<S: WordSource, C: Codec> AdminHandle<S, C> {
    /// Allows or refuses new rooms and game starts. Running games carry
    /// on either way.
    pub fn set_enabled(&self, enabled: bool) {
        self.gate.set_enabled(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    pub async fn status(&self) -> RegistryStatus {
        self.state.rooms.lock().await.status()
    }

    /// Drops the cached catalogue so the next game start refetches it.
    pub async fn refresh_words(&self) {
        let words = Arc::clone(self.state.rooms.lock().await.words());
        words.invalidate().await;
    }
}
