//! Game and registry configuration, plus the administrative feature gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Rules for every game played in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Maximum players in a room.
    pub max_players: usize,

    /// Total length of a game, from start to `time_up`.
    pub game_duration: Duration,

    /// Nominal length of one round. A round that would overrun the game is
    /// shortened to the time left.
    pub round_duration: Duration,

    /// How often the remaining game time is broadcast.
    pub tick_interval: Duration,

    /// Points for a guess with the full nominal round still ahead.
    pub max_points: u32,

    /// Nicknames longer than this many characters are truncated.
    pub max_nickname_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: 4,
            game_duration: Duration::from_secs(180),
            round_duration: Duration::from_secs(30),
            tick_interval: Duration::from_secs(1),
            max_points: 100,
            max_nickname_len: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Settings for the process-wide room registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Ceiling on rooms tracked at once, in any status.
    pub max_rooms: usize,

    /// Initial state of the feature gate.
    pub enabled: bool,

    /// Rules handed to every room the registry creates.
    pub game: GameConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_rooms: 100,
            enabled: true,
            game: GameConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// FeatureGate
// ---------------------------------------------------------------------------

/// On/off switch for new rooms and game starts.
///
/// Shared (via `Arc`) by the registry and every room actor, so flipping it
/// takes effect on the very next create or start. Games already running are
/// not interrupted.
#[derive(Debug)]
pub struct FeatureGate {
    enabled: AtomicBool,
}

impl FeatureGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Sets the gate and returns its previous value.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            tracing::info!(enabled, "game feature gate changed");
        }
        previous
    }
}

impl Default for FeatureGate {
    fn default() -> Self {
        Self::new(true)
    }
}
