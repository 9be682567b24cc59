//! Room membership: players in join order, plus the host.

use wordrush_protocol::{PlayerId, PlayerView};

use crate::text::nickname_key;

/// A member of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub score: u32,
    pub connected: bool,
}

/// The players of one room.
///
/// Players are kept in join order, which decides host hand-over and breaks
/// ranking ties. The host is always a member, or `None` once the roster is
/// empty.
#[derive(Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
    host: Option<PlayerId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a connected player with zero score. The first player added
    /// to an empty roster becomes host.
    pub fn add(&mut self, id: PlayerId, nickname: String) {
        self.players.push(Player {
            id,
            nickname,
            score: 0,
            connected: true,
        });
        if self.host.is_none() {
            self.host = Some(id);
        }
    }

    /// Removes a player. If they were host, the earliest remaining
    /// connected member takes over (or the earliest member at all).
    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        let removed = self.players.remove(index);
        if self.host == Some(id) {
            self.host = self.first_connected().or_else(|| self.players.first().map(|p| p.id));
        }
        Some(removed)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn is_host(&self, id: PlayerId) -> bool {
        self.host == Some(id)
    }

    /// Whether any member's nickname matches, ignoring case and whitespace
    /// runs.
    pub fn has_nickname(&self, nickname: &str) -> bool {
        let key = nickname_key(nickname);
        self.players.iter().any(|p| nickname_key(&p.nickname) == key)
    }

    pub fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.score = 0;
        }
    }

    /// Drops every disconnected member, then makes sure the host is a
    /// connected member. Returns how many were removed.
    pub fn purge_disconnected(&mut self) -> usize {
        let before = self.players.len();
        self.players.retain(|p| p.connected);
        self.ensure_connected_host();
        before - self.players.len()
    }

    /// Hands the host role to the earliest connected member if the current
    /// host is gone or disconnected. With nobody connected the host is left
    /// alone.
    pub fn ensure_connected_host(&mut self) {
        let host_ok = self
            .host
            .and_then(|id| self.get(id))
            .is_some_and(|p| p.connected);
        if host_ok {
            return;
        }
        if let Some(next) = self.first_connected() {
            self.host = Some(next);
        } else if self.host.is_some_and(|id| !self.contains(id)) {
            self.host = self.players.first().map(|p| p.id);
        }
    }

    /// Members in join order, as sent to clients.
    pub fn views(&self) -> Vec<PlayerView> {
        self.players.iter().map(|p| self.view(p)).collect()
    }

    /// Members sorted by score, highest first. Ties keep join order.
    pub fn rankings(&self) -> Vec<PlayerView> {
        let mut views = self.views();
        views.sort_by(|a, b| b.score.cmp(&a.score));
        views
    }

    /// Everyone tied for the top score, in join order.
    pub fn winners(&self) -> Vec<PlayerId> {
        let Some(top) = self.players.iter().map(|p| p.score).max() else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|p| p.score == top)
            .map(|p| p.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    fn first_connected(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| p.connected).map(|p| p.id)
    }

    fn view(&self, player: &Player) -> PlayerView {
        PlayerView {
            id: player.id,
            nickname: player.nickname.clone(),
            score: player.score,
            connected: player.connected,
            is_host: self.is_host(player.id),
        }
    }
}
