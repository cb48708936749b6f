use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::code::{normalize_code, CodeGenerator, RandomCodeGenerator};
use crate::game::{GameSettings, GameState, Player, Session};

/// Aggregate room counters exposed on `/stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_games: usize,
    pub active_games: usize,
    pub lobby_games: usize,
}

/// Owns every live session, keyed by room code.
///
/// Not synchronized: it is owned by the router loop and only ever touched
/// from there.
pub struct RoomRegistry {
    games: HashMap<String, Session>,
    code_generator: Box<dyn CodeGenerator>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_code_generator(Box::new(RandomCodeGenerator::new()))
    }

    pub fn with_code_generator(code_generator: Box<dyn CodeGenerator>) -> Self {
        Self {
            games: HashMap::new(),
            code_generator,
        }
    }

    /// Draws codes until one is not held by a live room
    pub fn generate_code(&self) -> String {
        loop {
            let code = self.code_generator.generate();
            if !self.games.contains_key(&code) {
                return code;
            }
            debug!(room_code = %code, "Room code collision, retrying");
        }
    }

    #[instrument(skip(self, host), fields(host_id = %host.id))]
    pub fn create_game(&mut self, settings: GameSettings, host: Player) -> &mut Session {
        let code = self.generate_code();
        info!(room_code = %code, "Creating room");
        self.games
            .entry(code.clone())
            .or_insert_with(|| Session::new(code, settings, host))
    }

    pub fn get_game(&self, code: &str) -> Option<&Session> {
        self.games.get(&normalize_code(code))
    }

    pub fn get_game_mut(&mut self, code: &str) -> Option<&mut Session> {
        self.games.get_mut(&normalize_code(code))
    }

    pub fn delete_game(&mut self, code: &str) -> Option<Session> {
        let removed = self.games.remove(&normalize_code(code));
        if removed.is_some() {
            info!(room_code = %code, "Room deleted");
        }
        removed
    }

    /// Deletes rooms with no activity for longer than `threshold`, returning their codes
    #[instrument(skip(self))]
    pub fn sweep_idle(&mut self, now: DateTime<Utc>, threshold: Duration) -> Vec<String> {
        let stale: Vec<String> = self
            .games
            .iter()
            .filter(|(_, session)| session.is_idle(now, threshold))
            .map(|(code, _)| code.clone())
            .collect();

        for code in &stale {
            self.games.remove(code);
            info!(room_code = %code, "Removed idle room");
        }

        stale
    }

    pub fn stats(&self) -> RegistryStats {
        let count = |state: GameState| {
            self.games
                .values()
                .filter(|session| session.state() == state)
                .count()
        };

        RegistryStats {
            total_games: self.games.len(),
            active_games: count(GameState::Playing),
            lobby_games: count(GameState::Lobby),
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
