use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::board::Board;
use super::error::GameError;
use super::types::{
    Coord, GameSettings, GameSnapshot, GameState, MaskedBoard, MaskedCell, Player, PlayerId,
    RevealedCell,
};

/// Outcome of removing a player from the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRemoval {
    /// The roster is empty and the session should be deleted
    pub roster_empty: bool,
    /// Set when the departing player was host and someone else took over
    pub new_host: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOver {
    pub won: bool,
    pub triggered_by: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealResult {
    pub cells: Vec<RevealedCell>,
    pub game_over: Option<GameOver>,
}

impl RevealResult {
    fn unchanged() -> Self {
        Self {
            cells: Vec::new(),
            game_over: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagResult {
    pub flagged: bool,
    pub flags_remaining: i64,
}

/// One room: roster, lifecycle state and the (lazily generated) board
#[derive(Debug, Clone)]
pub struct Session {
    code: String,
    settings: GameSettings,
    players: Vec<Player>,
    host_id: PlayerId,
    state: GameState,
    board: Option<Board>,
    revealed: HashSet<Coord>,
    flagged: HashSet<Coord>,
    start_time: Option<DateTime<Utc>>,
    last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(code: String, settings: GameSettings, host: Player) -> Self {
        Self {
            code,
            settings,
            host_id: host.id.clone(),
            players: vec![host],
            state: GameState::Lobby,
            board: None,
            revealed: HashSet::new(),
            flagged: HashSet::new(),
            start_time: None,
            last_activity: Utc::now(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    pub fn ensure_host(&self, player_id: &str, action: &'static str) -> Result<(), GameError> {
        if self.is_host(player_id) {
            Ok(())
        } else {
            Err(GameError::NotHost(action))
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    /// Goes negative when players over-flag
    pub fn flags_remaining(&self) -> i64 {
        i64::from(self.settings.mines) - self.flagged.len() as i64
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn is_idle(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now.signed_duration_since(self.last_activity)
            .to_std()
            .map(|idle| idle > threshold)
            .unwrap_or(false)
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    fn ensure_state(&self, expected: GameState) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::WrongState(self.state))
        }
    }

    fn coord(&self, x: i64, y: i64) -> Result<Coord, GameError> {
        Coord::checked(x, y, self.settings.width, self.settings.height)
    }

    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if let Some(existing) = self.player(&player.id) {
            if existing.color == player.color {
                self.touch();
                return Ok(());
            }
        }

        if self.players.len() >= self.settings.max_players {
            return Err(GameError::RoomFull);
        }

        let color_taken = self
            .players
            .iter()
            .any(|p| p.id != player.id && p.color == player.color);
        if color_taken {
            return Err(GameError::ColorTaken);
        }

        debug!(room_code = %self.code, player_id = %player.id, "Player added to roster");
        self.players.retain(|p| p.id != player.id);
        self.players.push(player);
        self.touch();
        Ok(())
    }

    pub fn remove_player(&mut self, player_id: &str) -> PlayerRemoval {
        self.players.retain(|p| p.id != player_id);
        self.touch();

        let mut new_host = None;
        if self.host_id == player_id {
            if let Some(first) = self.players.first() {
                self.host_id = first.id.clone();
                new_host = Some(first.id.clone());
                info!(room_code = %self.code, new_host = %first.id, "Host transferred");
            }
        }

        PlayerRemoval {
            roster_empty: self.players.is_empty(),
            new_host,
        }
    }

    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.ensure_state(GameState::Lobby)?;
        if self.players.len() < 2 {
            return Err(GameError::InsufficientPlayers);
        }

        self.state = GameState::Playing;
        self.start_time = Some(Utc::now());
        self.touch();
        Ok(())
    }

    pub fn reveal(&mut self, x: i64, y: i64, player_id: &str) -> Result<RevealResult, GameError> {
        let coord = self.coord(x, y)?;
        self.ensure_state(GameState::Playing)?;

        if self.revealed.contains(&coord) || self.flagged.contains(&coord) {
            return Ok(RevealResult::unchanged());
        }

        let settings = self.settings;
        let board = self.board.get_or_insert_with(|| {
            debug!(room_code = %self.code, x = coord.x, y = coord.y, "Generating board");
            Board::generate(settings.width, settings.height, settings.mines, coord)
        });

        let outcome = board.reveal(coord, player_id, &mut self.revealed, &self.flagged);
        self.touch();

        if outcome.hit_mine {
            self.state = GameState::Lost;
            return Ok(RevealResult {
                cells: outcome.cells,
                game_over: Some(GameOver {
                    won: false,
                    triggered_by: player_id.to_string(),
                }),
            });
        }

        let mut game_over = None;
        if self.revealed.len() as u32 == settings.safe_cells() {
            self.state = GameState::Won;
            game_over = Some(GameOver {
                won: true,
                triggered_by: player_id.to_string(),
            });
        }

        Ok(RevealResult {
            cells: outcome.cells,
            game_over,
        })
    }

    /// Flips the flag on a hidden cell; `None` means nothing changed
    pub fn toggle_flag(
        &mut self,
        x: i64,
        y: i64,
        player_id: &str,
    ) -> Result<Option<FlagResult>, GameError> {
        let coord = self.coord(x, y)?;
        self.ensure_state(GameState::Playing)?;

        if self.revealed.contains(&coord) {
            return Ok(None);
        }

        let flagged = if self.flagged.remove(&coord) {
            false
        } else {
            self.flagged.insert(coord);
            true
        };
        debug!(room_code = %self.code, player_id = %player_id, x, y, flagged, "Flag toggled");
        self.touch();

        Ok(Some(FlagResult {
            flagged,
            flags_remaining: self.flags_remaining(),
        }))
    }

    /// Starts a fresh round after a win or loss, keeping roster and host
    pub fn reset(&mut self) -> Result<(), GameError> {
        if !self.state.is_finished() {
            return Err(GameError::RoundInProgress);
        }

        self.clear_board();
        self.state = GameState::Playing;
        self.start_time = Some(Utc::now());
        Ok(())
    }

    pub fn return_to_lobby(&mut self) -> Result<(), GameError> {
        if self.state == GameState::Lobby {
            return Err(GameError::WrongState(self.state));
        }

        self.clear_board();
        self.state = GameState::Lobby;
        self.start_time = None;
        Ok(())
    }

    fn clear_board(&mut self) {
        self.board = None;
        self.revealed.clear();
        self.flagged.clear();
        self.touch();
    }

    /// Client view of the board, `None` until the first reveal of the round
    pub fn masked_state(&self) -> Option<MaskedBoard> {
        let board = self.board.as_ref()?;

        let rows = (0..board.height())
            .map(|y| {
                (0..board.width())
                    .map(|x| {
                        let coord = Coord::new(x, y);
                        if self.revealed.contains(&coord) {
                            let cell = board.cell(coord);
                            MaskedCell::Revealed {
                                value: cell.value(),
                                revealed_by: cell.revealed_by.clone(),
                            }
                        } else if self.flagged.contains(&coord) {
                            MaskedCell::Flagged
                        } else {
                            MaskedCell::Hidden
                        }
                    })
                    .collect()
            })
            .collect();

        Some(rows)
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.start_time
            .map(|start| Utc::now().signed_duration_since(start).num_seconds())
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            code: self.code.clone(),
            settings: self.settings,
            players: self.players.clone(),
            host_id: self.host_id.clone(),
            state: self.state,
            board: self.masked_state(),
            flags_remaining: self.flags_remaining(),
            elapsed_time: self.elapsed_seconds(),
        }
    }

    /// Installs a known board, for deterministic tests
    #[cfg(test)]
    pub(crate) fn set_board(&mut self, board: Board) {
        self.board = Some(board);
    }
}
