use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use super::error::GameError;

/// Server-assigned opaque player identifier (UUID v4 string)
pub type PlayerId = String;

/// Largest accepted board edge
pub const MAX_DIMENSION: u16 = 100;

/// Largest accepted room capacity
pub const MAX_PLAYERS: usize = 16;

/// A cell position on the board, `x` is the column and `y` the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Converts raw client coordinates, rejecting anything outside a `width` x `height` grid
    pub fn checked(x: i64, y: i64, width: u16, height: u16) -> Result<Self, GameError> {
        let in_bounds = (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y);
        if !in_bounds {
            return Err(GameError::OutOfBounds { x, y });
        }
        Ok(Self::new(x as u16, y as u16))
    }
}

/// Room settings chosen by the creating player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub width: u16,
    pub height: u16,
    pub mines: u32,
    pub max_players: usize,
}

impl GameSettings {
    pub fn total_cells(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }

    pub fn safe_cells(&self) -> u32 {
        self.total_cells().saturating_sub(self.mines)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidSettings(
                "Board dimensions must be positive".to_string(),
            ));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(GameError::InvalidSettings(format!(
                "Board dimensions cannot exceed {}",
                MAX_DIMENSION
            )));
        }
        if self.mines == 0 {
            return Err(GameError::InvalidSettings(
                "At least one mine is required".to_string(),
            ));
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::InvalidSettings(
                "Too many mines for the board size".to_string(),
            ));
        }
        if !(2..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(GameError::InvalidSettings(format!(
                "Max players must be between 2 and {}",
                MAX_PLAYERS
            )));
        }
        Ok(())
    }
}

/// Profile a client submits when creating or joining a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    #[serde(default)]
    pub avatar: serde_json::Value,
    pub color: String,
}

impl PlayerProfile {
    pub fn into_player(self, id: PlayerId) -> Player {
        Player {
            id,
            name: self.name,
            avatar: self.avatar,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Cosmetic only, relayed to clients untouched
    #[serde(default)]
    pub avatar: serde_json::Value,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameState {
    Lobby,
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MineMarker {
    Mine,
}

/// What a revealed cell shows: its adjacent mine count or a mine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Count(u8),
    Mine(MineMarker),
}

impl CellValue {
    pub const MINE: Self = Self::Mine(MineMarker::Mine);

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine(_))
    }
}

/// One entry of a reveal delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCell {
    pub x: u16,
    pub y: u16,
    pub value: CellValue,
}

impl RevealedCell {
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// A cell as seen by clients; unrevealed mines are never exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MaskedCell {
    Hidden,
    Flagged,
    Revealed {
        value: CellValue,
        #[serde(rename = "revealedBy")]
        revealed_by: Option<PlayerId>,
    },
}

/// Masked board as rows, indexed `board[y][x]`
pub type MaskedBoard = Vec<Vec<MaskedCell>>;

/// Full externally-safe view of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub code: String,
    pub settings: GameSettings,
    pub players: Vec<Player>,
    pub host_id: PlayerId,
    pub state: GameState,
    pub board: Option<MaskedBoard>,
    pub flags_remaining: i64,
    pub elapsed_time: i64,
}
