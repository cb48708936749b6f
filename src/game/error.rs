use super::types::GameState;

/// Recoverable game errors; the display text is what the client is shown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Game is full")]
    RoomFull,
    #[error("Color already taken")]
    ColorTaken,
    #[error("Need at least 2 players to start")]
    InsufficientPlayers,
    #[error("Action not allowed while the game is {0}")]
    WrongState(GameState),
    #[error("Game is still in progress")]
    RoundInProgress,
    #[error("Only the host can {0}")]
    NotHost(&'static str),
    #[error("Invalid coordinates ({x}, {y})")]
    OutOfBounds { x: i64, y: i64 },
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Game not found")]
    GameNotFound,
    #[error("Already in a game")]
    AlreadyInGame,
    #[error("Not in a game")]
    NotInGame,
}
