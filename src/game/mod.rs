// Public API
pub use board::{Board, Cell, RevealOutcome};
pub use error::GameError;
pub use session::{FlagResult, GameOver, PlayerRemoval, RevealResult, Session};
pub use types::{
    CellValue, Coord, GameSettings, GameSnapshot, GameState, MaskedBoard, MaskedCell, Player,
    PlayerId, PlayerProfile, RevealedCell,
};

// Internal modules
mod board;
mod error;
mod session;
pub mod types;
