// Library crate for the cooperative minesweeper relay server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod room;
pub mod server;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::ServerConfig;
pub use game::{GameError, GameSettings, GameState, Session};
pub use room::{CleanupConfig, RegistryStats, RoomRegistry};
pub use server::build_app;
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientCommand, ConnectionManager, ConnectionRouter, InMemoryConnectionManager, RouterHandle,
    RouterMessage, ServerEvent,
};
