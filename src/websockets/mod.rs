// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{ClientCommand, ServerEvent, MAX_EMOTE_LENGTH};
pub use router::{ConnectionRouter, RouterClosed, RouterHandle, RouterMessage};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod router;
mod socket;
