use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::shared::AppState;

use super::router::RouterHandle;
use super::socket::{Connection, MessageHandler};

/// Message handler for receiving WebSocket messages from the client
pub struct WebsocketReceiveHandler {
    router: RouterHandle,
}

impl WebsocketReceiveHandler {
    pub fn new(router: RouterHandle) -> Self {
        Self { router }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: &str, message: String) {
        if self
            .router
            .inbound(connection_id.to_string(), message)
            .is_err()
        {
            warn!(connection_id = %connection_id, "Router stopped, dropping message");
        }
    }
}

/// WebSocket endpoint
/// GET /ws; every upgraded socket gets a fresh connection id that doubles as its player id
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id = Uuid::new_v4().to_string();
    info!(connection_id = %connection_id, "WebSocket connection established");

    // Create the outbound channel (router -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    let router = app_state.router.clone();
    if router
        .connect(connection_id.clone(), outbound_sender)
        .is_err()
    {
        warn!(connection_id = %connection_id, "Router stopped, refusing connection");
        return;
    }

    let message_handler = Arc::new(WebsocketReceiveHandler::new(router.clone()));
    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    // Departure runs through the same queue as every other command
    if router.disconnect(connection_id.clone()).is_err() {
        warn!(connection_id = %connection_id, "Router stopped before disconnect");
    }
}
