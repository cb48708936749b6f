use serde_json::{json, Value};

use coopsweeper::RegistryStats;

use super::setup::{profile, TestSetup};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a raw text frame and wait until the router has processed it
    pub async fn send_raw(&self, connection_id: &str, text: &str) {
        self.router
            .inbound(connection_id.to_string(), text.to_string())
            .unwrap();
        self.settle().await;
    }

    /// Send a command and wait for processing
    pub async fn send(&self, connection_id: &str, command: Value) {
        self.send_raw(connection_id, &command.to_string()).await;
    }

    /// Close a connection and wait for processing
    pub async fn disconnect(&self, connection_id: &str) {
        self.router.disconnect(connection_id.to_string()).unwrap();
        self.settle().await;
    }

    /// Room counters; also acts as a barrier since the router answers in order
    pub async fn stats(&self) -> RegistryStats {
        self.router.stats().await.unwrap()
    }

    async fn settle(&self) {
        self.stats().await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_join(&self, connection_id: &str, code: &str, seat: usize) {
        self.send(
            connection_id,
            json!({"type": "join", "code": code, "player": profile(connection_id, seat)}),
        )
        .await;
    }

    pub async fn send_start(&self, player: &str) {
        self.send(player, json!({"type": "start"})).await;
    }

    pub async fn send_reveal(&self, player: &str, x: i64, y: i64) {
        self.send(player, json!({"type": "reveal", "x": x, "y": y}))
            .await;
    }

    pub async fn send_flag(&self, player: &str, x: i64, y: i64) {
        self.send(player, json!({"type": "flag", "x": x, "y": y}))
            .await;
    }

    pub async fn send_cursor(&self, player: &str, x: i64, y: i64) {
        self.send(player, json!({"type": "cursor", "x": x, "y": y}))
            .await;
    }

    pub async fn send_emote(&self, player: &str, value: &str) {
        self.send(player, json!({"type": "emote", "value": value}))
            .await;
    }

    pub async fn send_restart(&self, player: &str) {
        self.send(player, json!({"type": "restart"})).await;
    }

    pub async fn send_to_lobby(&self, player: &str) {
        self.send(player, json!({"type": "toLobby"})).await;
    }

    pub async fn send_leave(&self, player: &str) {
        self.send(player, json!({"type": "leave"})).await;
    }
}
