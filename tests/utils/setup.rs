use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use coopsweeper::{ConnectionRouter, RoomRegistry, RouterHandle};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

const COLORS: [&str; 6] = ["red", "blue", "green", "orange", "purple", "teal"];

pub struct TestSetup {
    pub router: RouterHandle,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    /// Connection ids; the first one hosts the room
    pub players: Vec<String>,
    /// Code of the room every player joined, if any
    pub code: Option<String>,
    pub _router_handle: JoinHandle<()>,
    // outbound receivers kept alive for the whole test
    _outboxes: Vec<mpsc::UnboundedReceiver<String>>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    settings: Value,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            settings: json!({"width": 9, "height": 9, "mines": 10, "maxPlayers": 4}),
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie"])
    }

    pub fn with_settings(mut self, width: u16, height: u16, mines: u32, max_players: usize) -> Self {
        self.settings = json!({
            "width": width,
            "height": height,
            "mines": mines,
            "maxPlayers": max_players,
        });
        self
    }

    /// Connects every player; the first creates a room and the rest join it.
    /// Recorded frames are cleared before the setup is returned.
    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let (router, router_handle) =
            ConnectionRouter::new(RoomRegistry::new(), mock_conn_manager.clone()).spawn();

        let mut setup = TestSetup {
            router,
            mock_conn_manager,
            players: self.players.clone(),
            code: None,
            _router_handle: router_handle,
            _outboxes: Vec::new(),
        };

        for player in &self.players {
            setup.connect(player);
        }

        if let Some((host, guests)) = self.players.split_first() {
            setup
                .send(
                    host,
                    json!({"type": "create", "settings": self.settings, "player": profile(host, 0)}),
                )
                .await;
            let created = setup
                .mock_conn_manager
                .consume_message_for(host)
                .await
                .expect("host should receive created");
            let created: Value = serde_json::from_str(&created).unwrap();
            let code = created["code"].as_str().unwrap().to_string();

            for (i, guest) in guests.iter().enumerate() {
                setup
                    .send(
                        guest,
                        json!({"type": "join", "code": code, "player": profile(guest, i + 1)}),
                    )
                    .await;
            }
            setup.code = Some(code);
        }

        setup.clear_messages().await;
        setup
    }
}

/// `{name, avatar, color}` with a distinct color per seat
pub fn profile(name: &str, seat: usize) -> Value {
    json!({
        "name": name,
        "avatar": {"face": seat},
        "color": COLORS[seat % COLORS.len()],
    })
}

impl TestSetup {
    /// Registers a connection with the router
    pub fn connect(&mut self, connection_id: &str) {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.router
            .connect(connection_id.to_string(), sender)
            .unwrap();
        self._outboxes.push(receiver);
    }

    pub fn code(&self) -> &str {
        self.code.as_deref().expect("setup has no room")
    }
}
