//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all players in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let players = setup.players.iter().map(String::as_str).collect();
        Self { setup, players }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a str>) -> Self {
        Self { setup, players }
    }

    /// Assert that players received a specific event type (consumes it from the queue)
    /// and that every player saw the same payload
    pub async fn received_message_type(self, expected_type: &str) -> MessageContent {
        let mut messages: Vec<Value> = vec![];

        for player in &self.players {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(player)
                .await;
            let message = message
                .unwrap_or_else(|| panic!("{} should have received a {}", player, expected_type));

            let msg: Value = serde_json::from_str(&message).unwrap();
            assert_eq!(
                msg["type"], expected_type,
                "{} received wrong message type: {}",
                player, msg
            );
            messages.push(msg);
        }

        for (i, msg) in messages.iter().enumerate().skip(1) {
            assert_eq!(
                msg, &messages[0],
                "Player {} payload differs from player {}",
                self.players[i], self.players[0]
            );
        }

        MessageContent {
            payload: messages.swap_remove(0),
        }
    }

    /// Assert that players have no unread messages
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self.setup.mock_conn_manager.get_messages_for(player).await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages
            );
        }
    }

    /// Assert that players received a sequence of event types in order (consumes them)
    pub async fn received_message_sequence(self, expected_types: Vec<&str>) -> Vec<MessageContent> {
        let mut result_messages = vec![];

        for player in &self.players {
            for (i, expected_type) in expected_types.iter().enumerate() {
                let message = self
                    .setup
                    .mock_conn_manager
                    .consume_message_for(player)
                    .await
                    .unwrap_or_else(|| {
                        panic!(
                            "{} should have received {} messages, ran out at {}",
                            player,
                            expected_types.len(),
                            i
                        )
                    });
                let msg: Value = serde_json::from_str(&message)
                    .unwrap_or_else(|e| panic!("Failed to parse message {} for {}: {}", i, player, e));

                assert_eq!(
                    msg["type"], *expected_type,
                    "{} message {} has wrong type: {}",
                    player, i, msg
                );

                // Only collect messages from the first player to avoid duplicates
                if player == &self.players[0] {
                    result_messages.push(MessageContent { payload: msg });
                }
            }
        }

        result_messages
    }

    /// Assert each player got exactly one error with this text
    pub async fn received_error(self, expected_message: &str) {
        self.received_message_type("error")
            .await
            .with_field("message", expected_message);
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: Value,
}

impl MessageContent {
    /// Assert a top-level field equals a value
    pub fn with_field(self, field: &str, expected: impl Into<Value>) -> Self {
        assert_eq!(
            self.payload[field],
            expected.into(),
            "field {} mismatch in {}",
            field,
            self.payload
        );
        self
    }

    pub fn with_player_id(self, expected_player: &str) -> Self {
        self.with_field("playerId", expected_player)
    }

    pub fn with_by(self, expected_player: &str) -> Self {
        self.with_field("by", expected_player)
    }

    /// Assert the embedded game snapshot is in a given state
    pub fn with_game_state(self, expected_state: &str) -> Self {
        assert_eq!(self.payload["game"]["state"], expected_state);
        self
    }

    /// Assert the embedded game snapshot lists these player ids, in order
    pub fn with_roster(self, expected: Vec<&str>) -> Self {
        let ids: Vec<&str> = self.payload["game"]["players"]
            .as_array()
            .expect("game.players should be an array")
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, expected);
        self
    }

    pub fn with_host(self, expected_host: &str) -> Self {
        assert_eq!(self.payload["game"]["hostId"], expected_host);
        self
    }

    /// Coordinates of the cells in a `revealed` event, sorted
    pub fn revealed_coords(&self) -> Vec<(u64, u64)> {
        let mut coords: Vec<(u64, u64)> = self.payload["cells"]
            .as_array()
            .expect("cells should be an array")
            .iter()
            .map(|c| (c["x"].as_u64().unwrap(), c["y"].as_u64().unwrap()))
            .collect();
        coords.sort();
        coords
    }
}
