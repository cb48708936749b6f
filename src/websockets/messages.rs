use serde::{Deserialize, Serialize};

use crate::game::{
    GameSettings, GameSnapshot, MaskedBoard, Player, PlayerId, PlayerProfile, RevealedCell,
};

/// Longest emote value relayed to a room, in characters
pub const MAX_EMOTE_LENGTH: usize = 32;

/// Commands a client can send; the `type` field selects the variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    Create {
        settings: GameSettings,
        player: PlayerProfile,
    },
    Join {
        code: String,
        player: PlayerProfile,
    },
    Start,
    Reveal {
        x: i64,
        y: i64,
    },
    Flag {
        x: i64,
        y: i64,
    },
    Cursor {
        x: i64,
        y: i64,
    },
    Restart,
    ToLobby,
    Emote {
        value: String,
    },
    Leave,
}

impl ClientCommand {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::Create { .. } => "create",
            ClientCommand::Join { .. } => "join",
            ClientCommand::Start => "start",
            ClientCommand::Reveal { .. } => "reveal",
            ClientCommand::Flag { .. } => "flag",
            ClientCommand::Cursor { .. } => "cursor",
            ClientCommand::Restart => "restart",
            ClientCommand::ToLobby => "toLobby",
            ClientCommand::Emote { .. } => "emote",
            ClientCommand::Leave => "leave",
        }
    }
}

/// Events the server pushes to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    Created {
        code: String,
        player_id: PlayerId,
        game: GameSnapshot,
    },
    Joined {
        player_id: PlayerId,
        game: GameSnapshot,
    },
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    HostChanged {
        new_host_id: PlayerId,
    },
    GameStarted {
        game: GameSnapshot,
    },
    Revealed {
        cells: Vec<RevealedCell>,
        by: PlayerId,
    },
    Flagged {
        x: i64,
        y: i64,
        flagged: bool,
        by: PlayerId,
        flags_remaining: i64,
    },
    Cursor {
        player_id: PlayerId,
        x: i64,
        y: i64,
    },
    GameOver {
        won: bool,
        board: Option<MaskedBoard>,
        triggered_by: PlayerId,
    },
    ToLobby {
        game: GameSnapshot,
    },
    Emote {
        player_id: PlayerId,
        value: String,
    },
    Left,
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
