use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::connection_manager::ConnectionManager;
use super::messages::{ClientCommand, ServerEvent, MAX_EMOTE_LENGTH};
use crate::game::{GameError, GameSettings, PlayerProfile, Session};
use crate::room::{RegistryStats, RoomRegistry};

/// Everything the router loop reacts to, processed strictly one at a time
#[derive(Debug)]
pub enum RouterMessage {
    Connected {
        connection_id: String,
        sender: mpsc::UnboundedSender<String>,
    },
    Inbound {
        connection_id: String,
        text: String,
    },
    Disconnected {
        connection_id: String,
    },
    Sweep {
        threshold: Duration,
    },
    Stats {
        reply: oneshot::Sender<RegistryStats>,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("router loop has stopped")]
pub struct RouterClosed;

/// Cloneable mailbox of the router loop
#[derive(Debug, Clone)]
pub struct RouterHandle {
    sender: mpsc::UnboundedSender<RouterMessage>,
}

impl RouterHandle {
    pub fn new(sender: mpsc::UnboundedSender<RouterMessage>) -> Self {
        Self { sender }
    }

    pub fn send(&self, message: RouterMessage) -> Result<(), RouterClosed> {
        self.sender.send(message).map_err(|_| RouterClosed)
    }

    pub fn connect(
        &self,
        connection_id: String,
        sender: mpsc::UnboundedSender<String>,
    ) -> Result<(), RouterClosed> {
        self.send(RouterMessage::Connected {
            connection_id,
            sender,
        })
    }

    pub fn inbound(&self, connection_id: String, text: String) -> Result<(), RouterClosed> {
        self.send(RouterMessage::Inbound {
            connection_id,
            text,
        })
    }

    pub fn disconnect(&self, connection_id: String) -> Result<(), RouterClosed> {
        self.send(RouterMessage::Disconnected { connection_id })
    }

    pub fn sweep(&self, threshold: Duration) -> Result<(), RouterClosed> {
        self.send(RouterMessage::Sweep { threshold })
    }

    /// Asks the loop for room counters; answered after everything queued before it
    pub async fn stats(&self) -> Result<RegistryStats, RouterClosed> {
        let (reply, response) = oneshot::channel();
        self.send(RouterMessage::Stats { reply })?;
        response.await.map_err(|_| RouterClosed)
    }
}

/// Single owner of all room state.
///
/// Connection ids double as player ids. `members` maps every connection that
/// belongs to a room to that room's code.
pub struct ConnectionRouter {
    registry: RoomRegistry,
    connections: Arc<dyn ConnectionManager>,
    members: HashMap<String, String>,
}

impl ConnectionRouter {
    pub fn new(registry: RoomRegistry, connections: Arc<dyn ConnectionManager>) -> Self {
        Self {
            registry,
            connections,
            members: HashMap::new(),
        }
    }

    /// Moves the router onto its own task and returns its mailbox
    pub fn spawn(self) -> (RouterHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(receiver));
        (RouterHandle::new(sender), task)
    }

    pub async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<RouterMessage>) {
        info!("Router loop started");
        while let Some(message) = receiver.recv().await {
            self.handle(message).await;
        }
        info!("Router loop stopped");
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn room_of(&self, connection_id: &str) -> Option<&str> {
        self.members.get(connection_id).map(String::as_str)
    }

    pub async fn handle(&mut self, message: RouterMessage) {
        match message {
            RouterMessage::Connected {
                connection_id,
                sender,
            } => {
                debug!(connection_id = %connection_id, "Connection registered");
                self.connections.add_connection(connection_id, sender).await;
            }
            RouterMessage::Inbound {
                connection_id,
                text,
            } => self.handle_inbound(&connection_id, &text).await,
            RouterMessage::Disconnected { connection_id } => {
                self.connections.remove_connection(&connection_id).await;
                if let Some(code) = self.members.get(&connection_id).cloned() {
                    self.depart(&connection_id, &code).await;
                }
                info!(connection_id = %connection_id, "Player disconnected");
            }
            RouterMessage::Sweep { threshold } => self.sweep(threshold).await,
            RouterMessage::Stats { reply } => {
                let _ = reply.send(self.registry.stats());
            }
        }
    }

    async fn handle_inbound(&mut self, connection_id: &str, text: &str) {
        let command = match ClientCommand::decode(text) {
            Ok(command) => command,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                self.send(connection_id, &ServerEvent::error("Invalid message"))
                    .await;
                return;
            }
        };

        let name = command.name();
        if let Err(e) = self.dispatch(connection_id, command).await {
            debug!(
                connection_id = %connection_id,
                command = name,
                error = %e,
                "Command rejected"
            );
            self.send(connection_id, &ServerEvent::error(e.to_string()))
                .await;
        }
    }

    async fn dispatch(
        &mut self,
        connection_id: &str,
        command: ClientCommand,
    ) -> Result<(), GameError> {
        match command {
            ClientCommand::Create { settings, player } => {
                self.create(connection_id, settings, player).await
            }
            ClientCommand::Join { code, player } => self.join(connection_id, &code, player).await,
            ClientCommand::Start => self.start(connection_id).await,
            ClientCommand::Reveal { x, y } => self.reveal(connection_id, x, y).await,
            ClientCommand::Flag { x, y } => self.flag(connection_id, x, y).await,
            ClientCommand::Cursor { x, y } => {
                let code = self.member_code(connection_id)?;
                let event = ServerEvent::Cursor {
                    player_id: connection_id.to_string(),
                    x,
                    y,
                };
                self.broadcast(&code, &event, Some(connection_id)).await;
                Ok(())
            }
            ClientCommand::Restart => self.restart(connection_id).await,
            ClientCommand::ToLobby => self.to_lobby(connection_id).await,
            ClientCommand::Emote { value } => {
                let code = self.member_code(connection_id)?;
                let event = ServerEvent::Emote {
                    player_id: connection_id.to_string(),
                    value: value.chars().take(MAX_EMOTE_LENGTH).collect(),
                };
                self.broadcast(&code, &event, None).await;
                Ok(())
            }
            ClientCommand::Leave => {
                let code = self.member_code(connection_id)?;
                self.depart(connection_id, &code).await;
                self.send(connection_id, &ServerEvent::Left).await;
                Ok(())
            }
        }
    }

    fn member_code(&self, connection_id: &str) -> Result<String, GameError> {
        self.members
            .get(connection_id)
            .cloned()
            .ok_or(GameError::NotInGame)
    }

    /// Session the connection belongs to, with its code
    fn member_session(&mut self, connection_id: &str) -> Result<(String, &mut Session), GameError> {
        let code = self.member_code(connection_id)?;
        let session = self
            .registry
            .get_game_mut(&code)
            .ok_or(GameError::GameNotFound)?;
        Ok((code, session))
    }

    async fn create(
        &mut self,
        connection_id: &str,
        settings: GameSettings,
        profile: PlayerProfile,
    ) -> Result<(), GameError> {
        if self.members.contains_key(connection_id) {
            return Err(GameError::AlreadyInGame);
        }
        settings.validate()?;

        let player = profile.into_player(connection_id.to_string());
        let session = self.registry.create_game(settings, player);
        let code = session.code().to_string();
        let game = session.snapshot();

        self.members.insert(connection_id.to_string(), code.clone());
        info!(room_code = %code, player_id = %connection_id, "Game created");

        let event = ServerEvent::Created {
            code,
            player_id: connection_id.to_string(),
            game,
        };
        self.send(connection_id, &event).await;
        Ok(())
    }

    async fn join(
        &mut self,
        connection_id: &str,
        code: &str,
        profile: PlayerProfile,
    ) -> Result<(), GameError> {
        if self.members.contains_key(connection_id) {
            return Err(GameError::AlreadyInGame);
        }

        let session = self
            .registry
            .get_game_mut(code)
            .ok_or(GameError::GameNotFound)?;
        let player = profile.into_player(connection_id.to_string());
        session.add_player(player.clone())?;
        let code = session.code().to_string();
        let game = session.snapshot();

        self.members.insert(connection_id.to_string(), code.clone());
        info!(room_code = %code, player_id = %connection_id, "Player joined game");

        let joined = ServerEvent::Joined {
            player_id: connection_id.to_string(),
            game,
        };
        self.send(connection_id, &joined).await;
        self.broadcast(&code, &ServerEvent::PlayerJoined { player }, Some(connection_id))
            .await;
        Ok(())
    }

    async fn start(&mut self, connection_id: &str) -> Result<(), GameError> {
        let (code, session) = self.member_session(connection_id)?;
        session.ensure_host(connection_id, "start")?;
        session.start_game()?;
        let game = session.snapshot();

        info!(room_code = %code, "Game started");
        self.broadcast(&code, &ServerEvent::GameStarted { game }, None)
            .await;
        Ok(())
    }

    async fn reveal(&mut self, connection_id: &str, x: i64, y: i64) -> Result<(), GameError> {
        let (code, session) = self.member_session(connection_id)?;
        let result = session.reveal(x, y, connection_id)?;
        if result.cells.is_empty() {
            return Ok(());
        }

        let game_over = result.game_over.map(|over| {
            info!(room_code = %code, won = over.won, "Game ended");
            ServerEvent::GameOver {
                won: over.won,
                board: session.masked_state(),
                triggered_by: over.triggered_by,
            }
        });

        let revealed = ServerEvent::Revealed {
            cells: result.cells,
            by: connection_id.to_string(),
        };
        self.broadcast(&code, &revealed, None).await;

        if let Some(event) = game_over {
            self.broadcast(&code, &event, None).await;
        }
        Ok(())
    }

    async fn flag(&mut self, connection_id: &str, x: i64, y: i64) -> Result<(), GameError> {
        let (code, session) = self.member_session(connection_id)?;
        let Some(result) = session.toggle_flag(x, y, connection_id)? else {
            return Ok(());
        };

        let event = ServerEvent::Flagged {
            x,
            y,
            flagged: result.flagged,
            by: connection_id.to_string(),
            flags_remaining: result.flags_remaining,
        };
        self.broadcast(&code, &event, None).await;
        Ok(())
    }

    async fn restart(&mut self, connection_id: &str) -> Result<(), GameError> {
        let (code, session) = self.member_session(connection_id)?;
        session.ensure_host(connection_id, "restart")?;
        session.reset()?;
        let game = session.snapshot();

        info!(room_code = %code, "Game restarted");
        self.broadcast(&code, &ServerEvent::GameStarted { game }, None)
            .await;
        Ok(())
    }

    async fn to_lobby(&mut self, connection_id: &str) -> Result<(), GameError> {
        let (code, session) = self.member_session(connection_id)?;
        session.ensure_host(connection_id, "return to lobby")?;
        session.return_to_lobby()?;
        let game = session.snapshot();

        info!(room_code = %code, "Game returned to lobby");
        self.broadcast(&code, &ServerEvent::ToLobby { game }, None)
            .await;
        Ok(())
    }

    /// Shared by explicit leave and disconnect
    async fn depart(&mut self, connection_id: &str, code: &str) {
        self.members.remove(connection_id);

        let Some(session) = self.registry.get_game_mut(code) else {
            return;
        };
        let removal = session.remove_player(connection_id);

        if removal.roster_empty {
            self.registry.delete_game(code);
            info!(room_code = %code, "Game deleted (empty)");
            return;
        }

        let left = ServerEvent::PlayerLeft {
            player_id: connection_id.to_string(),
        };
        self.broadcast(code, &left, None).await;

        if let Some(new_host_id) = removal.new_host {
            self.broadcast(code, &ServerEvent::HostChanged { new_host_id }, None)
                .await;
        }
    }

    async fn sweep(&mut self, threshold: Duration) {
        let removed = self.registry.sweep_idle(Utc::now(), threshold);
        if removed.is_empty() {
            debug!("No idle rooms to remove");
            return;
        }

        let notice = ServerEvent::error("Game closed due to inactivity");
        for code in &removed {
            let orphaned = self.member_ids(code, None);
            self.members.retain(|_, member_code| member_code != code);
            self.send_to_many(&orphaned, &notice).await;
        }
        info!(removed = removed.len(), "Idle rooms removed");
    }

    fn member_ids(&self, code: &str, exclude: Option<&str>) -> Vec<String> {
        self.members
            .iter()
            .filter(|(id, member_code)| {
                member_code.as_str() == code && Some(id.as_str()) != exclude
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    async fn broadcast(&self, code: &str, event: &ServerEvent, exclude: Option<&str>) {
        let recipients = self.member_ids(code, exclude);
        self.send_to_many(&recipients, event).await;
    }

    async fn send_to_many(&self, recipients: &[String], event: &ServerEvent) {
        if recipients.is_empty() {
            return;
        }
        match event.to_json() {
            Ok(json) => self.connections.send_to_players(recipients, &json).await,
            Err(e) => warn!(error = %e, "Failed to serialize event"),
        }
    }

    async fn send(&self, connection_id: &str, event: &ServerEvent) {
        match event.to_json() {
            Ok(json) => self.connections.send_to_player(connection_id, &json).await,
            Err(e) => warn!(error = %e, "Failed to serialize event"),
        }
    }
}
