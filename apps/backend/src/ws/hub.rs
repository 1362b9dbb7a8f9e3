use actix::prelude::*;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{GameId, PlayerId};
use crate::errors::DomainError;

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub enum HubEvent {
    /// A frame another player sent to the room, forwarded verbatim.
    Relay { from: PlayerId, text: String },
    /// A server-generated frame (game state, errors).
    Push { payload: String },
}

struct ConnectionEntry {
    conn_id: Uuid,
    game_id: Option<GameId>,
    recipient: Option<Recipient<HubEvent>>,
}

/// Live websocket connections keyed by player id.
///
/// A slot is reserved during the HTTP upgrade so a second connection for the
/// same player is refused before the handshake completes; the session actor
/// attaches its mailbox once started. Connections without a game id share
/// one default room.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<PlayerId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn reserve(&self, player_id: &str, game_id: Option<GameId>) -> Result<Uuid, DomainError> {
        match self.connections.entry(player_id.to_string()) {
            Entry::Occupied(_) => Err(DomainError::PlayerAlreadyConnected(player_id.to_string())),
            Entry::Vacant(slot) => {
                let conn_id = Uuid::new_v4();
                slot.insert(ConnectionEntry {
                    conn_id,
                    game_id,
                    recipient: None,
                });
                Ok(conn_id)
            }
        }
    }

    pub fn attach(&self, player_id: &str, conn_id: Uuid, recipient: Recipient<HubEvent>) {
        if let Some(mut entry) = self.connections.get_mut(player_id) {
            if entry.conn_id == conn_id {
                entry.recipient = Some(recipient);
            }
        }
    }

    /// Frees the slot, but only if it still belongs to `conn_id`.
    pub fn unregister(&self, player_id: &str, conn_id: Uuid) {
        self.connections.remove_if(player_id, |_, entry| entry.conn_id == conn_id);
    }

    pub fn is_connected(&self, player_id: &str) -> bool {
        self.connections.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Whether any connection, attached or only reserved, names `game_id`.
    pub fn in_game(&self, game_id: &str) -> bool {
        self.connections
            .iter()
            .any(|entry| entry.game_id.as_deref() == Some(game_id))
    }

    /// Connections whose session actor is running and can receive frames.
    pub fn attached_len(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.recipient.is_some())
            .count()
    }

    /// Forwards `text` to every other connection in the sender's room.
    /// Returns how many connections it was handed to.
    pub fn relay(&self, from: &str, game_id: Option<&str>, text: &str) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            if entry.key() == from || entry.game_id.as_deref() != game_id {
                continue;
            }
            if let Some(recipient) = &entry.recipient {
                recipient.do_send(HubEvent::Relay {
                    from: from.to_string(),
                    text: text.to_string(),
                });
                delivered += 1;
            }
        }
        debug!(from, game_id, delivered, "[WS HUB] relayed frame");
        delivered
    }

    /// Pushes `payload` to every connection attached to `game_id`.
    pub fn send_to_game(&self, game_id: &str, payload: &str) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            if entry.game_id.as_deref() != Some(game_id) {
                continue;
            }
            if let Some(recipient) = &entry.recipient {
                recipient.do_send(HubEvent::Push {
                    payload: payload.to_string(),
                });
                delivered += 1;
            }
        }
        delivered
    }
}
