use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rsa::RsaPublicKey;
use tracing::info;

use crate::domain::{Game, GameId, GamePhase, PublicGameState};
use crate::error::AppError;
use crate::errors::DomainError;
use crate::ws::hub::ConnectionRegistry;
use crate::ws::protocol::{CommandAction, PlayerCommand};

/// In-memory games keyed by id. Nothing survives a restart.
///
/// A lobby is dropped once its last connection leaves. Started games are
/// kept so their seated players can reconnect.
#[derive(Default)]
pub struct GameRegistry {
    games: DashMap<GameId, Game>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Seats `player_id` in `game_id`, opening the game with them as owner
    /// if it does not exist yet. A player already seated keeps their seat
    /// and only has their key refreshed.
    pub fn join(
        &self,
        game_id: &str,
        player_id: &str,
        public_key: Option<RsaPublicKey>,
    ) -> Result<(), DomainError> {
        match self.games.entry(game_id.to_string()) {
            Entry::Vacant(slot) => {
                info!(game_id, owner = player_id, "[GAMES] game created");
                slot.insert(Game::new(game_id, player_id, public_key));
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                let game = slot.get_mut();
                if game.has_player(player_id) {
                    game.set_public_key(player_id, public_key);
                    return Ok(());
                }
                game.join(player_id, public_key)?;
                info!(game_id, player_id, "[GAMES] player joined");
                Ok(())
            }
        }
    }

    /// Removes `game_id` if it is still a lobby and nobody is connected to
    /// it. A player joining concurrently either keeps the lobby alive
    /// (already reserved) or opens a fresh one.
    pub fn evict_abandoned_lobby(&self, game_id: &str, connections: &ConnectionRegistry) -> bool {
        let evicted = self
            .games
            .remove_if(game_id, |_, game| {
                game.phase() == GamePhase::Lobby && !connections.in_game(game_id)
            })
            .is_some();
        if evicted {
            info!(game_id, "[GAMES] abandoned lobby removed");
        }
        evicted
    }

    pub fn public_state(&self, game_id: &str) -> Result<PublicGameState, AppError> {
        let game = self
            .games
            .get(game_id)
            .ok_or_else(|| DomainError::GameNotFound(game_id.to_string()))?;
        Ok(game.public_state()?)
    }

    /// Applies a command sent by `sender` and returns the resulting state.
    /// A failed command leaves the game untouched.
    pub fn apply(
        &self,
        game_id: &str,
        sender: &str,
        command: &PlayerCommand,
    ) -> Result<PublicGameState, AppError> {
        if command.player_id != sender {
            return Err(DomainError::invalid(format!(
                "player_id {} does not match connection {sender}",
                command.player_id
            ))
            .into());
        }

        let mut game = self
            .games
            .get_mut(game_id)
            .ok_or_else(|| DomainError::GameNotFound(game_id.to_string()))?;

        // Work on a copy; it replaces the stored game only once its state
        // can be shown to every player.
        let mut next = game.clone();
        match command.action() {
            CommandAction::Start => next.start(sender)?,
            CommandAction::PickUp => next.pick_up(sender)?,
            CommandAction::Play => next.play(sender, &command.cards)?,
        }
        let state = next.public_state()?;
        *game = next;
        Ok(state)
    }
}
