use serde::{Deserialize, Serialize};

use crate::domain::{Card, PublicGameState};
use crate::errors::ErrorCode;

/// A game action sent by a player as a text frame.
///
/// Unknown fields make a frame fail to parse, so free-form JSON chatter is
/// relayed instead of being mistaken for a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerCommand {
    pub player_id: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub pick_up: bool,
    #[serde(default)]
    pub start_game: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    Start,
    PickUp,
    Play,
}

impl PlayerCommand {
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// `start_game` wins over `pick_up`, which wins over playing cards.
    pub fn action(&self) -> CommandAction {
        if self.start_game {
            CommandAction::Start
        } else if self.pick_up {
            CommandAction::PickUp
        } else {
            CommandAction::Play
        }
    }
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    GameState { game: PublicGameState },
    Error { code: ErrorCode, message: String },
}
