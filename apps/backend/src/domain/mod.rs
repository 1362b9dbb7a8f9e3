//! Domain layer: cards, collections and the game rules.

pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod collection;
pub mod game;
pub mod public_state;

// Re-exports for ergonomics
pub use cards_types::{Card, Rank, Suit};
pub use collection::{Collection, Deck, Hand};
pub use game::{Game, GameId, GamePhase, Player, PlayerId, HAND_SIZE};
pub use public_state::{PublicGameState, PublicPlayerData};
