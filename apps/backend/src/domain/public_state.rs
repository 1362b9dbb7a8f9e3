//! What every connection in a game is allowed to see.
//!
//! Hands stay private: a player's own hand is only shipped encrypted to the
//! public key they connected with. Everyone sees hand sizes, face-up cards,
//! and the pile.

use serde::Serialize;

use super::cards_types::Card;
use super::game::{Game, GamePhase, Player};
use crate::crypto::{encrypt_blocks, KeyError};

#[derive(Debug, Clone, Serialize)]
pub struct PublicPlayerData {
    pub id: String,
    pub number_cards_on_hand: usize,
    pub number_down_facing_cards: usize,
    /// Base64 RSA-OAEP blocks of the hand as a JSON card array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_hand: Option<Vec<String>>,
    pub up_facing_cards: Vec<Card>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicGameState {
    pub id: String,
    pub owner: String,
    pub phase: GamePhase,
    pub current_turn: Option<String>,
    pub round: u32,
    pub deck_size: usize,
    pub players: Vec<PublicPlayerData>,
    pub played_cards: Vec<Card>,
}

impl PublicPlayerData {
    pub fn from_player(player: &Player) -> Result<Self, KeyError> {
        let encrypted_hand = match &player.public_key {
            Some(key) => {
                let plaintext = serde_json::to_vec(player.hand.cards())?;
                Some(encrypt_blocks(key, &plaintext)?)
            }
            None => None,
        };

        Ok(Self {
            id: player.id.clone(),
            number_cards_on_hand: player.hand.size(),
            number_down_facing_cards: player.down_facing.size(),
            encrypted_hand,
            up_facing_cards: player.up_facing.cards().to_vec(),
        })
    }
}

impl Game {
    pub fn public_state(&self) -> Result<PublicGameState, KeyError> {
        let players = self
            .players()
            .iter()
            .map(PublicPlayerData::from_player)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PublicGameState {
            id: self.id().to_string(),
            owner: self.owner().to_string(),
            phase: self.phase(),
            current_turn: self.current_player().map(str::to_string),
            round: self.round(),
            deck_size: self.deck_size(),
            players,
            played_cards: self.pile().cards.clone(),
        })
    }
}
