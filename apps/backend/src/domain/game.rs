//! Game lifecycle: lobby, deal, turns, playing onto the pile.

use rsa::RsaPublicKey;

use super::cards_types::Card;
use super::collection::{Collection, Deck, Hand};
use crate::errors::DomainError;

pub type PlayerId = String;
pub type GameId = String;

/// Cards dealt into each of a player's three piles, and the size the hand
/// is refilled to after every play while the deck lasts.
pub const HAND_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Lobby,
    Started,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub public_key: Option<RsaPublicKey>,
    pub hand: Hand,
    pub up_facing: Hand,
    pub down_facing: Hand,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, public_key: Option<RsaPublicKey>) -> Self {
        Self {
            id: id.into(),
            public_key,
            hand: Hand::default(),
            up_facing: Hand::default(),
            down_facing: Hand::default(),
        }
    }

    fn deal(&mut self, deck: &mut Deck) {
        self.hand = Hand::deal(HAND_SIZE, deck);
        self.up_facing = Hand::deal(HAND_SIZE, deck);
        self.down_facing = Hand::deal(HAND_SIZE, deck);
    }

    /// Tops the hand back up from the deck, then falls back to the
    /// up-facing and finally the down-facing cards once both run dry.
    fn refill(&mut self, deck: &mut Deck) {
        if self.hand.size() < HAND_SIZE {
            self.hand.draw_from(HAND_SIZE - self.hand.size(), deck);
        }
        if self.hand.size() == 0 {
            let up = self.up_facing.collection.take_all();
            self.hand.collection.merge(up);
        }
        if self.hand.size() == 0 {
            let down = self.down_facing.collection.take_all();
            self.hand.collection.merge(down);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    owner: PlayerId,
    phase: GamePhase,
    players: Vec<Player>,
    pile: Collection,
    deck: Deck,
    current_turn: usize,
    round: u32,
}

impl Game {
    /// Opens a lobby with `owner` in the first seat.
    pub fn new(
        id: impl Into<GameId>,
        owner: impl Into<PlayerId>,
        owner_key: Option<RsaPublicKey>,
    ) -> Self {
        let owner = owner.into();
        Self {
            id: id.into(),
            players: vec![Player::new(owner.clone(), owner_key)],
            owner,
            phase: GamePhase::Lobby,
            pile: Collection::default(),
            deck: Deck::new(),
            current_turn: 0,
            round: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn pile(&self) -> &Collection {
        &self.pile
    }

    pub fn deck_size(&self) -> usize {
        self.deck.size()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn has_player(&self, id: &str) -> bool {
        self.player(id).is_some()
    }

    /// The player holding the turn; `None` while in the lobby.
    pub fn current_player(&self) -> Option<&str> {
        match self.phase {
            GamePhase::Lobby => None,
            GamePhase::Started => self.players.get(self.current_turn).map(|p| p.id.as_str()),
        }
    }

    pub fn join(
        &mut self,
        player_id: impl Into<PlayerId>,
        public_key: Option<RsaPublicKey>,
    ) -> Result<(), DomainError> {
        let player_id = player_id.into();
        if self.phase != GamePhase::Lobby {
            return Err(DomainError::GameNotInLobby(self.id.clone()));
        }
        if self.has_player(&player_id) {
            return Err(DomainError::PlayerAlreadyConnected(player_id));
        }
        self.players.push(Player::new(player_id, public_key));
        Ok(())
    }

    /// Replaces the key of a seated player, e.g. on reconnect.
    pub fn set_public_key(&mut self, player_id: &str, public_key: Option<RsaPublicKey>) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.public_key = public_key;
        }
    }

    /// Deals every seat and hands the turn to the owner. Owner only.
    pub fn start(&mut self, by: &str) -> Result<(), DomainError> {
        if by != self.owner {
            return Err(DomainError::NotGameOwner(by.to_string()));
        }
        if self.phase != GamePhase::Lobby {
            return Err(DomainError::GameNotInLobby(self.id.clone()));
        }

        self.deck = Deck::new();
        for player in &mut self.players {
            player.deal(&mut self.deck);
        }
        self.pile = Collection::default();
        self.current_turn = 0;
        self.round = 0;
        self.phase = GamePhase::Started;
        Ok(())
    }

    /// Plays one or more cards of the same rank from the current player's
    /// hand onto the pile. The rank, counting aces high, must be at least
    /// that of the card on top.
    pub fn play(&mut self, by: &str, cards: &[Card]) -> Result<(), DomainError> {
        let seat = self.ensure_turn(by)?;

        let Some(&first) = cards.first() else {
            return Err(DomainError::invalid("no cards to play"));
        };
        for (i, card) in cards.iter().enumerate() {
            if cards[..i].contains(card) {
                return Err(DomainError::CardAlreadyPlayed(*card));
            }
            if card.rank != first.rank {
                return Err(DomainError::invalid(format!(
                    "{card} does not match rank {}",
                    first.rank.name()
                )));
            }
            if self.players[seat].hand.collection.contains(*card).is_none() {
                return Err(DomainError::CardNotInCollection(*card));
            }
        }
        if let Some(on_field) = self.pile.top() {
            if first.rank.value(true) < on_field.rank.value(true) {
                return Err(DomainError::CardCannotBePlayed {
                    to_play: first,
                    on_field,
                });
            }
        }

        let player = &mut self.players[seat];
        for card in cards {
            if let Some(idx) = player.hand.collection.contains(*card) {
                let played = player.hand.collection.remove(idx);
                self.pile.cards.push(played);
            }
        }
        player.refill(&mut self.deck);

        self.advance_turn();
        Ok(())
    }

    /// Takes the whole pile into the current player's hand.
    pub fn pick_up(&mut self, by: &str) -> Result<(), DomainError> {
        let seat = self.ensure_turn(by)?;
        if self.pile.is_empty() {
            return Err(DomainError::invalid("pile is empty"));
        }
        let pile = self.pile.take_all();
        self.players[seat].hand.collection.merge(pile);

        self.advance_turn();
        Ok(())
    }

    fn ensure_turn(&self, by: &str) -> Result<usize, DomainError> {
        if self.phase != GamePhase::Started {
            return Err(DomainError::GameNotStarted(self.id.clone()));
        }
        match self.players.get(self.current_turn) {
            Some(player) if player.id == by => Ok(self.current_turn),
            _ => Err(DomainError::NotPlayersTurn(by.to_string())),
        }
    }

    fn advance_turn(&mut self) {
        self.current_turn = (self.current_turn + 1) % self.players.len();
        if self.current_turn == 0 {
            self.round += 1;
        }
    }
}
