//! Card collections: the deck, hands, and the pile.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank, Suit};

/// An unordered bag of cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub cards: Vec<Card>,
}

impl Collection {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Appends every card of `other`.
    pub fn merge(&mut self, other: Collection) {
        self.cards.extend(other.cards);
    }

    /// Removes the card at `idx`, moving the last card into its place.
    pub fn remove(&mut self, idx: usize) -> Card {
        self.cards.swap_remove(idx)
    }

    /// Index of the first card equal to `card`.
    pub fn contains(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|c| *c == card)
    }

    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn take_all(&mut self) -> Collection {
        Collection::new(std::mem::take(&mut self.cards))
    }
}

/// The draw pile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    collection: Collection,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// A full 52-card deck, suit-major: all Clubs Ace..King, then Diamonds...
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card { rank, suit });
            }
        }
        Self {
            collection: Collection::new(cards),
        }
    }

    pub fn size(&self) -> usize {
        self.collection.size()
    }

    pub fn cards(&self) -> &[Card] {
        &self.collection.cards
    }

    /// Draws `n` random cards, or every remaining card if fewer are left.
    pub fn draw(&mut self, n: usize) -> Collection {
        self.draw_with(n, &mut rand::rng())
    }

    pub fn draw_with<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Collection {
        let n = n.min(self.size());
        let mut drawn = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = rng.random_range(0..self.size());
            drawn.push(self.collection.remove(idx));
        }
        Collection::new(drawn)
    }
}

/// Cards held by a player, in any of the three piles they own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand {
    pub collection: Collection,
}

impl Hand {
    /// A fresh hand of `n` cards drawn from `deck`.
    pub fn deal(n: usize, deck: &mut Deck) -> Self {
        Self {
            collection: deck.draw(n),
        }
    }

    pub fn draw_from(&mut self, n: usize, deck: &mut Deck) {
        let drawn = deck.draw(n);
        self.collection.merge(drawn);
    }

    pub fn size(&self) -> usize {
        self.collection.size()
    }

    pub fn cards(&self) -> &[Card] {
        &self.collection.cards
    }
}
