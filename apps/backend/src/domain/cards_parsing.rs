//! Card parsing from the textual forms players send ("Ace", "1", "Spades").

use std::str::FromStr;

use super::cards_types::{Rank, Suit};
use crate::errors::DomainError;

impl FromStr for Suit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suit::ALL
            .into_iter()
            .find(|suit| suit.name() == s)
            .ok_or_else(|| DomainError::invalid(s))
    }
}

/// Accepts the rank name ("Queen") or its face number written exactly as
/// "1" (Ace) through "13" (King); no sign, no leading zeros.
impl FromStr for Rank {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .into_iter()
            .find(|rank| rank.name() == s || rank.value(false).to_string() == s)
            .ok_or_else(|| DomainError::invalid(s))
    }
}
