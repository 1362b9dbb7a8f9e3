//! Domain-level error type for card and game rule violations.
//!
//! This error type is HTTP-agnostic. The websocket session reports it to
//! the offending player as an `error` frame; HTTP handlers convert it with
//! `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::error_code::ErrorCode;
use crate::domain::Card;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    CardNotInCollection(Card),
    CardAlreadyPlayed(Card),
    CardCannotBePlayed { to_play: Card, on_field: Card },
    GameNotFound(String),
    GameNotInLobby(String),
    GameNotStarted(String),
    NotGameOwner(String),
    NotPlayersTurn(String),
    PlayerAlreadyConnected(String),
    InvalidArgument(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::CardNotInCollection(card) => {
                write!(f, "card not found in collection: {card}")
            }
            DomainError::CardAlreadyPlayed(card) => {
                write!(f, "card has already been played: {card}")
            }
            DomainError::CardCannotBePlayed { to_play, on_field } => {
                write!(f, "cannot play {to_play} on top of card {on_field}")
            }
            DomainError::GameNotFound(id) => write!(f, "game ({id}) not found"),
            DomainError::GameNotInLobby(id) => write!(f, "game ({id}) not in lobby"),
            DomainError::GameNotStarted(id) => write!(f, "game ({id}) not started"),
            DomainError::NotGameOwner(player) => {
                write!(f, "player {player} is not the game owner")
            }
            DomainError::NotPlayersTurn(player) => write!(f, "not player's turn: {player}"),
            DomainError::PlayerAlreadyConnected(player) => {
                write!(f, "player {player} is already connected")
            }
            DomainError::InvalidArgument(arg) => {
                write!(f, "following argument is not valid: {arg}")
            }
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn invalid(arg: impl Into<String>) -> Self {
        Self::InvalidArgument(arg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::CardNotInCollection(_) => ErrorCode::CardNotInCollection,
            DomainError::CardAlreadyPlayed(_) => ErrorCode::CardAlreadyPlayed,
            DomainError::CardCannotBePlayed { .. } => ErrorCode::CardCannotBePlayed,
            DomainError::GameNotFound(_) => ErrorCode::GameNotFound,
            DomainError::GameNotInLobby(_) => ErrorCode::GameNotInLobby,
            DomainError::GameNotStarted(_) => ErrorCode::GameNotStarted,
            DomainError::NotGameOwner(_) => ErrorCode::NotGameOwner,
            DomainError::NotPlayersTurn(_) => ErrorCode::NotPlayersTurn,
            DomainError::PlayerAlreadyConnected(_) => ErrorCode::PlayerAlreadyConnected,
            DomainError::InvalidArgument(_) => ErrorCode::InvalidArgument,
        }
    }
}
