//! Error codes for the shed backend.
//!
//! Every code is SCREAMING_SNAKE_CASE and appears verbatim in HTTP
//! problem-details bodies and in websocket `error` frames. Add new codes
//! here; never pass ad-hoc strings as error codes.

use core::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Handshake
    /// No `playerID` query parameter on the upgrade request
    MissingPlayerId,
    /// `X-Public-Key` header required but absent
    MissingPublicKey,
    /// `X-Public-Key` is not valid base64
    InvalidPublicKeyEncoding,
    /// Decoded key is not a PEM `PUBLIC KEY` block
    PemDecoding,
    /// Key parsed but is not an RSA key
    NotRsaPublicKey,
    /// RSA modulus too short to encrypt a hand
    PublicKeyTooSmall,
    /// Another connection already uses this player id
    PlayerAlreadyConnected,

    // Game rules
    /// Card is not in the player's hand
    CardNotInCollection,
    /// Card listed more than once in a single play
    CardAlreadyPlayed,
    /// Card ranks below the top of the pile
    CardCannotBePlayed,
    /// Unknown game id
    GameNotFound,
    /// Game already left the lobby
    GameNotInLobby,
    /// Game has not been started by its owner
    GameNotStarted,
    /// Only the owner may do this
    NotGameOwner,
    /// Someone else holds the turn
    NotPlayersTurn,
    /// Malformed or inconsistent argument
    InvalidArgument,

    // System
    /// Hand encryption failed
    EncryptionFailed,
    /// Bad configuration at startup
    ConfigError,
    /// Generic bad request
    BadRequest,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingPlayerId => "MISSING_PLAYER_ID",
            Self::MissingPublicKey => "MISSING_PUBLIC_KEY",
            Self::InvalidPublicKeyEncoding => "INVALID_PUBLIC_KEY_ENCODING",
            Self::PemDecoding => "PEM_DECODING",
            Self::NotRsaPublicKey => "NOT_RSA_PUBLIC_KEY",
            Self::PublicKeyTooSmall => "PUBLIC_KEY_TOO_SMALL",
            Self::PlayerAlreadyConnected => "PLAYER_ALREADY_CONNECTED",

            Self::CardNotInCollection => "CARD_NOT_IN_COLLECTION",
            Self::CardAlreadyPlayed => "CARD_ALREADY_PLAYED",
            Self::CardCannotBePlayed => "CARD_CANNOT_BE_PLAYED",
            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::GameNotInLobby => "GAME_NOT_IN_LOBBY",
            Self::GameNotStarted => "GAME_NOT_STARTED",
            Self::NotGameOwner => "NOT_GAME_OWNER",
            Self::NotPlayersTurn => "NOT_PLAYERS_TURN",
            Self::InvalidArgument => "INVALID_ARGUMENT",

            Self::EncryptionFailed => "ENCRYPTION_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
