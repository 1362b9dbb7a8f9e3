//! What a scripted player sends, and to where.

use std::time::Duration;

use clap::ValueEnum;
use shed_backend::domain::{Card, Rank, Suit};
use shed_backend::ws::protocol::PlayerCommand;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_URL: &str = "ws://localhost:8080/ws";
pub const GREETING: &str = "Hello world!";
pub const DEFAULT_ITERATIONS: u32 = 10;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
pub const FIXED_SENTENCE: &str = "I don't care what time it is!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageKind {
    /// Plain text frames.
    Text,
    /// JSON command payloads.
    Command,
}

/// The body of a text-mode frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chatter {
    /// "The clock is <local time>".
    Clock,
    Fixed(String),
}

#[derive(Debug, Clone)]
pub struct PlayerScript {
    pub player_id: String,
    /// Prefix for printed replies, e.g. "Player A".
    pub label: String,
    pub game_id: Option<String>,
    pub greeting: String,
    pub kind: MessageKind,
    pub chatter: Chatter,
    /// Cards named in every command payload.
    pub cards: Vec<Card>,
    pub iterations: u32,
    pub interval: Duration,
    /// Give up on a silent server after this long; wait forever when unset.
    pub recv_timeout: Option<Duration>,
    /// PEM sent base64 encoded as `X-Public-Key`.
    pub public_key_pem: Option<String>,
}

impl PlayerScript {
    pub fn new(player_id: impl Into<String>) -> Self {
        let player_id = player_id.into();
        Self {
            label: label_for(&player_id),
            player_id,
            game_id: None,
            greeting: GREETING.to_string(),
            kind: MessageKind::Text,
            chatter: Chatter::Fixed(FIXED_SENTENCE.to_string()),
            cards: vec![Card::new(Rank::Ace, Suit::Spades)],
            iterations: DEFAULT_ITERATIONS,
            interval: DEFAULT_INTERVAL,
            recv_timeout: None,
            public_key_pem: None,
        }
    }

    /// `base?playerID=<id>[&game_id=<id>]`, keeping any query already on `base`.
    pub fn connect_url(&self, base: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(base)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("playerID", &self.player_id);
            if let Some(game_id) = &self.game_id {
                query.append_pair("game_id", game_id);
            }
        }
        Ok(url)
    }

    /// The frame sent on each loop step.
    pub fn message(&self) -> Result<String, ClientError> {
        match self.kind {
            MessageKind::Text => Ok(match &self.chatter {
                Chatter::Clock => format!("The clock is {}", now()),
                Chatter::Fixed(sentence) => sentence.clone(),
            }),
            MessageKind::Command => Ok(serde_json::to_string(&self.command())?),
        }
    }

    pub fn command(&self) -> PlayerCommand {
        PlayerCommand {
            player_id: self.player_id.clone(),
            cards: self.cards.clone(),
            pick_up: false,
            start_game: false,
        }
    }
}

/// "playerA" -> "Player A"; ids without that shape are used as is.
pub fn label_for(player_id: &str) -> String {
    match player_id.strip_prefix("player") {
        Some(suffix) if !suffix.is_empty() => format!("Player {suffix}"),
        _ => player_id.to_string(),
    }
}

fn now() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&Rfc3339).unwrap_or_else(|_| now.to_string())
}
