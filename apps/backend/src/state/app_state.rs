use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::games::GameRegistry;
use crate::ws::hub::ConnectionRegistry;

/// Application state shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub connections: Arc<ConnectionRegistry>,
    pub games: Arc<GameRegistry>,
    /// Refuse websocket upgrades without an `X-Public-Key` header.
    pub require_public_key: bool,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            connections: Arc::new(ConnectionRegistry::new()),
            games: Arc::new(GameRegistry::new()),
            require_public_key: config.require_public_key,
        }
    }

    /// State with an optional public key, as the server runs by default.
    pub fn for_tests() -> Self {
        Self::new(&ServerConfig::default())
    }
}
