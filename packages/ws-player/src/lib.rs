//! Scripted websocket players for exercising a shed server.
//!
//! Each player opens one connection, greets, then loops a fixed number of
//! times: send a frame, wait for one frame back, print it, sleep. Players
//! run as independent tasks and share nothing.

pub mod error;
pub mod runner;
pub mod script;

pub use error::ClientError;
pub use runner::{connect, play, run_all, run_player, PlayerOutcome, PlayerReport};
pub use script::{Chatter, MessageKind, PlayerScript, DEFAULT_URL, GREETING};

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::test_logging::init();
}
