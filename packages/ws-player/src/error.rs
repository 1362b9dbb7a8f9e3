use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to connect: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("failed to send frame: {0}")]
    Send(#[source] tungstenite::Error),
    #[error("failed to receive frame: {0}")]
    Receive(#[source] tungstenite::Error),
    #[error("server closed the connection")]
    ConnectionClosed,
    #[error("no reply within {0:?}")]
    Timeout(std::time::Duration),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid header value: {0}")]
    Header(#[from] tungstenite::http::header::InvalidHeaderValue),
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("player task failed: {0}")]
    Task(String),
}
