// WebSocket client utilities for testing

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// WebSocket test client
pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// Why a handshake was refused: status plus the problem-details body.
#[derive(Debug)]
pub struct Rejected {
    pub status: StatusCode,
    pub body: Value,
}

impl WebSocketClient {
    /// Connect to a WebSocket endpoint
    pub async fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Connect presenting `pem` as the player's public key.
    pub async fn connect_with_key(
        url: &str,
        pem: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut request = url.into_client_request()?;
        request
            .headers_mut()
            .insert("X-Public-Key", HeaderValue::from_str(&STANDARD.encode(pem))?);
        let (stream, _) = connect_async(request).await?;
        Ok(Self { stream })
    }

    /// Attempt a handshake that is expected to fail with an HTTP error.
    pub async fn connect_rejected(
        url: &str,
        public_key_header: Option<&str>,
    ) -> Result<Rejected, Box<dyn std::error::Error>> {
        let mut request = url.into_client_request()?;
        if let Some(value) = public_key_header {
            request
                .headers_mut()
                .insert("X-Public-Key", HeaderValue::from_str(value)?);
        }
        match connect_async(request).await {
            Ok(_) => Err("handshake unexpectedly succeeded".into()),
            Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
                let body = match response.body() {
                    Some(bytes) if !bytes.is_empty() => {
                        serde_json::from_slice(bytes).unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                };
                Ok(Rejected {
                    status: response.status(),
                    body,
                })
            }
            Err(err) => Err(Box::new(err)),
        }
    }

    /// Receive the next data frame with a timeout, skipping pings and pongs.
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Message>, Box<dyn std::error::Error>> {
        tokio::time::timeout(timeout, async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    other => return other,
                }
            }
        })
        .await
        .map_err(|_| "Timeout waiting for message")?
        .transpose()
        .map_err(|e| e.into())
    }

    /// Receive the next text frame as a string
    pub async fn recv_text_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<String, Box<dyn std::error::Error>> {
        match self.recv_timeout(timeout).await? {
            Some(Message::Text(text)) => Ok(text.as_str().to_string()),
            other => Err(format!("expected a text frame, got {other:?}").into()),
        }
    }

    /// Parse next text message as JSON
    pub async fn recv_json_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let text = self.recv_text_timeout(timeout).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Asserts nothing but control frames arrive within `window`.
    pub async fn expect_silence(
        &mut self,
        window: Duration,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self.recv_timeout(window).await {
            Err(_) => Ok(()),
            Ok(msg) => Err(format!("expected no frame, got {msg:?}").into()),
        }
    }

    /// Send a text message
    pub async fn send(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::text(text)).await?;
        Ok(())
    }

    /// Send a binary message
    pub async fn send_binary(&mut self, bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.send(Message::binary(bytes)).await?;
        Ok(())
    }

    /// Send a JSON value as a text message
    pub async fn send_json(&mut self, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
        self.send(&value.to_string()).await
    }

    /// Close the connection
    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }
}
