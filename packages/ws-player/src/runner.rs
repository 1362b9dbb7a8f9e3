//! Driving scripted players against a server.

use std::io::Write;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::future::join_all;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::error::ClientError;
use crate::script::PlayerScript;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Frames one player pushed and pulled before the script ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerReport {
    pub sent: u32,
    pub received: u32,
}

#[derive(Debug)]
pub struct PlayerOutcome {
    pub player_id: String,
    pub result: Result<PlayerReport, ClientError>,
}

/// Opens the player's connection, presenting its public key if it has one.
pub async fn connect(base_url: &str, script: &PlayerScript) -> Result<WsStream, ClientError> {
    let url = script.connect_url(base_url)?;
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(ClientError::Connect)?;
    if let Some(pem) = &script.public_key_pem {
        let value = HeaderValue::from_str(&STANDARD.encode(pem))?;
        request.headers_mut().insert("X-Public-Key", value);
    }

    let (stream, _) = connect_async(request)
        .await
        .map_err(ClientError::Connect)?;
    info!(player_id = %script.player_id, url = %url, "connected");
    Ok(stream)
}

/// Connects and plays the whole script, printing each reply to `sink`.
pub async fn run_player<W: Write>(
    base_url: &str,
    script: &PlayerScript,
    sink: &mut W,
) -> Result<PlayerReport, ClientError> {
    let stream = connect(base_url, script).await?;
    play(stream, script, sink).await
}

/// Sends the greeting, then `iterations` rounds of send, await one reply,
/// print it, sleep.
pub async fn play<W: Write>(
    mut stream: WsStream,
    script: &PlayerScript,
    sink: &mut W,
) -> Result<PlayerReport, ClientError> {
    let mut report = PlayerReport::default();

    send_text(&mut stream, &script.greeting).await?;
    report.sent += 1;

    for step in 0..script.iterations {
        let message = script.message()?;
        send_text(&mut stream, &message).await?;
        report.sent += 1;

        let reply = recv_text(&mut stream, script.recv_timeout).await?;
        report.received += 1;
        writeln!(sink, "{} received: {}", script.label, reply)?;
        sink.flush()?;
        debug!(player_id = %script.player_id, step, "reply received");

        tokio::time::sleep(script.interval).await;
    }

    if let Err(err) = stream.close(None).await {
        debug!(player_id = %script.player_id, error = %err, "close failed");
    }
    Ok(report)
}

async fn send_text(stream: &mut WsStream, text: &str) -> Result<(), ClientError> {
    stream
        .send(Message::text(text))
        .await
        .map_err(ClientError::Send)
}

/// Waits for the next data frame; ping and pong are answered by the
/// transport and never count as a reply.
async fn recv_text(
    stream: &mut WsStream,
    timeout: Option<Duration>,
) -> Result<String, ClientError> {
    let next = async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_string()),
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(String::from_utf8_lossy(&bytes).into_owned())
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(ClientError::ConnectionClosed),
                Some(Err(err)) => return Err(ClientError::Receive(err)),
            }
        }
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, next)
            .await
            .map_err(|_| ClientError::Timeout(limit))?,
        None => next.await,
    }
}

/// Runs every script as its own task and waits for all of them.
///
/// All players connect before any of them sends, so early frames are not
/// relayed to a room the others have not joined yet. A failing player
/// only ends its own task; outcomes come back in input order.
pub async fn run_all<F, W>(
    base_url: &str,
    scripts: Vec<PlayerScript>,
    make_sink: F,
) -> Vec<PlayerOutcome>
where
    F: Fn() -> W,
    W: Write + Send + 'static,
{
    let connections = join_all(scripts.iter().map(|script| connect(base_url, script))).await;

    let mut tasks = Vec::with_capacity(scripts.len());
    for (script, connection) in scripts.into_iter().zip(connections) {
        let mut sink = make_sink();
        let player_id = script.player_id.clone();
        let handle = tokio::spawn(async move {
            match connection {
                Ok(stream) => play(stream, &script, &mut sink).await,
                Err(err) => Err(err),
            }
        });
        tasks.push((player_id, handle));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (player_id, handle) in tasks {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(ClientError::Task(err.to_string())),
        };
        outcomes.push(PlayerOutcome { player_id, result });
    }
    outcomes
}
