// Game commands over the socket: state broadcasts and sender-only errors.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Oaep, RsaPrivateKey};
use serde_json::{json, Value};
use sha2::Sha256;
use shed_backend::domain::Card;
use shed_backend::state::app_state::AppState;

use crate::support::websocket::{
    start_test_server, wait_for_connections, wait_for_games, ws_url, RSA_PRIVATE_PEM,
    RSA_PUBLIC_PEM,
};
use crate::support::websocket_client::WebSocketClient;

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

fn decrypt_hand(player: &Value) -> Result<Vec<Card>, Box<dyn std::error::Error>> {
    let private = RsaPrivateKey::from_pkcs8_pem(RSA_PRIVATE_PEM)?;
    let blocks = player["encrypted_hand"]
        .as_array()
        .ok_or("encrypted_hand missing")?;

    let mut plaintext = Vec::new();
    for block in blocks {
        let ciphertext = STANDARD.decode(block.as_str().ok_or("block is not a string")?)?;
        plaintext.extend(private.decrypt(Oaep::new::<Sha256>(), &ciphertext)?);
    }
    Ok(serde_json::from_slice(&plaintext)?)
}

async fn expect_error(
    client: &mut WebSocketClient,
    code: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = client.recv_json_timeout(WAIT).await?;
    assert_eq!(frame["type"], "error", "unexpected frame {frame}");
    assert_eq!(frame["code"], code);
    assert!(frame["message"].as_str().is_some_and(|m| !m.is_empty()));
    Ok(())
}

#[tokio::test]
async fn full_turn_cycle_over_websocket() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::for_tests();
    let registry = state.connections.clone();
    let games = state.games.clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;

    // Owner joins with a key, second player without.
    let mut a = WebSocketClient::connect_with_key(
        &ws_url(addr, "playerID=playerA&game_id=g1"),
        RSA_PUBLIC_PEM,
    )
    .await?;
    let lobby = a.recv_json_timeout(WAIT).await?;
    assert_eq!(lobby["type"], "game_state");
    assert_eq!(lobby["game"]["phase"], "lobby");
    assert_eq!(lobby["game"]["owner"], "playerA");
    wait_for_connections(&registry, 1, WAIT).await?;

    let mut b = WebSocketClient::connect(&ws_url(addr, "playerID=playerB&game_id=g1")).await?;
    for client in [&mut a, &mut b] {
        let joined = client.recv_json_timeout(WAIT).await?;
        assert_eq!(joined["game"]["players"].as_array().map(Vec::len), Some(2));
    }
    assert_eq!(games.len(), 1);

    // Only the owner may start; the error goes to the sender alone.
    b.send_json(&json!({"player_id": "playerB", "start_game": true}))
        .await?;
    expect_error(&mut b, "NOT_GAME_OWNER").await?;
    a.expect_silence(QUIET).await?;

    a.send_json(&json!({"player_id": "playerA", "start_game": true}))
        .await?;
    let mut started = Value::Null;
    for client in [&mut a, &mut b] {
        started = client.recv_json_timeout(WAIT).await?;
        assert_eq!(started["type"], "game_state");
        assert_eq!(started["game"]["phase"], "started");
        assert_eq!(started["game"]["current_turn"], "playerA");
    }
    let players = &started["game"]["players"];
    assert_eq!(players[0]["number_cards_on_hand"], 3);
    assert_eq!(players[0]["number_down_facing_cards"], 3);
    assert_eq!(players[1]["up_facing_cards"].as_array().map(Vec::len), Some(3));
    assert!(players[1].get("encrypted_hand").is_none());

    let hand = decrypt_hand(&players[0])?;
    assert_eq!(hand.len(), 3);

    // Rule violations.
    b.send_json(&json!({"player_id": "playerB", "pick_up": true}))
        .await?;
    expect_error(&mut b, "NOT_PLAYERS_TURN").await?;

    a.send_json(&json!({"player_id": "playerB", "pick_up": true}))
        .await?;
    expect_error(&mut a, "INVALID_ARGUMENT").await?;

    a.send_json(&json!({"player_id": "playerA", "pick_up": true}))
        .await?;
    expect_error(&mut a, "INVALID_ARGUMENT").await?;

    // A legal play onto the empty pile.
    let card = hand[0];
    a.send_json(&json!({"player_id": "playerA", "cards": [card]}))
        .await?;
    for client in [&mut a, &mut b] {
        let after = client.recv_json_timeout(WAIT).await?;
        assert_eq!(after["game"]["played_cards"], json!([card]));
        assert_eq!(after["game"]["current_turn"], "playerB");
        assert_eq!(after["game"]["players"][0]["number_cards_on_hand"], 3);
    }

    // Chatter still reaches the table.
    a.send("good luck").await?;
    assert_eq!(b.recv_text_timeout(WAIT).await?, "good luck");

    a.close().await?;
    b.close().await?;
    wait_for_connections(&registry, 0, WAIT).await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn seated_player_can_reconnect_to_a_started_game() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::for_tests();
    let registry = state.connections.clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;
    let url_a = ws_url(addr, "playerID=playerA&game_id=g2");

    let mut a = WebSocketClient::connect(&url_a).await?;
    a.recv_json_timeout(WAIT).await?;
    wait_for_connections(&registry, 1, WAIT).await?;
    let mut b = WebSocketClient::connect(&ws_url(addr, "playerID=playerB&game_id=g2")).await?;
    a.recv_json_timeout(WAIT).await?;
    b.recv_json_timeout(WAIT).await?;

    a.send_json(&json!({"player_id": "playerA", "start_game": true}))
        .await?;
    a.recv_json_timeout(WAIT).await?;
    b.recv_json_timeout(WAIT).await?;

    a.close().await?;
    wait_for_connections(&registry, 1, WAIT).await?;

    let mut again = WebSocketClient::connect(&url_a).await?;
    let state = again.recv_json_timeout(WAIT).await?;
    assert_eq!(state["game"]["phase"], "started");
    assert_eq!(state["game"]["players"].as_array().map(Vec::len), Some(2));
    assert_eq!(b.recv_json_timeout(WAIT).await?, state);

    again.close().await?;
    b.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn abandoned_lobby_is_dropped() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::for_tests();
    let registry = state.connections.clone();
    let games = state.games.clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;
    let url = ws_url(addr, "playerID=playerA&game_id=g3");

    let mut first = WebSocketClient::connect(&url).await?;
    first.recv_json_timeout(WAIT).await?;
    assert_eq!(games.len(), 1);
    first.close().await?;
    wait_for_connections(&registry, 0, WAIT).await?;
    wait_for_games(&games, 0, WAIT).await?;

    // Coming back opens a fresh lobby.
    let mut second = WebSocketClient::connect(&url).await?;
    let state = second.recv_json_timeout(WAIT).await?;
    assert_eq!(state["game"]["phase"], "lobby");
    assert_eq!(state["game"]["owner"], "playerA");
    second.close().await?;

    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}
