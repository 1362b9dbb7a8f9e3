// Frames that are not game commands are relayed to the rest of the room.

use std::time::Duration;

use shed_backend::state::app_state::AppState;

use crate::support::websocket::{start_test_server, wait_for_connections, ws_url};
use crate::support::websocket_client::WebSocketClient;

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

#[tokio::test]
async fn text_is_relayed_to_others_but_not_echoed() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::for_tests();
    let registry = state.connections.clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;

    let mut a = WebSocketClient::connect(&ws_url(addr, "playerID=playerA")).await?;
    let mut b = WebSocketClient::connect(&ws_url(addr, "playerID=playerB")).await?;
    wait_for_connections(&registry, 2, WAIT).await?;

    a.send("Hello world!").await?;
    assert_eq!(b.recv_text_timeout(WAIT).await?, "Hello world!");

    b.send("The weather today is sunny with a chance of rain.").await?;
    assert_eq!(
        a.recv_text_timeout(WAIT).await?,
        "The weather today is sunny with a chance of rain."
    );

    a.expect_silence(QUIET).await?;
    b.expect_silence(QUIET).await?;

    a.close().await?;
    b.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn command_shaped_frames_are_relayed_without_a_game() -> Result<(), Box<dyn std::error::Error>>
{
    let state = AppState::for_tests();
    let registry = state.connections.clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;

    let mut a = WebSocketClient::connect(&ws_url(addr, "playerID=playerA")).await?;
    let mut b = WebSocketClient::connect(&ws_url(addr, "playerID=playerB")).await?;
    wait_for_connections(&registry, 2, WAIT).await?;

    let command = r#"{"player_id":"playerA","start_game":true}"#;
    a.send(command).await?;
    assert_eq!(b.recv_text_timeout(WAIT).await?, command);
    a.expect_silence(QUIET).await?;

    a.close().await?;
    b.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn rooms_are_isolated_by_game() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::for_tests();
    let registry = state.connections.clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;

    let mut lobby_a = WebSocketClient::connect(&ws_url(addr, "playerID=playerA")).await?;
    let mut lobby_b = WebSocketClient::connect(&ws_url(addr, "playerID=playerB")).await?;
    let mut table = WebSocketClient::connect(&ws_url(addr, "playerID=playerC&game_id=g1")).await?;
    wait_for_connections(&registry, 3, WAIT).await?;

    let joined = table.recv_json_timeout(WAIT).await?;
    assert_eq!(joined["type"], "game_state");

    lobby_a.send("default room only").await?;
    assert_eq!(lobby_b.recv_text_timeout(WAIT).await?, "default room only");
    table.expect_silence(QUIET).await?;

    table.send("anyone at g1?").await?;
    lobby_a.expect_silence(QUIET).await?;
    lobby_b.expect_silence(QUIET).await?;

    lobby_a.close().await?;
    lobby_b.close().await?;
    table.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn binary_frames_are_relayed_as_text_when_utf8() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::for_tests();
    let registry = state.connections.clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;

    let mut a = WebSocketClient::connect(&ws_url(addr, "playerID=playerA")).await?;
    let mut b = WebSocketClient::connect(&ws_url(addr, "playerID=playerB")).await?;
    wait_for_connections(&registry, 2, WAIT).await?;

    a.send_binary(vec![0xff, 0xfe, 0xfd]).await?;
    a.send_binary(b"plain bytes".to_vec()).await?;
    assert_eq!(b.recv_text_timeout(WAIT).await?, "plain bytes");
    b.expect_silence(QUIET).await?;

    a.close().await?;
    b.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}
