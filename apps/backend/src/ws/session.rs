use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use rsa::RsaPublicKey;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crypto::{decode_public_key_header, PUBLIC_KEY_HEADER};
use crate::domain::{GameId, PlayerId, PublicGameState};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;
use crate::ws::hub::HubEvent;
use crate::ws::protocol::{PlayerCommand, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// The `/ws` query string: who is connecting, and to which game.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConnectQuery {
    #[serde(rename = "playerID", alias = "player_id")]
    player_id: Option<String>,
    game_id: Option<String>,
}

impl ConnectQuery {
    pub(crate) fn parse(query: &str) -> Result<Self, AppError> {
        web::Query::<ConnectQuery>::from_query(query)
            .map(web::Query::into_inner)
            .map_err(|err| AppError::bad_request(ErrorCode::BadRequest, err.to_string()))
    }

    fn from_request(req: &HttpRequest) -> Result<Self, AppError> {
        Self::parse(req.query_string())
    }

    pub(crate) fn player_id(&self) -> Result<PlayerId, AppError> {
        match self.player_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(AppError::bad_request(
                ErrorCode::MissingPlayerId,
                "Query parameter 'playerID' is required",
            )),
        }
    }

    pub(crate) fn game_id(&self) -> Option<GameId> {
        self.game_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

fn public_key_from_request(
    req: &HttpRequest,
    required: bool,
) -> Result<Option<RsaPublicKey>, AppError> {
    let Some(value) = req.headers().get(PUBLIC_KEY_HEADER) else {
        if required {
            return Err(AppError::bad_request(
                ErrorCode::MissingPublicKey,
                "Missing public key",
            ));
        }
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidPublicKeyEncoding,
            "Invalid public key encoding",
        )
    })?;
    let key = decode_public_key_header(value).map_err(AppError::from)?;
    Ok(Some(key))
}

/// `GET /ws?playerID=..[&game_id=..]`: validates the handshake, claims the
/// player's connection slot, seats them in the game, then upgrades.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let query = ConnectQuery::from_request(&req)?;
    let player_id = query.player_id()?;
    let game_id = query.game_id();
    let public_key = public_key_from_request(&req, app_state.require_public_key)?;

    let conn_id = app_state
        .connections
        .reserve(&player_id, game_id.clone())
        .map_err(AppError::from)?;

    if let Some(game_id) = &game_id {
        if let Err(err) = app_state.games.join(game_id, &player_id, public_key) {
            app_state.connections.unregister(&player_id, conn_id);
            return Err(AppError::from(err).into());
        }
    }

    let session = WsSession::new(conn_id, player_id.clone(), game_id, app_state.clone());
    ws::start(session, &req, stream).inspect_err(|_| {
        app_state.connections.unregister(&player_id, conn_id);
    })
}

pub struct WsSession {
    conn_id: Uuid,
    player_id: PlayerId,
    game_id: Option<GameId>,
    app_state: web::Data<AppState>,

    last_heartbeat: Instant,
}

impl WsSession {
    fn new(
        conn_id: Uuid,
        player_id: PlayerId,
        game_id: Option<GameId>,
        app_state: web::Data<AppState>,
    ) -> Self {
        Self {
            conn_id,
            player_id,
            game_id,
            app_state,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, err: &AppError) {
        let msg = ServerMsg::Error {
            code: err.code(),
            message: err.detail(),
        };
        Self::send_json(ctx, &msg);
    }

    /// Sends the game's state to every connection seated in it, this one
    /// included.
    fn broadcast_state(&self, game_id: &str, state: PublicGameState) {
        match serde_json::to_string(&ServerMsg::GameState { game: state }) {
            Ok(payload) => {
                self.app_state.connections.send_to_game(game_id, &payload);
            }
            Err(err) => warn!(error = %err, game_id, "[WS SESSION] failed to serialize game state"),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    player_id = %actor.player_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        info!(player_id = %self.player_id, frame = text, "[WS SESSION] message received");

        if let Some(game_id) = self.game_id.clone() {
            if let Some(command) = PlayerCommand::parse(text) {
                self.handle_command(&game_id, &command, ctx);
                return;
            }
        }

        self.app_state
            .connections
            .relay(&self.player_id, self.game_id.as_deref(), text);
    }

    fn handle_command(
        &mut self,
        game_id: &str,
        command: &PlayerCommand,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        match self.app_state.games.apply(game_id, &self.player_id, command) {
            Ok(state) => self.broadcast_state(game_id, state),
            Err(err) => {
                info!(
                    player_id = %self.player_id,
                    game_id,
                    code = %err.code(),
                    "[WS SESSION] command rejected"
                );
                Self::send_error(ctx, &err);
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            player_id = %self.player_id,
            game_id = ?self.game_id,
            "[WS SESSION] started"
        );

        let recipient = ctx.address().recipient::<HubEvent>();
        self.app_state
            .connections
            .attach(&self.player_id, self.conn_id, recipient);

        self.start_heartbeat(ctx);

        if let Some(game_id) = self.game_id.clone() {
            match self.app_state.games.public_state(&game_id) {
                Ok(state) => self.broadcast_state(&game_id, state),
                Err(err) => Self::send_error(ctx, &err),
            }
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.app_state
            .connections
            .unregister(&self.player_id, self.conn_id);
        if let Some(game_id) = &self.game_id {
            self.app_state
                .games
                .evict_abandoned_lobby(game_id, &self.app_state.connections);
        }
        info!(
            conn_id = %self.conn_id,
            player_id = %self.player_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(bytes)) => {
                self.last_heartbeat = Instant::now();
                match std::str::from_utf8(&bytes) {
                    Ok(text) => {
                        self.app_state
                            .connections
                            .relay(&self.player_id, self.game_id.as_deref(), text);
                    }
                    Err(_) => warn!(
                        player_id = %self.player_id,
                        len = bytes.len(),
                        "[WS SESSION] dropping non-UTF-8 binary frame"
                    ),
                }
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    player_id = %self.player_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<HubEvent> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: HubEvent, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            HubEvent::Relay { text, .. } => ctx.text(text),
            HubEvent::Push { payload } => ctx.text(payload),
        }
    }
}
