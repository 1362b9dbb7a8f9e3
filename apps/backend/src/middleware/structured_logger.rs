use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{header, StatusCode};
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::middleware::request_trace::TraceId;
use crate::ws::session::ConnectQuery;

/// One `request_completed` event per HTTP request, levelled by status class.
///
/// Websocket upgrades complete (101) as soon as the handshake is done; the
/// session logs its own lifecycle afterwards. Upgrades also carry the
/// connecting player and game so a refused handshake can be traced to them.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// What the access log records about a request before it is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestSummary {
    method: String,
    path: String,
    trace_id: String,
    upgrade: bool,
    player_id: Option<String>,
    game_id: Option<String>,
}

impl RequestSummary {
    fn of(req: &ServiceRequest) -> Self {
        let upgrade = req
            .headers()
            .get(header::UPGRADE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));

        let (player_id, game_id) = if upgrade {
            ConnectQuery::parse(req.query_string())
                .map(|query| (query.player_id().ok(), query.game_id()))
                .unwrap_or_default()
        } else {
            (None, None)
        };

        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            trace_id: TraceId::of(req).unwrap_or_else(|| "unknown".to_string()),
            upgrade,
            player_id,
            game_id,
        }
    }

    fn completed(&self, status: StatusCode, duration_us: u64) {
        let status_code = status.as_u16();
        let player_id = self.player_id.as_deref();
        let game_id = self.game_id.as_deref();

        if status.is_server_error() {
            error!(http.method=%self.method, url.path=%self.path, http.status_code=%status_code, duration_us=%duration_us, trace_id=%self.trace_id, ws.upgrade=self.upgrade, player_id, game_id, message="request_completed");
        } else if status.is_client_error() {
            warn!(http.method=%self.method, url.path=%self.path, http.status_code=%status_code, duration_us=%duration_us, trace_id=%self.trace_id, ws.upgrade=self.upgrade, player_id, game_id, message="request_completed");
        } else {
            info!(http.method=%self.method, url.path=%self.path, http.status_code=%status_code, duration_us=%duration_us, trace_id=%self.trace_id, ws.upgrade=self.upgrade, player_id, game_id, message="request_completed");
        }
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let summary = RequestSummary::of(&req);

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            summary.completed(status, start.elapsed().as_micros() as u64);

            result
        })
    }
}
