//! WebSocket upgrade route. The bearer is presented as a `token` query
//! parameter here instead of the `Authorization` header, but is
//! validated through the exact same `auth::jwt::verify_access_token`
//! path as the REST surface.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;

use crate::auth::jwt;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos;
use crate::state::app_state::AppState;
use crate::ws::session::GameSession;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/games/{id}/ws", web::get().to(upgrade));
}

#[derive(Deserialize)]
struct WsQuery {
    token: String,
}

async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<i64>,
    query: web::Query<WsQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let claims =
        jwt::verify_access_token(&query.token, &state.security.jwt_secret).map_err(|_| AppError::UnauthorizedInvalidToken)?;

    let table_id = path.into_inner();
    let db = state.require_db()?;
    let with_players = repos::get_game(db, table_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::GameNotFound, "Game not found"))?;
    if !with_players.players.iter().any(|p| p.user_id == claims.sub) {
        return Err(AppError::NotSeated);
    }

    let session = GameSession::new(table_id, claims.sub, state.get_ref().clone());
    ws::start(session, &req, stream).map_err(|e| AppError::internal(format!("websocket upgrade failed: {e}")))
}
