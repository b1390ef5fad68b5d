//! Pulls the authenticated user identity off the `Authorization` header,
//! validated the same way as the WS `?token=` query parameter (see
//! `routes::realtime`).

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::auth::jwt;
use crate::domain::state::UserId;
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: UserId,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    let state = req
        .app_data::<actix_web::web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not configured"))?;
    let header = req.headers().get(actix_web::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = jwt::require_bearer(header)?;
    let claims = jwt::verify_access_token(token, &state.security.jwt_secret)?;
    Ok(CurrentUser { user_id: claims.sub })
}
