use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::coordinator;
use crate::entities::games;
use crate::entities::sea_orm_active_enums::GameStatus;
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::state::app_state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/games/find-or-create", web::post().to(find_or_create))
        .route("/games/{id}", web::get().to(get_game))
        .route("/games", web::get().to(list_waiting_games));
}

async fn find_or_create(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let (snapshot, created) = coordinator::find_or_create(&state, user.user_id).await?;
    let status = if created { actix_web::http::StatusCode::CREATED } else { actix_web::http::StatusCode::OK };
    Ok(HttpResponse::build(status).json(snapshot))
}

async fn get_game(state: web::Data<AppState>, path: web::Path<i64>, _user: CurrentUser) -> Result<HttpResponse, AppError> {
    let snapshot = coordinator::build_snapshot(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

async fn list_waiting_games(state: web::Data<AppState>, _user: CurrentUser) -> Result<HttpResponse, AppError> {
    let db = state.require_db()?;
    let waiting = games::Entity::find()
        .filter(games::Column::Status.eq(GameStatus::Waiting))
        .order_by_asc(games::Column::CreatedAt)
        .all(db)
        .await?;

    let mut snapshots = Vec::with_capacity(waiting.len());
    for game in waiting {
        snapshots.push(coordinator::build_snapshot(&state, game.id).await?);
    }
    Ok(HttpResponse::Ok().json(snapshots))
}
