pub mod auth;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod state;
pub mod store;
pub mod trace_ctx;
pub mod ws;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use crate::middleware::cors::cors_middleware;
use crate::middleware::request_trace::RequestTrace;
use crate::middleware::structured_logger::StructuredLogger;
use crate::state::app_state::AppState;

pub fn build_cors() -> Cors {
    cors_middleware()
}

/// Builds and runs the HTTP server. Split out from `main` so tests that
/// need a real bound socket can call it too.
pub async fn run(state: AppState, bind_host: &str, bind_port: u16) -> std::io::Result<()> {
    let data = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(RequestTrace)
            .wrap(StructuredLogger)
            .wrap(build_cors())
            .configure(routes::configure)
    })
    .bind((bind_host, bind_port))?
    .run()
    .await
}

pub fn default_session_store() -> Arc<dyn store::SessionStore> {
    Arc::new(store::memory_store::InMemorySessionStore::new())
}
