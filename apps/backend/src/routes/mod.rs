pub mod games;
pub mod realtime;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    games::configure(cfg);
    realtime::configure(cfg);
}
