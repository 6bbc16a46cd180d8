pub mod accounts;
pub mod appointments;
pub mod chat;
pub mod health;
mod input;
pub mod metrics;
pub mod profile;
pub mod questions;
pub mod reports;

use axum::{
    Router,
    routing::{delete, get, post},
};
use deadpool_postgres::Pool;
use serde::Serialize;

/// `{"message": ...}` acknowledgement body
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Routes reachable without a bearer token
pub fn public_routes() -> Router<Pool> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/doctors", get(questions::doctors))
}

/// Routes that require a bearer token
pub fn protected_routes() -> Router<Pool> {
    Router::new()
        .route("/profile", get(profile::get).post(profile::update))
        .route("/profile/avatar", post(profile::upload_avatar))
        .route("/chat", post(chat::send))
        .route("/history", get(chat::history))
        .route("/upload_pdf", post(reports::upload_pdf))
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/appointments/{id}", delete(appointments::delete))
        .route(
            "/doctor-questions",
            get(questions::inbox).post(questions::ask),
        )
        .route("/my-questions", get(questions::mine))
        .route(
            "/doctor-question/{id}/messages",
            get(questions::messages).post(questions::add_message),
        )
        .route("/doctor-question/{id}/reply", post(questions::reply))
}
