use axum::{routing::delete, routing::get, routing::patch, routing::post, routing::put, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn groups() -> Router<AppState> {
    Router::new()
        .route("/groups", get(handlers::list_groups))
        .route("/groups/:id", get(handlers::get_group))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::list_posts))
        .route("/posts", post(handlers::create_post))
        .route("/posts/:id", get(handlers::get_post))
        .route("/posts/:id", put(handlers::update_post))
        .route("/posts/:id", patch(handlers::update_post))
        .route("/posts/:id", delete(handlers::delete_post))
}

pub fn comments() -> Router<AppState> {
    Router::new()
        .route("/posts/:post_id/comments", get(handlers::list_comments))
        .route("/posts/:post_id/comments", post(handlers::create_comment))
        .route("/posts/:post_id/comments/:id", get(handlers::get_comment))
        .route("/posts/:post_id/comments/:id", put(handlers::update_comment))
        .route(
            "/posts/:post_id/comments/:id",
            patch(handlers::update_comment),
        )
        .route(
            "/posts/:post_id/comments/:id",
            delete(handlers::delete_comment),
        )
}

pub fn follow() -> Router<AppState> {
    Router::new()
        .route("/follow", get(handlers::list_follows))
        .route("/follow", post(handlers::create_follow))
}
