use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::AuthUser;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::groups())
        .merge(routes::posts())
        .merge(routes::comments())
        .merge(routes::follow())
        .with_state(state)
}
