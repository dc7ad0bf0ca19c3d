pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};

use crate::infra::http::RouterState;

/// Account and post routes. Both `/api/posts` and `/api/posts/` are served for the collection.
pub fn build_api_router(state: RouterState) -> Router {
    let auth_state = state.api.clone();

    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/api/posts/me", get(handlers::list_my_posts))
        .route(
            "/api/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            middleware::api_auth,
        ))
}
