use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, middleware::identity_middleware, state::AppState};

/// Build the full HTTP router over `state`
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Voting
        .route("/content/next", get(api::content::next))
        .route("/votes", post(api::votes::submit))
        .route("/votes/session/:session_id", get(api::votes::by_session))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        // Bookmarks
        .route("/saved", get(api::saved::list))
        .route(
            "/saved/:content_id",
            post(api::saved::save).delete(api::saved::unsave),
        )
        .route("/saved/:content_id/status", get(api::saved::status))
        // Admin
        .route(
            "/admin/content",
            get(api::admin::list_content).post(api::admin::create_content),
        )
        .route(
            "/admin/content/:id",
            put(api::admin::update_content).delete(api::admin::delete_content),
        )
        .route("/admin/content/:id/unflag", post(api::admin::unflag_content))
        .route("/admin/content/:id/votes", get(api::admin::vote_history))
        .route("/admin/flagged", get(api::admin::flagged))
        .route("/admin/import", post(api::import::bulk_import))
        .route("/admin/metrics", get(api::admin::metrics))
        .route("/admin/top", get(api::admin::top))
        .route("/admin/saved", get(api::admin::all_saved))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
