// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, quiz, scores},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, session, scores).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, supply, sessions).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Playing is anonymous; only persisting a result needs a token.
    let session_routes = Router::new()
        .route("/", post(quiz::start_session))
        .route(
            "/{id}",
            get(quiz::get_session).delete(quiz::delete_session),
        )
        .route("/{id}/answer", post(quiz::submit_answer))
        .route("/{id}/next", post(quiz::advance_session));

    let score_routes = Router::new()
        .route("/leaderboard", get(scores::leaderboard))
        // Protected score routes
        .merge(
            Router::new()
                .route("/", post(scores::submit_score))
                .route("/me", get(scores::my_scores))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/session", session_routes)
        .nest("/api/scores", score_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
