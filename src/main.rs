use std::{net::SocketAddr, str::FromStr};

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use dotenv::dotenv;
use tower::ServiceBuilder;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::FmtSubscriber;

use crate::{
    common::app_state::AppState,
    config::config::CONFIG,
    game::handlers::{game_routes, quiz_play_routes},
    health::handlers::health_routes,
    mw::{auth_mw::auth_mw, rate_limit_mw::rate_limit_mw, request_mw::request_mw},
};

mod auth;
mod common;
mod config;
mod game;
mod health;
mod mw;
mod quiz;
mod system_log;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    let level = LevelFilter::from_str(&CONFIG.server.log_level).unwrap_or(LevelFilter::DEBUG);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global tracing");

    // Initialize state
    let state = AppState::from_connection_string(&CONFIG.database_url)
        .await
        .unwrap_or_else(|e| panic!("{}", e));

    // Initialize routes
    let public_routes = Router::new().nest("/health", health_routes(state.clone()));

    let protected_routes = Router::new()
        .nest("/quizzes", quiz_play_routes(state.clone()))
        .nest("/games", game_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(state.clone(), rate_limit_mw))
                .layer(from_fn(auth_mw)),
        );

    let app = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(from_fn(request_mw));

    // Initialize webserver
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", CONFIG.server.address, CONFIG.server.port))
            .await
            .unwrap_or_else(|e| panic!("Failed to bind listener: {}", e));

    info!(
        "Server listening on address: {}",
        listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".into())
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap_or_else(|e| panic!("Server error: {}", e));
}
