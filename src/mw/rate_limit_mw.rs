use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    common::{app_state::AppState, error::ServerError},
    mw::auth_mw::extract_header,
};

static FORWARDED_FOR: &str = "X-Forwarded-For";

pub async fn rate_limit_mw(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let key = client_key(&req);

    if !state.get_rate_limiter().allow(&key) {
        warn!("Rate limit exceeded for {}", key);
        return Err(ServerError::Api(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests".into(),
        ));
    }

    Ok(next.run(req).await)
}

fn client_key(req: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    extract_header(FORWARDED_FOR, req.headers())
        .and_then(|value| value.split(',').next().map(|ip| ip.trim().to_owned()))
        .unwrap_or_else(|| "unknown".into())
}
