use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    auth::models::{TokenSettings, verify_token},
    common::error::ServerError,
    config::config::CONFIG,
};

pub async fn auth_mw(mut req: Request<Body>, next: Next) -> Result<Response, ServerError> {
    let Some(header) = extract_header(AUTHORIZATION.as_str(), req.headers()) else {
        warn!("Missing authorization header");
        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Missing authorization header".into(),
        ));
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return Err(ServerError::Api(
            StatusCode::UNAUTHORIZED,
            "Missing auth token".into(),
        ));
    };

    let settings = TokenSettings {
        secret: &CONFIG.auth.jwt_secret,
        issuer: &CONFIG.auth.issuer,
        audience: &CONFIG.auth.audience,
    };

    let subject = verify_token(token, &settings)?;
    debug!("Request by subject: {}", subject);
    req.extensions_mut().insert(subject);

    Ok(next.run(req).await)
}

pub fn extract_header(key: &str, header_map: &HeaderMap) -> Option<String> {
    header_map
        .get(key)
        .and_then(|header| header.to_str().ok())
        .map(|s| s.to_owned())
}
