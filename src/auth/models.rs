use core::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::ServerError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user behind the current request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SubjectId(pub Uuid);

impl SubjectId {
    pub fn user_id(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings an access token is checked against.
#[derive(Debug, Clone)]
pub struct TokenSettings<'a> {
    pub secret: &'a str,
    pub issuer: &'a str,
    pub audience: &'a str,
}

pub fn verify_token(token: &str, settings: &TokenSettings<'_>) -> Result<SubjectId, ServerError> {
    let key = DecodingKey::from_secret(settings.secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.issuer]);
    validation.set_audience(&[settings.audience]);

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| ServerError::JwtVerification(format!("Failed to validate token: {}", e)))?;

    let user_id = token_data
        .claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| ServerError::JwtVerification("Subject is not a valid user id".into()))?;

    Ok(SubjectId(user_id))
}
