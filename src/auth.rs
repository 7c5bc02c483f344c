use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use pensum_shared::Identity;
use serde::{Deserialize, Serialize};

use crate::{config::IdentityConfig, error::AppError, routes::AppState};

pub const AUTH_COOKIE_NAME: &str = "auth_token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iss: String,
    pub aud: String,
    pub exp: u64,
}

/// Signs a token the way the identity provider does. Used by tests and local tooling.
pub fn generate_token(
    config: &IdentityConfig,
    sub: impl Into<String>,
    email: impl Into<String>,
    lifetime_seconds: u64,
) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let claims = Claims {
        sub: sub.into(),
        email: email.into(),
        iss: config.issuer.to_owned(),
        aud: config.audience.to_owned(),
        exp: now + lifetime_seconds,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn validate_token(
    config: &IdentityConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.to_owned()]);
    validation.set_audience(&[config.audience.to_owned()]);
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Caller verified by the identity provider, from `Authorization: Bearer` or the
/// `auth_token` cookie.
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_owned());

        let token = match bearer {
            Some(token) => Some(token),
            None => {
                let jar = CookieJar::from_headers(&parts.headers);
                jar.get(AUTH_COOKIE_NAME)
                    .map(|cookie| cookie.value().to_owned())
            }
        };

        let Some(token) = token else {
            return Err(pensum_shared::Error::Unauthenticated.into());
        };

        let claims = validate_token(&state.config.identity, &token).map_err(|err| {
            tracing::warn!(error = %err, "rejected identity token");
            AppError::from(pensum_shared::Error::Unauthenticated)
        })?;

        if claims.sub.trim().is_empty() {
            return Err(pensum_shared::Error::Unauthenticated.into());
        }

        Ok(AuthUser(Identity::new(claims.sub, claims.email)))
    }
}
