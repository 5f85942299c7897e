//! Authentication middleware
//!
//! Resolves the caller's identity from a bearer JWT issued by the external
//! authentication provider and makes it available to handlers.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication middleware that validates JWT tokens against the
/// configured secret and stores the resolved [`AuthUser`] in request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let auth_user = match resolve_user(token, &state.config.jwt.secret) {
        Ok(user) => user,
        Err(msg) => {
            tracing::debug!(reason = %msg, "rejected bearer token");
            return unauthorized_response(&msg);
        }
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Decode and validate a JWT, returning the identity it carries
pub fn resolve_user(token: &str, secret: &str) -> Result<AuthUser, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token".to_string())?;

    Ok(AuthUser {
        user_id,
        name: claims.name,
    })
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    unauthorized(message).into_response()
}

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized {
        message: message.to_string(),
        message_es: "No autorizado".to_string(),
    }
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(sub: &str, secret: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            name: Some("Operador".to_string()),
            exp: now + exp_offset,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_resolves_user() {
        let id = Uuid::new_v4();
        let user = resolve_user(&token(&id.to_string(), "s3cret", 3600), "s3cret").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.name.as_deref(), Some("Operador"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let id = Uuid::new_v4();
        assert!(resolve_user(&token(&id.to_string(), "s3cret", 3600), "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let id = Uuid::new_v4();
        assert!(resolve_user(&token(&id.to_string(), "s3cret", -3600), "s3cret").is_err());
    }

    #[test]
    fn test_missing_identity_is_401() {
        let response = unauthorized_response("Missing or invalid Authorization header");
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let err = resolve_user(&token("admin", "s3cret", 3600), "s3cret").unwrap_err();
        assert_eq!(err, "Invalid user ID in token");
    }
}
