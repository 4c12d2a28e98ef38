use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub exp: usize,
}

impl Claims {
    pub fn for_user(user_id: i32, expires_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: expires_at.timestamp() as usize,
        }
    }

    pub fn encode(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret.as_bytes()))
    }
}

/// The authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Accepts a bearer JWT only when a session row still holds that exact token for its user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract token from Authorization header
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthenticationError("Missing bearer token".to_string()))?
        .to_string();

    // 2. Decode and validate JWT
    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(format!("Invalid token: {}", e)))?;

    let user_id: i32 = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthenticationError("Invalid token subject".to_string()))?;

    // 3. Require a live session for this token
    let session = state.sessions.find_by_token(&token).await?;
    match session {
        Some(session) if session.user_id == user_id => {}
        _ => {
            tracing::debug!(user_id, "No session for presented token");
            return Err(AppError::AuthenticationError("Session not found".to_string()));
        }
    }

    // 4. Inject the caller into request extensions
    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}
