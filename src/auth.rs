use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use pc_inventory::config::PolicyRule;
use pc_inventory::models::User;
use crate::state::AppState;

// JWT 载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller, attached to the request by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingHeader,
    #[error("Malformed authorization header")]
    MalformedHeader,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Role '{role}' cannot '{method}' on '{path}'")]
    Forbidden {
        role: String,
        method: String,
        path: String,
    },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Forbidden { .. } => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "Insufficient permissions",
                    "details": self.to_string()
                })),
            )
                .into_response(),
            _ => (StatusCode::UNAUTHORIZED, Json(json!({"error": self.to_string()}))).into_response(),
        }
    }
}

/// 签发令牌
pub fn issue_token(user: &User, secret: &str, ttl_minutes: i64) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        iat: now,
        exp: now + ttl_minutes * 60,
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// 校验令牌
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken,
        })
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme == "Bearer" && !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Compiled role policy / 角色权限策略
#[derive(Debug, Clone)]
pub struct Policy {
    rules: Vec<PolicyRule>,
}

impl Policy {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    pub fn allows(&self, role: &str, path: &str, method: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.role == role
                && path_matches(&rule.path, path)
                && (rule.method == "*" || rule.method.eq_ignore_ascii_case(method))
        })
    }
}

fn path_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => pattern == path,
    }
}

/// Bearer token + role policy middleware for protected routes.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = decode_token(bearer_token(request.headers())?, &state.config.auth.jwt_secret)?;

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().as_str().to_string();

    if !state.policy.allows(&claims.role, &route, &method) {
        tracing::debug!("Denied {} {} for {} ({})", method, route, claims.email, claims.role);
        return Err(AuthError::Forbidden {
            role: claims.role,
            method,
            path: request.uri().path().to_string(),
        });
    }

    request.extensions_mut().insert(CurrentUser {
        email: claims.email,
        role: claims.role,
    });
    Ok(next.run(request).await)
}
