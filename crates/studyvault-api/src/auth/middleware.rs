use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use studyvault_core::AppError;
use subtle::ConstantTimeEq;

/// Shared secret moderators present as `Authorization: Bearer <key>`.
#[derive(Clone)]
pub struct ModeratorAuth {
    api_key: Arc<str>,
}

impl ModeratorAuth {
    pub fn new(api_key: impl Into<Arc<str>>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    fn accepts(&self, token: &str) -> bool {
        secure_compare(token, &self.api_key)
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn reject(reason: &str, request: &Request) -> Response {
    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        reason = reason,
        "Moderator authentication failed"
    );
    HttpAppError(AppError::Unauthorized(reason.to_string())).into_response()
}

pub async fn moderator_auth_middleware(
    State(auth): State<Arc<ModeratorAuth>>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match header {
        None => return reject("Missing authorization header", &request),
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(token) => token.trim(),
            None => return reject("Invalid authorization header format", &request),
        },
    };

    if !auth.accepts(token) {
        return reject("Invalid moderator API key", &request);
    }

    next.run(request).await
}
