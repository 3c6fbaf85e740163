// Optional shared-bearer-token auth, generalized from the teacher's
// `auth_middleware` placeholder in `server/middleware.rs` into a real
// constant-time check (spec.md §1 Non-goals: no auth stronger than an
// optional shared bearer token).

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

pub struct AuthState {
    pub token: String,
}

pub async fn bearer_auth(
    State(state): State<Arc<AuthState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let presented = header.and_then(|h| h.strip_prefix("Bearer "));

    match presented {
        Some(token) if constant_time_eq(token.as_bytes(), state.token.as_bytes()) => {
            Ok(next.run(request).await)
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq_matches() {
        assert!(constant_time_eq(b"secret", b"secret"));
    }

    #[test]
    fn test_constant_time_eq_mismatched_length() {
        assert!(!constant_time_eq(b"short", b"much-longer-token"));
    }

    #[test]
    fn test_constant_time_eq_mismatched_content() {
        assert!(!constant_time_eq(b"secret1", b"secret2"));
    }
}
