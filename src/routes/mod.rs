pub mod athletes;
pub mod health;
pub mod rankings;
pub mod sync;

use axum::http::HeaderMap;

use crate::source::concept2::AccessToken;

fn bearer_token(headers: &HeaderMap) -> Option<AccessToken> {
    let value = headers.get("authorization")?;
    let raw = value.to_str().ok()?;
    raw.strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(AccessToken::new)
}
