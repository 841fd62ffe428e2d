//! Bearer-token authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor witnessing a valid bearer credential.
///
/// The credential is compared for exact equality against the configured
/// token; any mismatch is rejected before a working directory is created.
#[derive(Debug, Clone, Copy)]
pub struct AuthToken;

/// Exact-match token comparison. An unconfigured (empty) server token
/// matches nothing.
fn token_matches(provided: &str, configured: &str) -> bool {
    !configured.is_empty() && provided == configured
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        if !token_matches(token, &state.config.auth_token) {
            return Err(ApiError::unauthorized("Incorrect bearer token"));
        }

        Ok(AuthToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_accepted() {
        assert!(token_matches("secret123", "secret123"));
    }

    #[test]
    fn test_any_mismatch_rejected() {
        assert!(!token_matches("secret12", "secret123"));
        assert!(!token_matches("secret1234", "secret123"));
        assert!(!token_matches("SECRET123", "secret123"));
        assert!(!token_matches("", "secret123"));
    }

    #[test]
    fn test_unconfigured_token_matches_nothing() {
        assert!(!token_matches("", ""));
        assert!(!token_matches("anything", ""));
    }
}
