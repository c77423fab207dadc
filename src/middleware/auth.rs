//! Bearer token extraction
//!
//! Every derived route serves anonymous and signed-in requests alike, so the
//! only extractor is `OptionalAuth`; the capability guard decides whether a
//! missing identity is a 401.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::jwt::AccessClaims;
use crate::state::HasJwt;

/// Authenticated user information extracted from JWT token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID from the token's `sub` claim
    pub user_id: Uuid,
    /// Role names from the token's `roles` claim
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn from_claims(claims: AccessClaims) -> Result<Self, AuthError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;

        Ok(Self {
            user_id,
            roles: claims.roles,
        })
    }
}

/// Authentication errors
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No Authorization header present
    MissingToken,
    /// Invalid Authorization header format
    InvalidHeader(String),
    /// Token validation failed
    InvalidToken(String),
}

/// Extract the Bearer token from the Authorization header
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::InvalidHeader("Authorization header must use Bearer scheme".to_string())
    })
}

fn authenticate<S: HasJwt>(parts: &Parts, state: &S) -> Result<AuthUser, AuthError> {
    let token = extract_bearer_token(&parts.headers)?;
    let claims = state
        .jwt_manager()
        .verify_access_token(token)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    AuthUser::from_claims(claims)
}

/// Optional authentication extractor
///
/// Returns `Some(AuthUser)` if a valid token is present, `None` otherwise.
/// An invalid token is treated like a missing one.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: HasJwt + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state) {
            Ok(user) => Ok(OptionalAuth(Some(user))),
            Err(e) => {
                if !matches!(e, AuthError::MissingToken) {
                    tracing::debug!(error = ?e, "Ignoring unusable bearer token");
                }
                Ok(OptionalAuth(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::jwt::JwtManager;
    use axum::http::Request;

    #[derive(Clone)]
    struct TestState {
        jwt: JwtManager,
    }

    impl HasJwt for TestState {
        fn jwt_manager(&self) -> &JwtManager {
            &self.jwt
        }
    }

    fn test_state() -> TestState {
        TestState {
            jwt: JwtManager::new(JwtConfig {
                secret: "test-secret-key-for-testing-purposes-only".to_string(),
                issuer: "https://folio.test".to_string(),
                access_token_ttl_secs: 3600,
            }),
        }
    }

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/posts");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_auth_user_from_claims() {
        let claims = AccessClaims {
            sub: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            roles: vec!["post-editor".to_string()],
            iss: "https://folio.test".to_string(),
            aud: "folio".to_string(),
            iat: 1000000,
            exp: 1003600,
        };

        let user = AuthUser::from_claims(claims).unwrap();
        assert_eq!(
            user.user_id,
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
        );
        assert_eq!(user.roles, vec!["post-editor"]);
    }

    #[test]
    fn test_auth_user_invalid_user_id() {
        let claims = AccessClaims {
            sub: "not-a-uuid".to_string(),
            roles: vec![],
            iss: "https://folio.test".to_string(),
            aud: "folio".to_string(),
            iat: 1000000,
            exp: 1003600,
        };

        assert!(AuthUser::from_claims(claims).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer test-token-123".parse().unwrap());

        let token = extract_bearer_token(&headers).unwrap();
        assert_eq!(token, "test-token-123");
    }

    #[test]
    fn test_extract_bearer_token_missing() {
        let headers = axum::http::HeaderMap::new();
        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_optional_auth_with_valid_token() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let token = state
            .jwt
            .create_access_token(user_id, vec!["manga-editor".to_string()])
            .unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {}", token)));

        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        let user = user.unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.roles, vec!["manga-editor"]);
    }

    #[tokio::test]
    async fn test_optional_auth_is_none_for_missing_or_invalid_token() {
        let state = test_state();

        let mut missing = parts_with(None);
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut missing, &state)
            .await
            .unwrap();
        assert!(user.is_none());

        let mut invalid = parts_with(Some("Bearer garbage"));
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut invalid, &state)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_authenticate_reports_why_a_token_is_unusable() {
        let state = test_state();
        assert!(matches!(
            authenticate(&parts_with(None), &state),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            authenticate(&parts_with(Some("Token abc")), &state),
            Err(AuthError::InvalidHeader(_))
        ));
        assert!(matches!(
            authenticate(&parts_with(Some("Bearer garbage")), &state),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
