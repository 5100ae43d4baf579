//! Session boundary
//!
//! Maps opaque session tokens to authenticated catalog connections. Session
//! policy (expiry, persistence, identity) lives outside this service; this
//! is only the token-to-connection boundary the report handlers consume.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use partline_utils::{PartlineError, PartlineResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::CatalogSource;

/// An authenticated catalog connection held on behalf of one login.
pub struct Session {
    pub username: String,
    pub user_id: Option<String>,
    pub catalog: Arc<dyn CatalogSource>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a connection under a fresh opaque token and returns the token.
    pub async fn create(
        &self,
        username: impl Into<String>,
        user_id: Option<String>,
        catalog: Arc<dyn CatalogSource>,
    ) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Arc::new(Session {
            username: username.into(),
            user_id,
            catalog,
            created_at: Utc::now(),
        });
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    pub async fn get(&self, token: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(token).cloned()
    }
}

/// Extracts the bearer session token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> PartlineResult<&str> {
    let header = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok());

    match header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = header["Bearer ".len()..].trim();
            if token.is_empty() {
                Err(PartlineError::authentication("No session ID provided"))
            } else {
                Ok(token)
            }
        }
        Some(_) => Err(PartlineError::authentication(
            "Invalid authorization header format",
        )),
        None => Err(PartlineError::authentication("No session ID provided")),
    }
}

/// Resolves the request's session or fails with an authentication error.
pub async fn authorize(store: &SessionStore, headers: &HeaderMap) -> PartlineResult<Arc<Session>> {
    let token = bearer_token(headers)?;
    store
        .get(token)
        .await
        .ok_or_else(|| PartlineError::authentication("Invalid session or expired"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::MockCatalog;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_create_and_resolve_session() {
        let store = SessionStore::new();
        let token = store
            .create("jdoe", Some("user-1".to_string()), Arc::new(MockCatalog::new()))
            .await;

        let session = store.get(&token).await.expect("session stored");
        assert_eq!(session.username, "jdoe");
        assert_eq!(session.user_id.as_deref(), Some("user-1"));
        assert!(store.get("other-token").await.is_none());
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc-123");
    }

    #[test]
    fn test_missing_and_malformed_headers_rejected() {
        let headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc-123"));
        assert!(bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(bearer_token(&headers).is_err());
    }

    #[tokio::test]
    async fn test_authorize_unknown_token_is_authentication_error() {
        let store = SessionStore::new();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer nope"));

        let result = authorize(&store, &headers).await;
        assert!(matches!(
            result,
            Err(PartlineError::Authentication { .. })
        ));
    }
}
