//! The session registry: a concurrent map from session token to the
//! exchange-client-backed plot-orderer registry it owns.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use plottrader_engine::DynPlotOrderer;

use crate::error::SessionError;
use crate::hash::hash_credentials;

/// One logged-in session: a token, the hash of the credentials it was
/// created with, and the plot-orderer registry running against its
/// exchange client.
pub struct Session {
    pub token: String,
    pub credentials_hash: String,
    pub orderer: Arc<dyn DynPlotOrderer>,
}

/// A concurrent token -> session map. Lookups clone the `Arc<Session>` and
/// release the lock before any further work, so venue I/O performed
/// through a session's orderer never happens while the registry lock is
/// held.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }

    /// Registers a new session for a credentials payload, returning it.
    /// The token is freshly generated (`uuid::Uuid::new_v4`), so a
    /// collision would indicate a broken RNG rather than a normal race;
    /// `DuplicateToken` exists for that pathological case.
    pub fn create(&self, credentials: &serde_json::Value, orderer: Arc<dyn DynPlotOrderer>) -> Result<Arc<Session>, SessionError> {
        let token = uuid::Uuid::new_v4().to_string();
        let credentials_hash = hash_credentials(credentials);
        let session = Arc::new(Session { token: token.clone(), credentials_hash, orderer });

        let mut sessions = self.sessions.lock();
        if sessions.contains_key(&token) {
            return Err(SessionError::DuplicateToken(token));
        }
        sessions.insert(token, session.clone());
        Ok(session)
    }

    pub fn get(&self, token: &str) -> Result<Arc<Session>, SessionError> {
        self.sessions
            .lock()
            .get(token)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(token.to_string()))
    }

    pub fn delete(&self, token: &str) -> Result<(), SessionError> {
        self.sessions
            .lock()
            .remove(token)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound(token.to_string()))
    }

    /// All sessions currently registered.
    pub fn get_all(&self) -> Vec<Arc<Session>> {
        self.sessions.lock().values().cloned().collect()
    }

    /// Sibling sessions sharing the same credentials hash as `token`'s
    /// session, including that session itself — lets a client discover
    /// every active login to the same underlying account.
    pub fn siblings(&self, token: &str) -> Result<Vec<Arc<Session>>, SessionError> {
        let sessions = self.sessions.lock();
        let target = sessions.get(token).ok_or_else(|| SessionError::NotFound(token.to_string()))?;
        Ok(sessions
            .values()
            .filter(|s| s.credentials_hash == target.credentials_hash)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plottrader_engine::{EngineError, PlotOrderSummary};
    use plottrader_execution::OrderData;
    use plottrader_geometry::Plot;
    use std::time::Duration;

    struct NoopOrderer;

    #[async_trait::async_trait]
    impl DynPlotOrderer for NoopOrderer {
        async fn create(&self, _order_data: OrderData<serde_json::Value>, _plot: Plot, _interval: Duration) -> Result<PlotOrderSummary, EngineError> {
            unimplemented!()
        }
        async fn get(&self, _id: &str) -> Result<PlotOrderSummary, EngineError> {
            unimplemented!()
        }
        async fn stop(&self, _id: &str, _cancel_on_venue: bool) -> Result<(), EngineError> {
            unimplemented!()
        }
        async fn stop_all(&self, _cancel_on_venue: bool) -> Result<(), EngineError> {
            unimplemented!()
        }
    }

    fn creds(key: &str) -> serde_json::Value {
        serde_json::json!({ "api_key": key })
    }

    #[test]
    fn create_get_delete_round_trip() {
        let registry = SessionRegistry::new();
        let session = registry.create(&creds("a"), Arc::new(NoopOrderer)).unwrap();
        let fetched = registry.get(&session.token).unwrap();
        assert_eq!(fetched.token, session.token);

        registry.delete(&session.token).unwrap();
        assert!(registry.get(&session.token).is_err());
    }

    #[test]
    fn delete_unknown_token_errors() {
        let registry = SessionRegistry::new();
        assert!(matches!(registry.delete("missing").unwrap_err(), SessionError::NotFound(_)));
    }

    #[test]
    fn siblings_share_credentials_hash_and_include_self() {
        let registry = SessionRegistry::new();
        let a = registry.create(&creds("shared"), Arc::new(NoopOrderer)).unwrap();
        let b = registry.create(&creds("shared"), Arc::new(NoopOrderer)).unwrap();
        let c = registry.create(&creds("different"), Arc::new(NoopOrderer)).unwrap();

        let siblings = registry.siblings(&a.token).unwrap();
        assert_eq!(siblings.len(), 2);
        assert!(siblings.iter().any(|s| s.token == a.token));
        assert!(siblings.iter().any(|s| s.token == b.token));
        assert!(!siblings.iter().any(|s| s.token == c.token));
    }
}
