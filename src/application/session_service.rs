// Session service - Login gate for the dashboard
use crate::application::errors::{DashboardError, DashboardResult};
use crate::application::key_value_store::{self, KeyValueStore, SESSION_KEY};
use crate::domain::session::{CredentialTable, UserSession};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    credentials: Arc<CredentialTable>,
    current: Arc<RwLock<Option<UserSession>>>,
}

impl SessionService {
    /// Restores a persisted session, if any
    pub fn load(store: Arc<dyn KeyValueStore>, credentials: CredentialTable) -> Self {
        let current = match key_value_store::load::<UserSession>(store.as_ref(), SESSION_KEY) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session record: {}", e);
                None
            }
        };

        Self {
            store,
            credentials: Arc::new(credentials),
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> DashboardResult<UserSession> {
        if !self.credentials.verify(email, password) {
            tracing::info!("Rejected login attempt");
            return Err(DashboardError::InvalidCredentials);
        }

        let session = UserSession {
            email: email.trim().to_lowercase(),
            login_time: Utc::now(),
        };
        key_value_store::save(self.store.as_ref(), SESSION_KEY, &session)?;
        *self.current.write().await = Some(session.clone());

        tracing::info!("User {} logged in", session.email);
        Ok(session)
    }

    /// Drops the session. Connection teardown is done by the dashboard service.
    pub async fn logout(&self) -> DashboardResult<()> {
        let previous = self.current.write().await.take();
        self.store.remove(SESSION_KEY)?;

        if let Some(session) = previous {
            tracing::info!("User {} logged out", session.email);
        }
        Ok(())
    }

    pub async fn current(&self) -> Option<UserSession> {
        self.current.read().await.clone()
    }

    pub async fn require(&self) -> DashboardResult<UserSession> {
        self.current().await.ok_or(DashboardError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    #[tokio::test]
    async fn test_login_persists_session() {
        let store = Arc::new(MemoryStore::default());
        let sessions = SessionService::load(store.clone(), CredentialTable::default());

        let session = sessions.login("ADMIN@smartrover.com", "admin123").await.unwrap();
        assert_eq!(session.email, "admin@smartrover.com");
        assert!(store.get(SESSION_KEY).unwrap().is_some());

        // A fresh service sees the persisted session
        let restored = SessionService::load(store.clone(), CredentialTable::default());
        assert_eq!(restored.current().await.unwrap().email, "admin@smartrover.com");
    }

    #[tokio::test]
    async fn test_wrong_password_is_generic_and_not_persisted() {
        let store = Arc::new(MemoryStore::default());
        let sessions = SessionService::load(store.clone(), CredentialTable::default());

        let err = sessions.login("admin@smartrover.com", "letmein").await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(store.get(SESSION_KEY).unwrap().is_none());
        assert!(sessions.current().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = Arc::new(MemoryStore::default());
        let sessions = SessionService::load(store.clone(), CredentialTable::default());
        sessions.login("admin@smartrover.com", "admin123").await.unwrap();

        sessions.logout().await.unwrap();

        assert!(store.get(SESSION_KEY).unwrap().is_none());
        assert!(matches!(
            sessions.require().await,
            Err(DashboardError::Unauthenticated)
        ));
    }
}
