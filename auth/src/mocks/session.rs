//! Mock session store for testing.

use crate::providers::{SessionStore, StoredSession};
use boothmap_core::error::StoreError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock session store.
///
/// Uses in-memory storage for testing. [`set_unavailable`](Self::set_unavailable)
/// makes every lookup fail, simulating a backend outage.
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    sessions: Arc<Mutex<HashMap<String, StoredSession>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockSessionStore {
    /// Create a new mock session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `session` under its token, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn insert(&self, session: StoredSession) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Database("Mutex lock failed".to_string()))?
            .insert(session.session_token.clone(), session);
        Ok(())
    }

    /// Remove the session stored under `token`.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn revoke(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| StoreError::Database("Mutex lock failed".to_string()))?
            .remove(token)
            .is_some())
    }

    /// Get count of stored sessions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn session_count(&self) -> Result<usize, StoreError> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| StoreError::Database("Mutex lock failed".to_string()))?
            .len())
    }

    /// Make every subsequent lookup fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl SessionStore for MockSessionStore {
    fn find_session(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<StoredSession>, StoreError>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let unavailable = self.unavailable.load(Ordering::SeqCst);
        let token = token.to_string();

        async move {
            if unavailable {
                return Err(StoreError::Database("session store unavailable".to_string()));
            }
            let sessions_guard = sessions
                .lock()
                .map_err(|_| StoreError::Database("Mutex lock failed".to_string()))?;
            Ok(sessions_guard.get(&token).cloned())
        }
    }
}
