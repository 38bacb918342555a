//! In-process login sessions.
//!
//! A session maps an opaque token to the redactor who logged in and a
//! per-session visit counter. Nothing here touches the database.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Longest session lifetime honored; longer configured values are cut to this.
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// State kept for one login.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub redactor_id: String,
    pub num_visits: u64,
    expires_at: Instant,
}

impl SessionData {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Token-keyed session store with absolute expiry.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionData>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: ttl.min(MAX_SESSION_TTL),
        }
    }

    /// Open a session for the redactor and return its token.
    pub async fn create(&self, redactor_id: &str) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let data = SessionData {
            redactor_id: redactor_id.to_string(),
            num_visits: 0,
            expires_at: Instant::now() + self.ttl,
        };

        self.sessions.write().await.insert(token.clone(), data);
        token
    }

    /// Look up a live session; an expired one is dropped on the way.
    pub async fn get(&self, token: &str) -> Option<SessionData> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(data) if !data.is_expired(now) => return Some(data.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions.write().await.remove(token);
        None
    }

    /// End a session. Returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Count one more dashboard visit and return the new total.
    pub async fn record_visit(&self, token: &str) -> u64 {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(data) => {
                data.num_visits += 1;
                data.num_visits
            }
            None => 0,
        }
    }

    /// Dashboard visits so far, without counting one.
    pub async fn visits(&self, token: &str) -> u64 {
        self.sessions
            .read()
            .await
            .get(token)
            .map(|data| data.num_visits)
            .unwrap_or(0)
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, data| !data.is_expired(now));
        before - sessions.len()
    }
}
