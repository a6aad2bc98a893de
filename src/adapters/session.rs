use crate::core::{Session, SessionId, SessionStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

// 上限一年，避免換算 Duration 時溢位
const MAX_IDLE_MINUTES: u64 = 60 * 24 * 365;

/// 程序內的 session 儲存，閒置超過時限即視為不存在
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new(idle_minutes: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout: Duration::minutes(idle_minutes.min(MAX_IDLE_MINUTES) as i64),
        }
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.last_accessed + self.idle_timeout < Utc::now()
    }

    /// 清除所有過期的 session，回傳清除數量
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let timeout = self.idle_timeout;
        let now = Utc::now();
        sessions.retain(|_, session| session.last_accessed + timeout >= now);
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!("🧹 Purged {} expired session(s)", purged);
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// 定期清除過期 session 的背景工作
pub fn spawn_session_reaper(
    store: InMemorySessionStore,
    every: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            store.purge_expired().await;
        }
    })
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: SessionId) -> Result<Option<Session>> {
        let found = {
            let sessions = self.sessions.read().await;
            sessions.get(&id).cloned()
        };

        match found {
            Some(session) if self.is_expired(&session) => {
                tracing::debug!("Session {} expired", id);
                self.sessions.write().await.remove(&id);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn commit(&self, mut session: Session) -> Result<()> {
        session.touch();
        self.sessions.write().await.insert(session.id, session);
        Ok(())
    }

    async fn remove(&self, id: SessionId) -> Result<()> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}
