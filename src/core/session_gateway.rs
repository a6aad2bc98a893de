//! 請求範圍內的 session 讀寫
//!
//! session 由 `RequestContext` 在單一請求期間獨佔持有，寫入直接修改該
//! session，之後同一請求內的讀取必定看得到。請求結束時由 HTTP 層
//! 將 session 交回 `SessionStore`。

use crate::domain::model::Session;
use serde_json::Value;

/// 任何可取得目前 session 的請求 context
pub trait SessionScope {
    fn session(&self) -> &Session;
    fn session_mut(&mut self) -> &mut Session;
}

impl SessionScope for Session {
    fn session(&self) -> &Session {
        self
    }

    fn session_mut(&mut self) -> &mut Session {
        self
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    session: Session,
    new_session: bool,
}

impl RequestContext {
    pub fn new(session: Session, new_session: bool) -> Self {
        Self {
            session,
            new_session,
        }
    }

    pub fn fresh() -> Self {
        Self::new(Session::new(), true)
    }

    pub fn is_new_session(&self) -> bool {
        self.new_session
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}

impl SessionScope for RequestContext {
    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

/// 寫入（或覆寫）`key` 的值，不檢查 value 的結構
pub fn save_to_session<C: SessionScope + ?Sized>(ctx: &mut C, key: &str, value: Value) {
    let session = ctx.session_mut();
    tracing::debug!("💾 Session {}: saving '{}'", session.id, key);
    session.entries.insert(key.to_string(), value);
}

/// 從未寫入過的 key 回傳 `None`
pub fn get_from_session<'c, C: SessionScope + ?Sized>(ctx: &'c C, key: &str) -> Option<&'c Value> {
    let session = ctx.session();
    let value = session.entries.get(key);
    tracing::debug!(
        "📖 Session {}: reading '{}' ({})",
        session.id,
        key,
        if value.is_some() { "hit" } else { "unset" }
    );
    value
}
