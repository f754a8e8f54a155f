// File: src/session.rs
// Purpose: Session and flash collaborator used by request contexts

use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::request::{parse_cookies, Environment};
use crate::response::Response;

/// One-shot messages: what was set last request is readable this request
#[derive(Debug, Clone, Default)]
pub struct Flash {
    incoming: HashMap<String, String>,
    outgoing: HashMap<String, String>,
    /// Stored messages this request read, removed from the store on commit
    consumed: HashMap<String, String>,
}

impl Flash {
    fn from_stored(stored: &HashMap<String, String>) -> Self {
        Self {
            incoming: stored.clone(),
            outgoing: HashMap::new(),
            consumed: stored.clone(),
        }
    }

    /// Message left by the previous request, or set with [`now`](Self::now)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.incoming.get(key).map(String::as_str)
    }

    /// Message for the next request
    pub fn set(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.outgoing.insert(key.into(), message.into());
    }

    /// Message visible for the rest of this request only
    pub fn now(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.incoming.insert(key.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.incoming.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Per-request session handle
///
/// Besides the current values it records which keys this request changed, so
/// a store can apply just those changes on commit.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    is_new: bool,
    values: HashMap<String, JsonValue>,
    /// `Some` for a key set, `None` for a key removed
    changes: HashMap<String, Option<JsonValue>>,
    cleared: bool,
    flash: Flash,
}

impl Session {
    /// Fresh session with a random id
    pub fn new() -> Self {
        Self::with_values(Uuid::new_v4().to_string(), true, HashMap::new(), Flash::default())
    }

    fn with_values(id: String, is_new: bool, values: HashMap<String, JsonValue>, flash: Flash) -> Self {
        Self {
            id,
            is_new,
            values,
            changes: HashMap::new(),
            cleared: false,
            flash,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the client has not been issued this session's cookie yet
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Deserializes a stored value into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_value(self.values.get(key)?.clone()).ok()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        let key = key.into();
        let value = value.into();
        self.changes.insert(key.clone(), Some(value.clone()));
        self.values.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.changes.insert(key.to_string(), None);
        self.values.remove(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.changes.clear();
        self.cleared = true;
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut Flash {
        &mut self.flash
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads a session for a request and persists it once the response is final
///
/// `commit` is only called for dispatches that succeed. A store must leave
/// its state untouched by `load` so a failed request has no effect.
pub trait SessionStore: Send + Sync {
    fn load(&self, env: &Environment) -> Session;

    fn commit(&self, session: Session, response: &mut Response);
}

#[derive(Debug, Default)]
struct StoredSession {
    values: HashMap<String, JsonValue>,
    flash: HashMap<String, String>,
}

impl StoredSession {
    fn is_empty(&self) -> bool {
        self.values.is_empty() && self.flash.is_empty()
    }
}

/// Process-local session store keyed by a session cookie
///
/// Commits apply only what the request changed, so overlapping requests on
/// one session do not overwrite each other. A session left with no values
/// and no pending flash is dropped from the store.
#[derive(Debug)]
pub struct MemorySessionStore {
    cookie_name: String,
    sessions: Mutex<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Number of sessions currently held
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new("trailhead.session")
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, env: &Environment) -> Session {
        let cookies = parse_cookies(env.headers());
        let Some(id) = cookies.get(&self.cookie_name) else {
            return Session::new();
        };

        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(id) {
            Some(stored) => Session::with_values(
                id.clone(),
                false,
                stored.values.clone(),
                Flash::from_stored(&stored.flash),
            ),
            None => Session::new(),
        }
    }

    fn commit(&self, session: Session, response: &mut Response) {
        let Session {
            id,
            is_new,
            values,
            changes,
            cleared,
            flash,
        } = session;

        if is_new && values.is_empty() && flash.outgoing.is_empty() {
            return;
        }

        if is_new {
            let cookie = format!("{}={}; Path=/; HttpOnly", self.cookie_name, id);
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => {
                    tracing::error!("Failed to build session cookie: {}", e);
                    return;
                }
            }
        }

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = sessions.entry(id.clone()).or_default();

        if cleared {
            stored.values.clear();
        }
        for (key, change) in changes {
            match change {
                Some(value) => {
                    stored.values.insert(key, value);
                }
                None => {
                    stored.values.remove(&key);
                }
            }
        }

        // drop only the messages this request read, as it read them
        for (key, message) in flash.consumed {
            if stored.flash.get(&key) == Some(&message) {
                stored.flash.remove(&key);
            }
        }
        stored.flash.extend(flash.outgoing);

        if stored.is_empty() {
            sessions.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseWriter;

    fn cookie_from(response: &Response) -> String {
        let header = response.header("set-cookie").unwrap();
        header.split(';').next().unwrap().to_string()
    }

    #[test]
    fn test_new_client_gets_fresh_session() {
        let store = MemorySessionStore::default();
        let session = store.load(&Environment::new("GET", "/"));
        assert!(session.is_new());
        assert!(session.is_empty());
    }

    #[test]
    fn test_untouched_new_session_is_not_persisted() {
        let store = MemorySessionStore::default();
        let session = store.load(&Environment::new("GET", "/"));
        let mut response = ResponseWriter::new().into_response();
        store.commit(session, &mut response);
        assert!(store.is_empty());
        assert!(response.header("set-cookie").is_none());
    }

    #[test]
    fn test_values_survive_between_requests() {
        let store = MemorySessionStore::new("sid");
        let mut session = store.load(&Environment::new("GET", "/"));
        session.set("user", "ada");
        let mut response = ResponseWriter::new().into_response();
        store.commit(session, &mut response);

        let cookie = cookie_from(&response);
        assert!(cookie.starts_with("sid="));

        let next = store.load(&Environment::new("GET", "/").header("cookie", &cookie));
        assert!(!next.is_new());
        assert_eq!(next.get_as::<String>("user"), Some("ada".to_string()));
    }

    #[test]
    fn test_flash_is_one_shot() {
        let store = MemorySessionStore::new("sid");
        let mut session = store.load(&Environment::new("POST", "/login"));
        session.flash_mut().set("notice", "Welcome back");
        assert_eq!(session.flash().get("notice"), None);
        let mut response = ResponseWriter::new().into_response();
        store.commit(session, &mut response);
        let cookie = cookie_from(&response);

        let env = Environment::new("GET", "/").header("cookie", &cookie);
        let second = store.load(&env);
        assert_eq!(second.flash().get("notice"), Some("Welcome back"));
        let mut response = ResponseWriter::new().into_response();
        store.commit(second, &mut response);

        let third = store.load(&env);
        assert_eq!(third.flash().get("notice"), None);
    }

    #[test]
    fn test_unknown_cookie_starts_new_session() {
        let store = MemorySessionStore::new("sid");
        let env = Environment::new("GET", "/").header("cookie", "sid=stale");
        assert!(store.load(&env).is_new());
    }

    fn established(store: &MemorySessionStore) -> String {
        let mut session = store.load(&Environment::new("GET", "/"));
        session.set("user", "ada");
        let mut response = ResponseWriter::new().into_response();
        store.commit(session, &mut response);
        cookie_from(&response)
    }

    #[test]
    fn test_load_leaves_flash_in_store_until_commit() {
        let store = MemorySessionStore::new("sid");
        let cookie = established(&store);
        let env = Environment::new("GET", "/").header("cookie", &cookie);

        let mut setter = store.load(&env);
        setter.flash_mut().set("notice", "hi");
        store.commit(setter, &mut ResponseWriter::new().into_response());

        // a request that never commits, e.g. one whose handler failed
        let abandoned = store.load(&env);
        assert_eq!(abandoned.flash().get("notice"), Some("hi"));
        drop(abandoned);

        let next = store.load(&env);
        assert_eq!(next.flash().get("notice"), Some("hi"));
    }

    #[test]
    fn test_overlapping_commits_keep_each_others_changes() {
        let store = MemorySessionStore::new("sid");
        let cookie = established(&store);
        let env = Environment::new("GET", "/").header("cookie", &cookie);

        let mut first = store.load(&env);
        let mut second = store.load(&env);
        first.flash_mut().set("notice", "saved");
        first.set("cart", 3);
        second.set("theme", "dark");

        store.commit(first, &mut ResponseWriter::new().into_response());
        store.commit(second, &mut ResponseWriter::new().into_response());

        let reloaded = store.load(&env);
        assert_eq!(reloaded.flash().get("notice"), Some("saved"));
        assert_eq!(reloaded.get_as::<u32>("cart"), Some(3));
        assert_eq!(reloaded.get_as::<String>("theme"), Some("dark".to_string()));
        assert_eq!(reloaded.get_as::<String>("user"), Some("ada".to_string()));
    }

    #[test]
    fn test_reading_flash_does_not_drop_newer_message() {
        let store = MemorySessionStore::new("sid");
        let cookie = established(&store);
        let env = Environment::new("GET", "/").header("cookie", &cookie);

        let mut setter = store.load(&env);
        setter.flash_mut().set("notice", "old");
        store.commit(setter, &mut ResponseWriter::new().into_response());

        let reader = store.load(&env);
        let mut writer = store.load(&env);
        writer.flash_mut().set("notice", "new");
        store.commit(writer, &mut ResponseWriter::new().into_response());
        store.commit(reader, &mut ResponseWriter::new().into_response());

        assert_eq!(store.load(&env).flash().get("notice"), Some("new"));
    }

    #[test]
    fn test_removed_key_is_not_restored() {
        let store = MemorySessionStore::new("sid");
        let cookie = established(&store);
        let env = Environment::new("GET", "/").header("cookie", &cookie);

        let mut session = store.load(&env);
        session.set("theme", "dark");
        assert_eq!(session.remove("user"), Some(JsonValue::from("ada")));
        store.commit(session, &mut ResponseWriter::new().into_response());

        let reloaded = store.load(&env);
        assert_eq!(reloaded.get("user"), None);
        assert_eq!(reloaded.get_as::<String>("theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_emptied_session_is_dropped_from_store() {
        let store = MemorySessionStore::new("sid");
        let cookie = established(&store);
        assert_eq!(store.len(), 1);

        let env = Environment::new("GET", "/").header("cookie", &cookie);
        let mut session = store.load(&env);
        session.clear();
        store.commit(session, &mut ResponseWriter::new().into_response());

        assert!(store.is_empty());
        assert!(store.load(&env).is_new());
    }
}
