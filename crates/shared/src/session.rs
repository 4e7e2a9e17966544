use std::cell::RefCell;

/// Key the access token is persisted under.
pub const TOKEN_STORAGE_KEY: &str = "fleet.access_token";

pub const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";

/// Persistence for the access token.
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// Token store that lives only as long as the page. Used when browser storage
/// is unavailable.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        MemoryTokenStore {
            token: RefCell::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.borrow_mut() = None;
    }
}

/// Authentication state of the console.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub login_error: Option<String>,
    pub logging_in: bool,
}

impl SessionState {
    /// Start from whatever token was persisted by a previous visit.
    pub fn restore(store: &dyn TokenStore) -> SessionState {
        SessionState {
            token: store.load().filter(|t| !t.is_empty()),
            ..Default::default()
        }
    }

    pub fn authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn begin_login(&mut self) {
        self.logging_in = true;
        self.login_error = None;
    }

    pub fn login_succeeded(&mut self, token: String, store: &dyn TokenStore) {
        store.save(&token);
        self.token = Some(token);
        self.logging_in = false;
        self.login_error = None;
    }

    /// Leaves the session unauthenticated; nothing is persisted.
    pub fn login_failed(&mut self, message: String) {
        self.logging_in = false;
        self.login_error = Some(message);
    }

    pub fn logout(&mut self, store: &dyn TokenStore) {
        store.clear();
        *self = SessionState::default();
    }

    /// The server rejected the stored token.
    pub fn expire(&mut self, store: &dyn TokenStore) {
        self.logout(store);
        self.login_error = Some(SESSION_EXPIRED.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_with_stored_token_is_authenticated() {
        let store = MemoryTokenStore::with_token("abc");
        let s = SessionState::restore(&store);
        assert!(s.authenticated());
        assert_eq!(s.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_restore_without_token() {
        let store = MemoryTokenStore::default();
        assert!(!SessionState::restore(&store).authenticated());
    }

    #[test]
    fn test_restore_ignores_empty_token() {
        let store = MemoryTokenStore::with_token("");
        assert!(!SessionState::restore(&store).authenticated());
    }

    #[test]
    fn test_login_success_persists_token() {
        let store = MemoryTokenStore::default();
        let mut s = SessionState::restore(&store);
        s.begin_login();
        assert!(s.logging_in);
        s.login_succeeded("tok".to_string(), &store);
        assert!(s.authenticated());
        assert!(!s.logging_in);
        assert_eq!(store.load().as_deref(), Some("tok"));
    }

    #[test]
    fn test_login_failure_persists_nothing() {
        let store = MemoryTokenStore::default();
        let mut s = SessionState::restore(&store);
        s.begin_login();
        s.login_failed("Incorrect email or password".to_string());
        assert!(!s.authenticated());
        assert!(!s.logging_in);
        assert_eq!(s.login_error.as_deref(), Some("Incorrect email or password"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_begin_login_clears_previous_error() {
        let mut s = SessionState {
            login_error: Some("bad".to_string()),
            ..Default::default()
        };
        s.begin_login();
        assert!(s.login_error.is_none());
    }

    #[test]
    fn test_logout_clears_store() {
        let store = MemoryTokenStore::with_token("tok");
        let mut s = SessionState::restore(&store);
        s.logout(&store);
        assert!(!s.authenticated());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_expire_sets_message() {
        let store = MemoryTokenStore::with_token("tok");
        let mut s = SessionState::restore(&store);
        s.expire(&store);
        assert!(!s.authenticated());
        assert_eq!(s.login_error.as_deref(), Some(SESSION_EXPIRED));
        assert!(store.load().is_none());
    }
}
