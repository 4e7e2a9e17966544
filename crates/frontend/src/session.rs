use std::rc::Rc;

use dioxus::logger::tracing::warn;
use dioxus::prelude::*;
use fleet_shared::session::{MemoryTokenStore, SessionState, TokenStore, TOKEN_STORAGE_KEY};

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Token store backed by `window.localStorage`.
pub struct LocalTokenStore;

impl TokenStore for LocalTokenStore {
    fn load(&self) -> Option<String> {
        local_storage()?.get_item(TOKEN_STORAGE_KEY).ok().flatten()
    }

    fn save(&self, token: &str) {
        if let Some(storage) = local_storage() {
            if storage.set_item(TOKEN_STORAGE_KEY, token).is_err() {
                warn!("Could not persist access token");
            }
        }
    }

    fn clear(&self) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(TOKEN_STORAGE_KEY);
        }
    }
}

fn token_store() -> Rc<dyn TokenStore> {
    if local_storage().is_some() {
        Rc::new(LocalTokenStore)
    } else {
        warn!("localStorage unavailable, session will not survive a reload");
        Rc::new(MemoryTokenStore::default())
    }
}

/// Session handle shared through context. Copy, so event handlers can capture it.
#[derive(Clone, Copy, PartialEq)]
pub struct Session {
    pub state: Signal<SessionState>,
    store: Signal<Rc<dyn TokenStore>>,
}

impl Session {
    pub fn token(&self) -> Option<String> {
        self.state.peek().token.clone()
    }

    pub fn authenticated(&self) -> bool {
        self.state.read().authenticated()
    }

    pub fn begin_login(&mut self) {
        self.state.write().begin_login();
    }

    pub fn login_succeeded(&mut self, token: String) {
        let store = self.store.peek().clone();
        self.state.write().login_succeeded(token, store.as_ref());
    }

    pub fn login_failed(&mut self, message: String) {
        self.state.write().login_failed(message);
    }

    pub fn logout(&mut self) {
        let store = self.store.peek().clone();
        self.state.write().logout(store.as_ref());
    }

    pub fn expire(&mut self) {
        let store = self.store.peek().clone();
        self.state.write().expire(store.as_ref());
    }
}

/// Restore the persisted token and provide the session to the tree.
pub fn use_session_provider() -> Session {
    use_context_provider(|| {
        let store = token_store();
        let state = SessionState::restore(store.as_ref());
        Session {
            state: Signal::new(state),
            store: Signal::new(store),
        }
    })
}

pub fn use_session() -> Session {
    use_context::<Session>()
}
