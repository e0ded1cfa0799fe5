//! Session state and credential persistence.
//!
//! The [`Session`] (access token, refresh token, decoded claims) is the only
//! state mutated by more than one component: the request wrapper renews it
//! reactively and the scheduler proactively. All mutation therefore goes
//! through [`CredentialStore`], which replaces the session as a whole under
//! a lock - there is never a window where the two tokens are inconsistent
//! with each other.

pub mod claims;
mod storage;

pub use claims::Claims;
pub use storage::{FileStorage, MemoryStorage, PersistedTokens, TokenStorage};

use std::fmt;
use std::io;
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};

/// The in-memory authentication state.
///
/// Either both tokens are present (logged in) or state is being torn down;
/// a session with only one half is meaningless, so clearing always clears
/// both.
#[derive(Clone, Default)]
pub struct Session {
    access: Option<SecretString>,
    refresh: Option<SecretString>,
    claims: Option<Claims>,
}

impl Session {
    /// The access token, if any.
    #[must_use]
    pub const fn access(&self) -> Option<&SecretString> {
        self.access.as_ref()
    }

    /// The refresh token, if any.
    #[must_use]
    pub const fn refresh(&self) -> Option<&SecretString> {
        self.refresh.as_ref()
    }

    /// Claims decoded from the access token, if any.
    #[must_use]
    pub const fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// Whether any credential is held.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.access.is_some() || self.refresh.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access", &self.access.as_ref().map(|_| "[REDACTED]"))
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .field("claims", &self.claims)
            .finish()
    }
}

struct SessionState {
    session: Session,
    /// Bumped on every access-token change; lets a caller that queued for
    /// the refresh lock detect that someone else already renewed the token.
    generation: u64,
}

/// Owns the [`Session`] and keeps it in sync with persistent storage.
pub struct CredentialStore {
    state: Mutex<SessionState>,
    storage: Box<dyn TokenStorage>,
}

impl CredentialStore {
    /// Create a store over the given storage backend, starting logged out.
    #[must_use]
    pub fn new(storage: Box<dyn TokenStorage>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                session: Session::default(),
                generation: 0,
            }),
            storage,
        }
    }

    /// Reconstruct the in-memory session from persistent storage.
    ///
    /// Claims are decoded from the persisted access token if one is present.
    /// Corrupt persisted state reads as logged out. Returns a snapshot of
    /// the resulting session.
    pub fn load(&self) -> Session {
        let persisted = self.storage.read().unwrap_or_default();
        let claims = persisted.access_token.as_deref().and_then(claims::decode);
        let session = Session {
            access: persisted.access_token.map(SecretString::from),
            refresh: persisted.refresh_token.map(SecretString::from),
            claims,
        };
        let mut state = self.lock();
        state.session = session.clone();
        state.generation += 1;
        session
    }

    /// Store a new token pair, in memory and persistently.
    ///
    /// Both tokens are always written together.
    ///
    /// # Errors
    ///
    /// Returns an error if persistent storage cannot be written; in-memory
    /// state is still updated so the running session keeps working.
    pub fn save(&self, access: &str, refresh: &str) -> io::Result<()> {
        let claims = claims::decode(access);
        let mut state = self.lock();
        state.session = Session {
            access: Some(SecretString::from(access)),
            refresh: Some(SecretString::from(refresh)),
            claims,
        };
        state.generation += 1;
        // Written while still holding the lock, so memory and storage can
        // never disagree about which token pair is current.
        self.storage.write(&PersistedTokens::now(
            Some(access.to_string()),
            Some(refresh.to_string()),
        ))
    }

    /// Replace only the access token after a successful refresh.
    ///
    /// The refresh token is long-lived and never rotates, so it is carried
    /// over. Returns `false` without applying anything if the session was
    /// cleared while the refresh was in flight - a late response must not
    /// resurrect a logged-out session.
    ///
    /// # Errors
    ///
    /// Returns an error if persistent storage cannot be written.
    pub fn replace_access(&self, access: &str) -> io::Result<bool> {
        let claims = claims::decode(access);
        let mut state = self.lock();
        let Some(refresh) = state.session.refresh.clone() else {
            return Ok(false);
        };
        state.session.access = Some(SecretString::from(access));
        state.session.claims = claims;
        state.generation += 1;
        self.storage.write(&PersistedTokens::now(
            Some(access.to_string()),
            Some(refresh.expose_secret().to_string()),
        ))?;
        Ok(true)
    }

    /// Remove both tokens and claims, in memory and persistently.
    ///
    /// # Errors
    ///
    /// Returns an error if persistent storage cannot be cleared; in-memory
    /// state is cleared regardless.
    pub fn clear(&self) -> io::Result<()> {
        let mut state = self.lock();
        state.session = Session::default();
        state.generation += 1;
        self.storage.clear()
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    /// The current access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.lock().session.access.clone()
    }

    /// The current refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.lock().session.refresh.clone()
    }

    /// Claims from the current access token, if any.
    #[must_use]
    pub fn claims(&self) -> Option<Claims> {
        self.lock().session.claims.clone()
    }

    /// Whether any credential is currently held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lock().session.is_active()
    }

    /// Current access-token generation; bumped on every session mutation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        // A poisoned lock only happens if a holder panicked; the session
        // data itself is always a consistent whole-value replacement.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("session", &self.session())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn test_save_sets_both_tokens_and_claims() {
        let store = store();
        let token = test_token(5, Some("bee"));
        store.save(&token, "refresh-1").unwrap();

        let session = store.session();
        assert!(session.is_active());
        assert_eq!(
            session.claims().unwrap().display_name().as_deref(),
            Some("bee")
        );
        assert_eq!(
            store.refresh_token().unwrap().expose_secret(),
            "refresh-1"
        );
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = store();
        store.save(&test_token(5, None), "refresh-1").unwrap();
        store.clear().unwrap();

        assert!(!store.is_active());
        assert!(store.claims().is_none());
        assert!(store.load().access().is_none());
    }

    #[test]
    fn test_load_reconstructs_from_storage() {
        let storage = MemoryStorage::seeded(PersistedTokens::now(
            Some(test_token(9, Some("queen"))),
            Some("refresh-9".to_string()),
        ));
        let store = CredentialStore::new(Box::new(storage));

        let session = store.load();
        assert!(session.is_active());
        assert_eq!(
            session.claims().unwrap().display_name().as_deref(),
            Some("queen")
        );
    }

    #[test]
    fn test_load_with_garbage_access_token_has_no_claims() {
        let storage = MemoryStorage::seeded(PersistedTokens::now(
            Some("not-a-jwt".to_string()),
            Some("refresh".to_string()),
        ));
        let store = CredentialStore::new(Box::new(storage));

        let session = store.load();
        assert!(session.access().is_some());
        assert!(session.claims().is_none());
    }

    #[test]
    fn test_replace_access_keeps_refresh_token() {
        let store = store();
        store.save(&test_token(1, None), "refresh-1").unwrap();
        let applied = store.replace_access(&test_token(2, None)).unwrap();

        assert!(applied);
        assert_eq!(
            store.refresh_token().unwrap().expose_secret(),
            "refresh-1"
        );
        assert_eq!(
            store.claims().unwrap().user_id.unwrap().as_i64(),
            2
        );
    }

    #[test]
    fn test_replace_access_discarded_after_clear() {
        let store = store();
        store.save(&test_token(1, None), "refresh-1").unwrap();
        store.clear().unwrap();

        // A refresh response landing after logout must not be applied.
        let applied = store.replace_access(&test_token(2, None)).unwrap();
        assert!(!applied);
        assert!(!store.is_active());
    }

    #[test]
    fn test_generation_bumps_on_access_change() {
        let store = store();
        let before = store.generation();
        store.save(&test_token(1, None), "r").unwrap();
        let after_save = store.generation();
        assert!(after_save > before);
        store.replace_access(&test_token(2, None)).unwrap();
        assert!(store.generation() > after_save);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let store = store();
        store.save(&test_token(1, None), "super-secret").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }

    /// Build a syntactically valid access token for tests.
    fn test_token(user_id: i64, username: Option<&str>) -> String {
        use base64::Engine;
        let mut payload = serde_json::json!({"user_id": user_id, "token_type": "access"});
        if let Some(name) = username {
            payload["username"] = serde_json::Value::String(name.to_string());
        }
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&payload).unwrap());
        format!("h.{encoded}.s")
    }
}
