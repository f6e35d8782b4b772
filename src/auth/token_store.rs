//! Credential persistence
//!
//! This module defines the [`TokenStore`] collaborator used by the auth
//! interceptor and the refresh coordinator, together with two
//! implementations:
//!
//! - [`MemoryTokenStore`] -- process-local storage, used by tests and by
//!   callers that manage persistence themselves.
//! - [`KeyringTokenStore`] -- the operating system's native credential store
//!   (Keychain on macOS, Secret Service on Linux, Windows Credential Manager
//!   on Windows).
//!
//! Reads and writes are atomic at the single-token granularity; no
//! implementation offers a multi-token transaction.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{ApiResult, SalonError};

// ---------------------------------------------------------------------------
// TokenPair
// ---------------------------------------------------------------------------

/// Access and refresh token issued at login or by a refresh.
///
/// Both values are opaque to the client; expiry is enforced server-side.
///
/// # Examples
///
/// ```
/// use salon_client::auth::token_store::TokenPair;
///
/// let pair: TokenPair =
///     serde_json::from_str(r#"{"accessToken":"a","refreshToken":"r"}"#).unwrap();
/// assert_eq!(pair.access_token, "a");
/// assert_eq!(pair.refresh_token, "r");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived credential attached to outbound requests.
    pub access_token: String,

    /// Longer-lived credential exchanged for a new access token.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a pair from its two halves.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// Storage for the current access and refresh tokens.
///
/// Implementations must be safe to share across tasks; the client holds one
/// behind an `Arc<dyn TokenStore>`.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored access token, or `None` when logged out.
    fn access_token(&self) -> ApiResult<Option<String>>;

    /// Returns the stored refresh token, or `None` when logged out.
    fn refresh_token(&self) -> ApiResult<Option<String>>;

    /// Replaces the stored access token.
    fn set_access_token(&self, token: &str) -> ApiResult<()>;

    /// Replaces the stored refresh token.
    fn set_refresh_token(&self, token: &str) -> ApiResult<()>;

    /// Removes both tokens. A no-op when nothing is stored.
    fn clear_all(&self) -> ApiResult<()>;

    /// Stores both halves of `pair`.
    ///
    /// If the refresh token cannot be written the store is cleared, so a new
    /// access token is never left beside a stale refresh token.
    fn set_pair(&self, pair: &TokenPair) -> ApiResult<()> {
        self.set_access_token(&pair.access_token)?;
        if let Err(e) = self.set_refresh_token(&pair.refresh_token) {
            if let Err(clear_err) = self.clear_all() {
                tracing::warn!(error = %clear_err, "Failed to roll back partial token write");
            }
            return Err(e);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// Process-local token storage.
///
/// # Examples
///
/// ```
/// use salon_client::auth::token_store::{MemoryTokenStore, TokenPair, TokenStore};
///
/// let store = MemoryTokenStore::with_pair(TokenPair::new("access", "refresh"));
/// assert_eq!(store.access_token().unwrap().as_deref(), Some("access"));
///
/// store.clear_all().unwrap();
/// assert!(store.refresh_token().unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    access: RwLock<Option<String>>,
    refresh: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `pair`.
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            access: RwLock::new(Some(pair.access_token)),
            refresh: RwLock::new(Some(pair.refresh_token)),
        }
    }

    fn read(slot: &RwLock<Option<String>>) -> ApiResult<Option<String>> {
        slot.read()
            .map(|guard| guard.clone())
            .map_err(|_| SalonError::Storage("token lock poisoned".to_string()))
    }

    fn write(slot: &RwLock<Option<String>>, value: Option<String>) -> ApiResult<()> {
        let mut guard = slot
            .write()
            .map_err(|_| SalonError::Storage("token lock poisoned".to_string()))?;
        *guard = value;
        Ok(())
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> ApiResult<Option<String>> {
        Self::read(&self.access)
    }

    fn refresh_token(&self) -> ApiResult<Option<String>> {
        Self::read(&self.refresh)
    }

    fn set_access_token(&self, token: &str) -> ApiResult<()> {
        Self::write(&self.access, Some(token.to_string()))
    }

    fn set_refresh_token(&self, token: &str) -> ApiResult<()> {
        Self::write(&self.refresh, Some(token.to_string()))
    }

    fn clear_all(&self) -> ApiResult<()> {
        Self::write(&self.access, None)?;
        Self::write(&self.refresh, None)
    }
}

// ---------------------------------------------------------------------------
// KeyringTokenStore
// ---------------------------------------------------------------------------

const ACCESS_TOKEN_USER: &str = "access_token";
const REFRESH_TOKEN_USER: &str = "refresh_token";

/// Token storage backed by the OS native keyring.
///
/// Each token lives in its own keyring entry under the configured service
/// name, so that a refresh that does not rotate the refresh token only
/// touches one entry.
///
/// # Examples
///
/// ```no_run
/// use salon_client::auth::token_store::{KeyringTokenStore, TokenPair, TokenStore};
///
/// let store = KeyringTokenStore::new("salon-client");
/// store.set_pair(&TokenPair::new("access", "refresh")).unwrap();
/// assert!(store.access_token().unwrap().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    /// Creates a store that uses `service` as the keyring service name.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the keyring service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, user: &str) -> ApiResult<keyring::Entry> {
        keyring::Entry::new(&self.service, user).map_err(SalonError::Keyring)
    }

    fn load(&self, user: &str) -> ApiResult<Option<String>> {
        match self.entry(user)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SalonError::Keyring(e)),
        }
    }

    fn save(&self, user: &str, value: &str) -> ApiResult<()> {
        self.entry(user)?
            .set_password(value)
            .map_err(SalonError::Keyring)
    }

    fn delete(&self, user: &str) -> ApiResult<()> {
        match self.entry(user)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SalonError::Keyring(e)),
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn access_token(&self) -> ApiResult<Option<String>> {
        self.load(ACCESS_TOKEN_USER)
    }

    fn refresh_token(&self) -> ApiResult<Option<String>> {
        self.load(REFRESH_TOKEN_USER)
    }

    fn set_access_token(&self, token: &str) -> ApiResult<()> {
        self.save(ACCESS_TOKEN_USER, token)
    }

    fn set_refresh_token(&self, token: &str) -> ApiResult<()> {
        self.save(REFRESH_TOKEN_USER, token)
    }

    fn clear_all(&self) -> ApiResult<()> {
        self.delete(ACCESS_TOKEN_USER)?;
        self.delete(REFRESH_TOKEN_USER)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
