use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use salon_client::auth::token_store::{MemoryTokenStore, TokenPair, TokenStore};
use salon_client::config::ApiConfig;
use salon_client::error::ApiResult;
use salon_client::ApiClient;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// In-memory store that counts `clear_all` calls.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryTokenStore,
    clears: AtomicUsize,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn with_pair(access: &str, refresh: &str) -> Self {
        Self {
            inner: MemoryTokenStore::with_pair(TokenPair::new(access, refresh)),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn clear_calls(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl TokenStore for CountingStore {
    fn access_token(&self) -> ApiResult<Option<String>> {
        self.inner.access_token()
    }

    fn refresh_token(&self) -> ApiResult<Option<String>> {
        self.inner.refresh_token()
    }

    fn set_access_token(&self, token: &str) -> ApiResult<()> {
        self.inner.set_access_token(token)
    }

    fn set_refresh_token(&self, token: &str) -> ApiResult<()> {
        self.inner.set_refresh_token(token)
    }

    fn clear_all(&self) -> ApiResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear_all()
    }
}

/// Builds a client against `base_url` with default timeouts and refresh path.
#[allow(dead_code)]
pub fn client_for(base_url: &str, store: Arc<CountingStore>) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    };
    ApiClient::from_config(&config, store).expect("failed to build client")
}
