/*!
Command handlers for the CLI

Each handler takes an [`ApiClient`] and a writer for user-facing output so
it can be driven from tests without a terminal.

- `login`   -- store a token pair
- `logout`  -- clear stored tokens
- `status`  -- report whether tokens are stored
- `request` -- send a request through the interceptor chain
- `refresh` -- force one coordinated refresh
*/

use std::io::Write;
use std::sync::Arc;

use reqwest::Method;

use crate::api::client::ApiClient;
use crate::auth::token_store::{KeyringTokenStore, MemoryTokenStore, TokenPair, TokenStore};
use crate::cli::parse_header;
use crate::config::{Config, StorageBackend};
use crate::error::{Result, SalonError};

/// Builds the token store selected by `config.storage`.
pub fn build_token_store(config: &Config) -> Arc<dyn TokenStore> {
    match config.storage.backend {
        StorageBackend::Keyring => {
            tracing::debug!(service = %config.storage.keyring_service, "Using keyring token store");
            Arc::new(KeyringTokenStore::new(&config.storage.keyring_service))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory token store; tokens will not persist");
            Arc::new(MemoryTokenStore::new())
        }
    }
}

/// Builds an [`ApiClient`] from the loaded configuration.
///
/// # Errors
///
/// Returns error if the base URL or refresh path is malformed
pub fn build_client(config: &Config) -> Result<ApiClient> {
    let store = build_token_store(config);
    Ok(ApiClient::from_config(&config.api, store)?)
}

/// Stores a token pair.
pub fn login(
    client: &ApiClient,
    access_token: String,
    refresh_token: String,
    out: &mut impl Write,
) -> Result<()> {
    client.login(&TokenPair {
        access_token,
        refresh_token,
    })?;
    writeln!(out, "Logged in to {}", client.base_url())?;
    Ok(())
}

/// Clears stored tokens.
pub fn logout(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    client.logout()?;
    writeln!(out, "Logged out")?;
    Ok(())
}

/// Reports whether an access token is stored. Never prints the token.
pub fn status(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    if client.is_logged_in()? {
        writeln!(out, "Logged in ({})", client.base_url())?;
    } else {
        writeln!(out, "Not logged in")?;
    }
    Ok(())
}

/// Sends one request and prints its status line and body.
///
/// A non-2xx response is printed the same way and then returned as an
/// error so the process exits non-zero.
pub async fn request(
    client: &ApiClient,
    method: &str,
    path: &str,
    body: Option<String>,
    headers: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| SalonError::Config(format!("Invalid HTTP method: {}", method)))?;

    let mut descriptor = client.request(method, path)?;
    for raw in headers {
        let (name, value) = parse_header(raw).ok_or_else(|| {
            SalonError::Config(format!("Invalid header '{}', expected 'Name: value'", raw))
        })?;
        descriptor.set_header(&name, &value);
    }
    if let Some(body) = body {
        if descriptor.header("Content-Type").is_none() {
            descriptor.set_header("Content-Type", "application/json");
        }
        descriptor = descriptor.with_body(body);
    }

    match client.send(descriptor).await {
        Ok(response) => {
            writeln!(out, "{}", response.status)?;
            if !response.body.is_empty() {
                writeln!(out, "{}", response.body)?;
            }
            Ok(())
        }
        Err(SalonError::Http {
            status,
            request,
            body,
        }) => {
            writeln!(out, "{}", status)?;
            if !body.is_empty() {
                writeln!(out, "{}", body)?;
            }
            Err(SalonError::Http {
                status,
                request,
                body,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Forces a refresh through the client's coordinator.
pub async fn refresh(client: &ApiClient, out: &mut impl Write) -> Result<()> {
    client.refresh_now().await?;
    writeln!(out, "Access token refreshed")?;
    Ok(())
}
