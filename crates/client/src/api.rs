//! HTTP client for the storefront API.
//!
//! [`ApiClient`] wraps [`reqwest`] with token handling: every authenticated
//! request attaches the current access token, and a `401 Unauthorized`
//! response triggers exactly one token refresh followed by exactly one retry
//! of the original request. Concurrent refreshes are collapsed into a single
//! network call.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use bee_commerce_core::{Category, Order, Paginated, Product, ProductId};

use crate::account::{Profile, ProfileUpdate};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{CredentialStore, Session, TokenStorage};

const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(300);

/// Typed client for the storefront REST API.
///
/// Cheap to clone; all clones share the same session state, connection pool,
/// and caches.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialStore,
    /// Serializes token refreshes so concurrent 401s produce one refresh call.
    refresh_lock: tokio::sync::Mutex<()>,
    categories_cache: Cache<(), Arc<Vec<Category>>>,
}

/// Where a request stands in the refresh-and-retry cycle.
///
/// A request is sent at most twice: once in `Initial`, and once more in
/// `Retrying` after a successful token refresh. A 401 while `Retrying`
/// ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retrying,
}

#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Deserialize)]
struct AccessOnly {
    access: String,
}

impl ApiClient {
    /// Build a client from configuration, using the given token storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, storage: Box<dyn TokenStorage>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
                credentials: CredentialStore::new(storage),
                refresh_lock: tokio::sync::Mutex::new(()),
                categories_cache: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(CATEGORY_CACHE_TTL)
                    .build(),
            }),
        })
    }

    /// Access to the underlying credential store.
    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{path}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    // ===== Authentication =====

    /// Log in with a username and password, storing the returned token pair.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] with the server's message when
    /// the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let body = serde_json::json!({ "username": username, "password": password });
        let response = self
            .inner
            .http
            .post(self.endpoint("/token/"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let tokens: TokenPair = response.json().await?;
        self.inner
            .credentials
            .save(&tokens.access, &tokens.refresh)?;
        debug!(username, "logged in");
        Ok(self.inner.credentials.session())
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] with the flattened field errors
    /// when the server rejects the registration.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let response = self
            .inner
            .http
            .post(self.endpoint("/accounts/register/"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    /// Drop the session: forget tokens in memory and on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if clearing persisted tokens fails.
    pub fn logout(&self) -> Result<()> {
        self.inner.credentials.clear()?;
        Ok(())
    }

    /// Restore a session from persisted tokens, if any.
    ///
    /// If only a refresh token survives (or the access token is rejected on
    /// first use), the normal refresh path recovers the session lazily.
    ///
    #[must_use]
    pub fn restore(&self) -> bool {
        self.inner.credentials.load().is_active()
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Only one refresh runs at a time; callers that were queued behind an
    /// in-flight refresh observe its result instead of issuing their own.
    /// Any failure ends the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] when the refresh token is
    /// missing or rejected.
    #[instrument(skip(self))]
    pub async fn refresh_access_token(&self) -> Result<()> {
        let observed = self.inner.credentials.generation();
        let _guard = self.inner.refresh_lock.lock().await;

        // Someone else refreshed (or logged in/out) while we waited.
        if self.inner.credentials.generation() != observed {
            return if self.inner.credentials.is_active() {
                Ok(())
            } else {
                Err(ClientError::SessionExpired)
            };
        }

        let Some(refresh) = self.inner.credentials.refresh_token() else {
            self.inner.credentials.clear()?;
            return Err(ClientError::SessionExpired);
        };

        match self.request_new_access(&refresh).await {
            Ok(access) => {
                // `replace_access` reports false when the session was cleared
                // while the request was in flight; the new token is discarded.
                if self.inner.credentials.replace_access(&access)? {
                    debug!("access token refreshed");
                    Ok(())
                } else {
                    Err(ClientError::SessionExpired)
                }
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, ending session");
                self.inner.credentials.clear()?;
                Err(ClientError::SessionExpired)
            }
        }
    }

    async fn request_new_access(&self, refresh: &SecretString) -> Result<String> {
        let body = serde_json::json!({ "refresh": refresh.expose_secret() });
        let response = self
            .inner
            .http
            .post(self.endpoint("/token/refresh/"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let payload: AccessOnly = response.json().await?;
        Ok(payload.access)
    }

    // ===== Authenticated request pipeline =====

    /// Send an authenticated request, refreshing the token once on a 401.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let mut attempt = Attempt::Initial;
        loop {
            let Some(access) = self.inner.credentials.access_token() else {
                // No access token in memory. Recovery order: a persisted
                // access token, then a refresh (in memory or persisted),
                // then give up.
                if attempt == Attempt::Initial {
                    let persisted = self.inner.credentials.load();
                    if persisted.access().is_some() {
                        continue;
                    }
                    if persisted.refresh().is_some() {
                        self.refresh_access_token().await?;
                        attempt = Attempt::Retrying;
                        continue;
                    }
                }
                return Err(ClientError::Unauthenticated);
            };

            let mut request = self
                .inner
                .http
                .request(method.clone(), self.endpoint(path))
                .bearer_auth(access.expose_secret());
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            match attempt {
                Attempt::Initial => {
                    debug!(path, "got 401, refreshing token and retrying");
                    self.refresh_access_token().await?;
                    attempt = Attempt::Retrying;
                }
                Attempt::Retrying => {
                    // The freshly refreshed token was rejected too; nothing
                    // further to try.
                    warn!(path, "401 after refresh, ending session");
                    self.inner.credentials.clear()?;
                    return Err(ClientError::SessionExpired);
                }
            }
        }
    }

    /// Authenticated GET returning a decoded JSON body.
    ///
    /// # Errors
    ///
    /// Propagates authentication, transport, and decode failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.send(Method::GET, path, query, None).await?;
        decode_success(response).await
    }

    /// Authenticated POST with a JSON body, returning the decoded response.
    ///
    /// # Errors
    ///
    /// Propagates authentication, transport, and decode failures.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        decode_success(response).await
    }

    /// Authenticated PATCH with a JSON body, returning the decoded response.
    ///
    /// # Errors
    ///
    /// Propagates authentication, transport, and decode failures.
    pub async fn patch_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.send(Method::PATCH, path, &[], Some(body)).await?;
        decode_success(response).await
    }

    // ===== Catalog =====

    /// All product categories.
    ///
    /// Public endpoint; results are cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decode fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>> {
        if let Some(cached) = self.inner.categories_cache.get(&()).await {
            return Ok(cached);
        }

        let response = self
            .inner
            .http
            .get(self.endpoint("/categories/"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let page: Paginated<Category> = response.json().await?;
        let categories = Arc::new(page.into_items());
        self.inner
            .categories_cache
            .insert((), Arc::clone(&categories))
            .await;
        Ok(categories)
    }

    /// One page of products, optionally filtered.
    ///
    /// # Errors
    ///
    /// Propagates authentication, transport, and decode failures.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &[(&str, String)]) -> Result<Paginated<Product>> {
        self.get_json("/products/", query).await
    }

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] with status 404 for an unknown
    /// id; propagates other failures.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.get_json(&format!("/products/{id}/"), &[]).await
    }

    // ===== Orders =====

    /// The authenticated user's order history.
    ///
    /// # Errors
    ///
    /// Propagates authentication, transport, and decode failures.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let page: Paginated<Order> = self.get_json("/orders/", &[]).await?;
        Ok(page.into_items())
    }

    // ===== Profile =====

    /// The authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Propagates authentication, transport, and decode failures.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile> {
        self.get_json("/accounts/profile/", &[]).await
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the server rejects a field.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        let body = serde_json::to_value(update)?;
        self.patch_json("/accounts/profile/", &body).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

async fn decode_success<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(error_from_response(response).await)
    }
}

/// Turn a non-2xx response into a [`ClientError`].
///
/// Django REST Framework error bodies come in two shapes: `{"detail": "..."}`
/// or a map of field name to list of messages. Both are flattened into one
/// human-readable string. A 400 with field errors becomes
/// [`ClientError::Validation`]; everything else is
/// [`ClientError::RequestFailed`].
async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let parsed: Option<Value> = serde_json::from_str(&body).ok();
    let (message, is_field_errors) = match parsed {
        Some(Value::Object(map)) => {
            if let Some(Value::String(detail)) = map.get("detail") {
                (detail.clone(), false)
            } else {
                (flatten_messages(map.values()), true)
            }
        }
        Some(Value::String(s)) => (s, false),
        _ => (String::new(), false),
    };

    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        message
    };

    if status == StatusCode::BAD_REQUEST && is_field_errors {
        ClientError::Validation(message)
    } else {
        ClientError::RequestFailed {
            status: status.as_u16(),
            message,
        }
    }
}

fn flatten_messages<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    let mut parts = Vec::new();
    for value in values {
        match value {
            Value::String(s) => parts.push(s.clone()),
            Value::Array(items) => {
                for item in items {
                    if let Value::String(s) = item {
                        parts.push(s.clone());
                    }
                }
            }
            _ => {}
        }
    }
    parts.join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_messages_joins_field_errors() {
        let body: Value = serde_json::json!({
            "username": ["A user with that username already exists."],
            "password": ["This password is too short.", "This password is too common."],
        });
        let Value::Object(map) = body else {
            unreachable!()
        };
        let message = flatten_messages(map.values());
        assert!(message.contains("username already exists"));
        assert!(message.contains("too short"));
        assert!(message.contains("too common"));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ClientConfig::with_base_url("http://localhost:8000/api").unwrap();
        let client = ApiClient::new(&config, Box::new(crate::session::MemoryStorage::new())).unwrap();
        assert_eq!(
            client.endpoint("/products/"),
            "http://localhost:8000/api/products/"
        );
    }
}
