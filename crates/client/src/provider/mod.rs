//! Session & commerce provider.
//!
//! [`CommerceProvider`] owns everything a storefront session needs: the
//! tokens and the logged-in user, the enriched cart, the product cache and
//! the persisted state behind them. Operations are grouped by area, one
//! `impl` block per file:
//!
//! - [`auth`]: login, registration, logout, token refresh, verification
//! - [`profile`]: the user's own profile and password
//! - [`catalog`]: products and categories
//! - [`cart`]: cart reads and writes with refresh-after-write
//! - [`orders`]: order placement and status changes
//! - [`checkout`]: local checkout bookkeeping (no network)
//!
//! # Session expiry
//!
//! Any call that comes back 401 ends the session: persisted credentials,
//! the access-token cookie, the user, the cart and the product cache are
//! all cleared, [`SessionEvent::SessionExpired`] and a
//! [`SessionEvent::Redirect`] to the login page are broadcast, and the call
//! fails with [`ClientError::Unauthorized`].

mod auth;
mod cart;
mod catalog;
mod checkout;
mod orders;
mod profile;
mod validate;

pub use auth::Registration;
pub use checkout::MAX_RECENT_SEARCHES;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::StatusCode;
use reqwest::cookie::Jar;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Notify, RwLock, broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::cache::ProductCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::{ApiRequest, HttpClient};
use crate::session::{AuthState, CookieMirror, LOGIN_PATH, SessionEvent, SessionTokens};
use crate::storage::{FileStorage, MemoryStorage, SessionStorage, StorageKey};
use crate::telemetry;
use crate::types::{Cart, User};

/// Capacity of the session event channel. Slow subscribers lose the oldest
/// events first.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Client-side session and commerce state for one storefront user.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct CommerceProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    http: HttpClient,
    storage: Arc<dyn SessionStorage>,
    cookies: CookieMirror,
    products: ProductCache,
    tokens: RwLock<Option<SessionTokens>>,
    user: RwLock<Option<User>>,
    cart: RwLock<Option<Cart>>,
    /// Bumped whenever a session starts or ends
    generation: AtomicU64,
    /// `generation + 1` of the cart refresh in flight, `0` when idle
    refreshing_cart: AtomicU64,
    /// Woken when a cart refresh finishes
    cart_settled: Notify,
    auth_state: watch::Sender<AuthState>,
    events: broadcast::Sender<SessionEvent>,
}

impl CommerceProvider {
    /// Create a provider with no session.
    ///
    /// Call [`hydrate`](Self::hydrate) afterwards to restore a persisted
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let cookies = CookieMirror::new(config.storefront_url.clone());
        let products = ProductCache::new(config.product_cache_capacity);
        let http = HttpClient::new(config)?;
        let (auth_state, _) = watch::channel(AuthState::Unauthenticated);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(ProviderInner {
                http,
                storage,
                cookies,
                products,
                tokens: RwLock::new(None),
                user: RwLock::new(None),
                cart: RwLock::new(None),
                generation: AtomicU64::new(0),
                refreshing_cart: AtomicU64::new(0),
                cart_settled: Notify::new(),
                auth_state,
                events,
            }),
        })
    }

    /// Create a provider from `SOLAR_MARKET_*` environment variables.
    ///
    /// Session state is persisted to `SOLAR_MARKET_STORAGE_PATH` when set and
    /// kept in memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for invalid configuration and
    /// `ClientError::Storage` if the storage file cannot be read.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let storage: Arc<dyn SessionStorage> = match &config.storage_path {
            Some(path) => Arc::new(FileStorage::open(path)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::new(config, storage)
    }

    // =========================================================================
    // Session state
    // =========================================================================

    /// Configuration the provider was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.inner.http.config()
    }

    /// Current authentication state.
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        *self.inner.auth_state.borrow()
    }

    /// Whether a user is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_state() == AuthState::Authenticated
    }

    /// Watch authentication state changes.
    #[must_use]
    pub fn subscribe_auth_state(&self) -> watch::Receiver<AuthState> {
        self.inner.auth_state.subscribe()
    }

    /// Receive session events (login, logout, expiry, redirects, cart refreshes).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// The logged-in user.
    pub async fn user(&self) -> Option<User> {
        self.inner.user.read().await.clone()
    }

    /// The last fetched cart. `None` until the first refresh and after logout.
    pub async fn cart(&self) -> Option<Cart> {
        self.inner.cart.read().await.clone()
    }

    /// Total quantity across the cart's lines, `0` with no cart.
    pub async fn cart_item_count(&self) -> u32 {
        self.inner
            .cart
            .read()
            .await
            .as_ref()
            .map_or(0, |cart| cart.total_items)
    }

    /// Cookie jar holding the mirrored `accessToken` cookie for the storefront
    /// origin. Share it with a `reqwest` client or an SSR layer.
    #[must_use]
    pub fn cookie_jar(&self) -> Arc<Jar> {
        self.inner.cookies.jar()
    }

    /// The access token as route guards see it through the cookie.
    #[must_use]
    pub fn access_token_cookie(&self) -> Option<String> {
        self.inner.cookies.access_token()
    }

    /// Shared product cache.
    #[must_use]
    pub fn product_cache(&self) -> &ProductCache {
        &self.inner.products
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore a persisted session.
    ///
    /// With a stored token and user, the user is restored immediately and the
    /// session is revalidated against `GET /profile`. On success the cart is
    /// loaded; on any failure every stored credential is cleared. Never
    /// fails; the resulting state is returned.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> AuthState {
        let storage = &self.inner.storage;
        let stored = (
            storage.get(StorageKey::AccessToken),
            storage.get(StorageKey::RefreshToken),
            storage.get(StorageKey::User),
        );

        let (access_token, refresh_token, user) = match stored {
            (Ok(Some(access)), Ok(refresh), Ok(Some(user))) => (access, refresh, user),
            (Ok(None), _, _) | (_, _, Ok(None)) => {
                debug!("No persisted session");
                return self.auth_state();
            }
            (access, refresh, user) => {
                let error = access.err().or(refresh.err()).or(user.err());
                warn!(error = ?error, "Failed to read persisted session, clearing it");
                self.teardown().await;
                return AuthState::Unauthenticated;
            }
        };

        let user: User = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Persisted user is corrupt, clearing session");
                self.teardown().await;
                return AuthState::Unauthenticated;
            }
        };

        *self.inner.tokens.write().await = Some(SessionTokens::new(access_token, refresh_token));
        *self.inner.user.write().await = Some(user);
        self.inner.auth_state.send_replace(AuthState::Authenticating);

        match self.get_profile().await {
            Ok(user) => {
                if let Some(tokens) = self.inner.tokens.read().await.as_ref() {
                    self.inner.cookies.set(&tokens.access_token);
                }
                self.inner.auth_state.send_replace(AuthState::Authenticated);
                telemetry::set_sentry_user(&user);
                self.emit(SessionEvent::LoggedIn {
                    user_id: user.id.to_string(),
                });
                info!(user_id = %user.id, "Restored session");
                self.load_cart_quietly().await;
                AuthState::Authenticated
            }
            Err(ClientError::Unauthorized) => AuthState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Session revalidation failed, clearing session");
                self.teardown().await;
                AuthState::Unauthenticated
            }
        }
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    /// Send an authenticated request (bearer token attached when present).
    ///
    /// A 401 ends the session before the error is returned, unless the
    /// request was sent under a session that has already ended.
    pub(crate) async fn api_call(&self, request: ApiRequest) -> Result<Value> {
        let generation = self.generation();
        let tokens = self.inner.tokens.read().await.clone();
        match self.inner.http.send(&request, tokens.as_ref()).await {
            Ok(value) => Ok(value),
            Err(ClientError::Api {
                status: StatusCode::UNAUTHORIZED,
                ..
            }) if self.generation() != generation => {
                debug!(method = %request.method, path = %request.path, "Rejected request outlived its session");
                Err(ClientError::Unauthorized)
            }
            Err(ClientError::Api {
                status: StatusCode::UNAUTHORIZED,
                ..
            }) => {
                warn!(method = %request.method, path = %request.path, "Session rejected by backend");
                self.expire_session().await;
                Err(ClientError::Unauthorized)
            }
            Err(e) => {
                telemetry::report(&e);
                Err(e)
            }
        }
    }

    /// Like [`api_call`](Self::api_call), decoding the payload into `T`.
    pub(crate) async fn api_call_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let value = self.api_call(request).await?;
        decode(value)
    }

    /// Send a request that needs no session (login, password reset, ...).
    ///
    /// A 401 here is an ordinary failure such as bad credentials.
    pub(crate) async fn public_call(&self, request: ApiRequest) -> Result<Value> {
        self.inner.http.send(&request, None).await.inspect_err(telemetry::report)
    }

    /// Fail with `NotAuthenticated` unless a session token is held.
    pub(crate) async fn require_session(&self) -> Result<()> {
        if self.inner.tokens.read().await.is_some() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    // =========================================================================
    // Session transitions
    // =========================================================================

    /// Adopt a freshly issued session: persist it, mirror the cookie and
    /// announce the login.
    pub(crate) async fn establish_session(&self, tokens: SessionTokens, user: User) -> Result<()> {
        let storage = &self.inner.storage;
        storage.set(StorageKey::AccessToken, tokens.access_token.expose_secret())?;
        match &tokens.refresh_token {
            Some(refresh) => storage.set(StorageKey::RefreshToken, refresh.expose_secret())?,
            None => storage.remove(StorageKey::RefreshToken)?,
        }
        storage.set(StorageKey::User, &serde_json::to_string(&user)?)?;

        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.cookies.set(&tokens.access_token);
        *self.inner.tokens.write().await = Some(tokens);
        *self.inner.cart.write().await = None;
        telemetry::set_sentry_user(&user);
        let user_id = user.id.to_string();
        *self.inner.user.write().await = Some(user);
        self.inner.auth_state.send_replace(AuthState::Authenticated);
        self.emit(SessionEvent::LoggedIn { user_id });
        Ok(())
    }

    /// Replace the in-memory and persisted user.
    pub(crate) async fn store_user(&self, user: &User) -> Result<()> {
        self.inner
            .storage
            .set(StorageKey::User, &serde_json::to_string(user)?)?;
        *self.inner.user.write().await = Some(user.clone());
        Ok(())
    }

    /// Clear every trace of the session. Idempotent.
    pub(crate) async fn teardown(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        for key in StorageKey::CREDENTIALS {
            if let Err(e) = self.inner.storage.remove(key) {
                warn!(key = %key, error = %e, "Failed to clear stored credential");
            }
        }
        self.inner.cookies.clear();
        *self.inner.tokens.write().await = None;
        *self.inner.user.write().await = None;
        *self.inner.cart.write().await = None;
        self.inner.products.clear().await;
        self.inner.auth_state.send_replace(AuthState::Unauthenticated);
        telemetry::clear_sentry_user();
    }

    /// Tear down after a 401 and send the UI to the login page.
    async fn expire_session(&self) {
        self.teardown().await;
        self.emit(SessionEvent::SessionExpired);
        self.emit(SessionEvent::Redirect {
            to: LOGIN_PATH.to_string(),
        });
    }

    /// Identifies the current session; changes on every login and logout.
    pub(crate) fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

impl std::fmt::Debug for CommerceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceProvider")
            .field("api_url", &self.config().api_url)
            .field("auth_state", &self.auth_state())
            .field("products", &self.inner.products)
            .finish_non_exhaustive()
    }
}

/// Decode a payload, logging the shape mismatch.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, target_type = std::any::type_name::<T>(), "Unexpected response shape");
        ClientError::Parse(e)
    })
}

/// Unwrap a resource nested under `key` (`{"product": {...}}`), or return
/// the payload unchanged.
pub(crate) fn nested(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut fields) if fields.get(key).is_some_and(|v| !v.is_null()) => {
            fields.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// The backend's `message` field, or `fallback`.
pub(crate) fn message_or(value: &Value, fallback: &str) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn provider() -> CommerceProvider {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        CommerceProvider::new(config, Arc::new(MemoryStorage::new())).unwrap()
    }

    #[test]
    fn test_nested_unwraps_named_resource() {
        let value = json!({ "product": { "id": "1" }, "message": "ok" });
        assert_eq!(nested(value, "product"), json!({ "id": "1" }));
        assert_eq!(nested(json!({ "id": "1" }), "product"), json!({ "id": "1" }));
        assert_eq!(nested(json!([1]), "orders"), json!([1]));
    }

    #[test]
    fn test_message_or() {
        assert_eq!(message_or(&json!({ "message": "Sent" }), "done"), "Sent");
        assert_eq!(message_or(&Value::Null, "done"), "done");
    }

    #[tokio::test]
    async fn test_new_provider_is_logged_out() {
        let provider = provider();
        assert_eq!(provider.auth_state(), AuthState::Unauthenticated);
        assert!(provider.user().await.is_none());
        assert!(provider.cart().await.is_none());
        assert_eq!(provider.cart_item_count().await, 0);
        assert!(provider.access_token_cookie().is_none());
    }

    #[tokio::test]
    async fn test_hydrate_without_persisted_session_is_a_no_op() {
        let provider = provider();
        assert_eq!(provider.hydrate().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_hydrate_clears_corrupt_user() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(StorageKey::AccessToken, "tok").unwrap();
        storage.set(StorageKey::User, "{not json").unwrap();
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let provider = CommerceProvider::new(config, storage.clone()).unwrap();

        assert_eq!(provider.hydrate().await, AuthState::Unauthenticated);
        assert_eq!(storage.get(StorageKey::AccessToken).unwrap(), None);
        assert_eq!(storage.get(StorageKey::User).unwrap(), None);
    }

    #[tokio::test]
    async fn test_teardown_announces_nothing_but_resets_state() {
        let provider = provider();
        let mut events = provider.subscribe();
        let user: User = serde_json::from_value(json!({
            "id": "u1", "name": "Ada", "email": "ada@example.com", "role": "vendor"
        }))
        .unwrap();

        provider
            .establish_session(SessionTokens::new("tok", None), user)
            .await
            .unwrap();
        assert!(provider.is_authenticated());
        assert_eq!(provider.access_token_cookie().as_deref(), Some("tok"));
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn {
                user_id: "u1".into()
            }
        );

        provider.teardown().await;
        assert!(!provider.is_authenticated());
        assert!(provider.user().await.is_none());
        assert!(provider.access_token_cookie().is_none());
        assert!(events.try_recv().is_err());
    }
}
