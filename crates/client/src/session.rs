//! Session primitives: auth state, events, tokens and the cookie mirror.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Name of the cookie route guards read.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Lifetime of the mirrored cookie in seconds (24 hours).
pub const ACCESS_TOKEN_COOKIE_MAX_AGE: u32 = 86_400;

/// Where the storefront sends users whose session ended.
pub const LOGIN_PATH: &str = "/login";

/// Authentication state machine.
///
/// `Unauthenticated → Authenticating → Authenticated`, and back to
/// `Unauthenticated` on logout or on any 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// Login, registration or session validation in flight.
    Authenticating,
    Authenticated,
}

/// Notifications for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user logged in, registered, or a stored session was revalidated.
    LoggedIn { user_id: String },
    /// The user logged out explicitly.
    LoggedOut,
    /// The backend rejected the session (401).
    SessionExpired,
    /// The UI must navigate to `to` (full page load).
    Redirect { to: String },
    /// The cart was re-fetched.
    CartRefreshed { total_items: u32 },
}

/// Access/refresh token pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

impl SessionTokens {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: refresh_token.map(SecretString::from),
        }
    }

    /// `Authorization` header value.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

/// Mirrors the access token into a non-HttpOnly cookie on the storefront
/// origin so server-side route guards can see the session.
#[derive(Debug, Clone)]
pub struct CookieMirror {
    jar: Arc<Jar>,
    origin: Url,
}

impl CookieMirror {
    #[must_use]
    pub fn new(origin: Url) -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            origin,
        }
    }

    /// The underlying jar, for handing to middleware or an HTTP client.
    #[must_use]
    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    #[must_use]
    pub const fn origin(&self) -> &Url {
        &self.origin
    }

    /// Write the cookie with a 24h max-age.
    pub fn set(&self, access_token: &SecretString) {
        let cookie = format!(
            "{ACCESS_TOKEN_COOKIE}={}; Path=/; Max-Age={ACCESS_TOKEN_COOKIE_MAX_AGE}; SameSite=Lax",
            access_token.expose_secret()
        );
        self.jar.add_cookie_str(&cookie, &self.origin);
    }

    /// Expire the cookie.
    pub fn clear(&self) {
        let cookie = format!("{ACCESS_TOKEN_COOKIE}=; Path=/; Max-Age=0; SameSite=Lax");
        self.jar.add_cookie_str(&cookie, &self.origin);
    }

    /// Current cookie value as a route guard would see it.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mirror() -> CookieMirror {
        CookieMirror::new(Url::parse("http://localhost:3000").unwrap())
    }

    #[test]
    fn test_cookie_set_and_clear() {
        let mirror = mirror();
        assert_eq!(mirror.access_token(), None);

        mirror.set(&SecretString::from("abc.def"));
        assert_eq!(mirror.access_token().as_deref(), Some("abc.def"));

        mirror.clear();
        assert_eq!(mirror.access_token(), None);
    }

    #[test]
    fn test_cookie_visible_on_subpaths() {
        let mirror = mirror();
        mirror.set(&SecretString::from("tok"));

        let dashboard = Url::parse("http://localhost:3000/vendor/dashboard").unwrap();
        let header = mirror.jar().cookies(&dashboard).unwrap();
        assert_eq!(header.to_str().unwrap(), "accessToken=tok");
    }

    #[test]
    fn test_bearer_header() {
        let tokens = SessionTokens::new("xyz", None);
        assert_eq!(tokens.bearer(), "Bearer xyz");
        assert!(tokens.refresh_token.is_none());
    }
}
