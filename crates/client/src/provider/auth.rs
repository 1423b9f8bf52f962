//! Authentication: login, registration, logout, token refresh and email
//! verification.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use solar_market_core::Role;
use tracing::{debug, info, instrument};

use super::{CommerceProvider, decode, message_or, nested, validate};
use crate::error::{ClientError, Result};
use crate::http::ApiRequest;
use crate::session::{AuthState, SessionEvent, SessionTokens};
use crate::storage::StorageKey;
use crate::types::{User, VendorRegistration, VerificationState};

/// New account details for `POST /auth/register`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Role,
    pub phone: Option<String>,
    /// Required when `role` is [`Role::Vendor`].
    pub vendor: Option<VendorRegistration>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor_info: Option<&'a VendorRegistration>,
}

/// Login/registration response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    #[serde(default, alias = "token")]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    user: User,
}

/// `POST /auth/refresh` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    #[serde(alias = "token")]
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl CommerceProvider {
    /// Log in with email and password.
    ///
    /// On success the session is persisted, the access-token cookie is set,
    /// and the cart is loaded.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a malformed email or empty
    /// password, and `ClientError::Api` when the backend rejects the
    /// credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User> {
        let email = validate::email(email)?;
        if password.expose_secret().is_empty() {
            return Err(ClientError::Validation("Password is required".to_string()));
        }

        let request = ApiRequest::post("/auth/login").json(&json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        }))?;
        self.authenticate(request).await
    }

    /// Create an account.
    ///
    /// If the backend issues tokens right away the new user is logged in as
    /// with [`login`](Self::login); otherwise (email verification pending) the
    /// user is returned and the provider stays logged out.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for missing or malformed fields, and
    /// `ClientError::Api` when the backend refuses the registration.
    #[instrument(skip(self, registration), fields(email = %registration.email, role = %registration.role))]
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        validate::registration(registration)?;

        let body = RegisterBody {
            name: registration.name.trim(),
            email: registration.email.trim(),
            password: registration.password.expose_secret(),
            role: registration.role,
            phone: registration.phone.as_deref(),
            vendor_info: registration.vendor.as_ref(),
        };
        let request = ApiRequest::post("/auth/register").json(&body)?;
        self.authenticate(request).await
    }

    /// Shared tail of login and registration.
    async fn authenticate(&self, request: ApiRequest) -> Result<User> {
        let previous = self.inner.auth_state.send_replace(AuthState::Authenticating);

        let payload = match self.public_call(request).await.and_then(decode::<AuthPayload>) {
            Ok(payload) => payload,
            Err(e) => {
                self.inner.auth_state.send_replace(previous);
                return Err(e);
            }
        };

        let Some(access_token) = payload.access_token else {
            info!(user_id = %payload.user.id, "Account created, awaiting verification");
            self.inner.auth_state.send_replace(previous);
            return Ok(payload.user);
        };

        let user = payload.user;
        let tokens = SessionTokens::new(access_token, payload.refresh_token);
        if let Err(e) = self.establish_session(tokens, user.clone()).await {
            self.teardown().await;
            return Err(e);
        }
        info!(user_id = %user.id, role = %user.role, "Logged in");

        self.load_cart_quietly().await;
        Ok(user)
    }

    /// End the session.
    ///
    /// The backend is told with `POST /auth/logout` when a session exists,
    /// but local state is cleared whether or not that succeeds.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let tokens = self.inner.tokens.read().await.clone();
        if let Some(tokens) = tokens {
            let body = json!({
                "refreshToken": tokens.refresh_token.as_ref().map(|t| t.expose_secret().to_string()),
            });
            let sent = match ApiRequest::post("/auth/logout").json(&body) {
                Ok(request) => self.inner.http.send(&request, Some(&tokens)).await.map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                debug!(error = %e, "Logout request failed, clearing session anyway");
            }
        }

        self.teardown().await;
        self.emit(SessionEvent::LoggedOut);
        info!("Logged out");
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a refresh token and
    /// `ClientError::Unauthorized` if the backend rejects it (the session is
    /// then torn down).
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<()> {
        let refresh_token = self
            .inner
            .tokens
            .read()
            .await
            .as_ref()
            .and_then(|tokens| tokens.refresh_token.clone())
            .ok_or(ClientError::NotAuthenticated)?;

        let request = ApiRequest::post("/auth/refresh").json(&json!({
            "refreshToken": refresh_token.expose_secret(),
        }))?;
        let payload: TokenPayload = self.api_call_as(request).await?;

        // Keep the old refresh token unless the backend rotated it
        let refresh = payload
            .refresh_token
            .unwrap_or_else(|| refresh_token.expose_secret().to_string());
        let tokens = SessionTokens::new(payload.access_token, Some(refresh));

        let storage = &self.inner.storage;
        storage.set(StorageKey::AccessToken, tokens.access_token.expose_secret())?;
        if let Some(refresh) = &tokens.refresh_token {
            storage.set(StorageKey::RefreshToken, refresh.expose_secret())?;
        }
        self.inner.cookies.set(&tokens.access_token);
        *self.inner.tokens.write().await = Some(tokens);

        debug!("Access token refreshed");
        Ok(())
    }

    /// Ask the backend whether the user's email is verified, and record the
    /// answer on the cached user.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn verify_status(&self) -> Result<VerificationState> {
        self.require_session().await?;
        let state: VerificationState = self
            .api_call_as(ApiRequest::get("/auth/verify-status"))
            .await?;
        self.mark_email_verified(state.is_email_verified).await?;
        Ok(state)
    }

    /// Send the verification email again. Returns the backend's message.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self))]
    pub async fn resend_verification(&self) -> Result<String> {
        self.require_session().await?;
        let value = self
            .api_call(ApiRequest::post("/auth/resend-verification"))
            .await?;
        Ok(message_or(&value, "Verification email sent"))
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a malformed email.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let email = validate::email(email)?;
        let request = ApiRequest::post("/auth/forgot-password").json(&json!({
            "email": email.as_str(),
        }))?;
        let value = self.public_call(request).await?;
        Ok(message_or(&value, "Password reset email sent"))
    }

    /// Set a new password using the token from a reset email.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an empty token or a short
    /// password.
    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &SecretString) -> Result<String> {
        if token.trim().is_empty() {
            return Err(ClientError::Validation("Reset token is required".to_string()));
        }
        validate::password(password.expose_secret())?;

        let request = ApiRequest::post("/auth/reset-password").json(&json!({
            "token": token,
            "password": password.expose_secret(),
        }))?;
        let value = self.public_call(request).await?;
        Ok(message_or(&value, "Password has been reset"))
    }

    /// Confirm an email address with the token from the verification link.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an empty token.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<String> {
        if token.trim().is_empty() {
            return Err(ClientError::Validation(
                "Verification token is required".to_string(),
            ));
        }

        let request = ApiRequest::get("/auth/verify-email").query(&json!({ "token": token }))?;
        let value = self.public_call(request).await?;
        self.mark_email_verified(true).await?;

        // Some deployments answer with the refreshed user
        let current = self.inner.user.read().await.as_ref().map(|u| u.id.clone());
        if let Ok(user) = serde_json::from_value::<User>(nested(value.clone(), "user"))
            && current.as_ref() == Some(&user.id)
        {
            self.store_user(&user).await?;
        }
        Ok(message_or(&value, "Email verified"))
    }

    async fn mark_email_verified(&self, verified: bool) -> Result<()> {
        let user = self.inner.user.read().await.clone();
        match user {
            Some(mut user) if user.is_email_verified != verified => {
                user.is_email_verified = verified;
                self.store_user(&user).await
            }
            Some(_) => Ok(()),
            None => {
                debug!(verified, "No user loaded, verification not recorded");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_register_body_shape() {
        let vendor = VendorRegistration {
            business_name: "Sunny Panels".into(),
            ..VendorRegistration::default()
        };
        let body = RegisterBody {
            name: "Ada",
            email: "ada@example.com",
            password: "secret1",
            role: Role::Vendor,
            phone: None,
            vendor_info: Some(&vendor),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret1",
                "role": "vendor",
                "vendorInfo": { "businessName": "Sunny Panels" }
            })
        );
    }

    #[test]
    fn test_auth_payload_accepts_token_alias() {
        let payload: AuthPayload = serde_json::from_value(json!({
            "token": "abc",
            "user": { "_id": "u1", "name": "Ada", "email": "ada@example.com", "role": "customer" }
        }))
        .unwrap();
        assert_eq!(payload.access_token.as_deref(), Some("abc"));
        assert!(payload.refresh_token.is_none());
        assert_eq!(payload.user.role, Role::Customer);
    }

    #[test]
    fn test_auth_payload_without_tokens() {
        let payload: AuthPayload = serde_json::from_value(json!({
            "message": "Check your inbox",
            "user": { "id": "u2", "name": "Bo", "email": "bo@example.com", "role": "vendor" }
        }))
        .unwrap();
        assert!(payload.access_token.is_none());
    }
}
