//! The logged-in user's own profile.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::{CommerceProvider, decode, message_or, nested, validate};
use crate::error::{ClientError, Result};
use crate::http::ApiRequest;
use crate::types::{ProfileUpdate, User};

impl CommerceProvider {
    /// Fetch the profile and replace the cached user with it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a session and
    /// `ClientError::Unauthorized` if the session was rejected.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<User> {
        self.require_session().await?;
        let value = self.api_call(ApiRequest::get("/profile")).await?;
        let user = decode_user(value)?;
        self.store_user(&user).await?;
        Ok(user)
    }

    /// Update profile fields. The stored user is replaced with the
    /// backend's answer.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank name and
    /// `ClientError::NotAuthenticated` without a session.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ClientError::Validation("Name cannot be empty".to_string()));
        }
        self.require_session().await?;

        let request = ApiRequest::patch("/profile").json(update)?;
        let user = decode_user(self.api_call(request).await?)?;
        self.store_user(&user).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Change the password. Returns the backend's message.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the new password is too short or
    /// equals the current one.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<String> {
        if current.expose_secret().is_empty() {
            return Err(ClientError::Validation(
                "Current password is required".to_string(),
            ));
        }
        validate::password(new.expose_secret())?;
        if current.expose_secret() == new.expose_secret() {
            return Err(ClientError::Validation(
                "New password must differ from the current one".to_string(),
            ));
        }
        self.require_session().await?;

        let request = ApiRequest::patch("/profile/password").json(&json!({
            "currentPassword": current.expose_secret(),
            "newPassword": new.expose_secret(),
        }))?;
        let value = self.api_call(request).await?;
        Ok(message_or(&value, "Password updated"))
    }
}

/// Profile endpoints answer with the user bare or as `{"user": {...}}`.
fn decode_user(value: Value) -> Result<User> {
    decode(nested(value, "user"))
}
