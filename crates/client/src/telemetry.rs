//! Tracing and Sentry setup for applications embedding the client.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ClientError;
use crate::types::User;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "solar_market_client=info";

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install a global subscriber: `EnvFilter` from `RUST_LOG` (falling back to
/// [`DEFAULT_FILTER`]), a `fmt` layer, and the Sentry layer.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init()
        .is_ok()
}

/// Associate subsequent Sentry events with the logged-in user.
pub fn set_sentry_user(user: &User) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.clone()),
            ..Default::default()
        }));
        scope.set_tag("role", user.role);
    });
}

/// Forget the Sentry user after the session ends.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Send unexpected failures to Sentry. Expected ones are ignored.
///
/// This is the only place a failed call is captured. The log line stays
/// below ERROR so the Sentry layer does not turn it into a second event.
pub(crate) fn report(err: &ClientError) {
    if err.is_reportable() {
        let event_id = sentry::capture_error(err);
        tracing::warn!(
            error = %err,
            sentry_event_id = %event_id,
            "Backend call failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_server_error_becomes_one_event() {
        let events = sentry::test::with_captured_events(|| {
            let subscriber = tracing_subscriber::registry()
                .with(sentry_tracing::layer().event_filter(sentry_event_filter));
            tracing::subscriber::with_default(subscriber, || {
                report(&ClientError::api(StatusCode::BAD_GATEWAY, None));
                report(&ClientError::Validation("Quantity must be at least 1".into()));
                report(&ClientError::api(StatusCode::NOT_FOUND, None));
            });
        });
        assert_eq!(events.len(), 1);
    }
}
