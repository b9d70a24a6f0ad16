//! Shared Access Signature tokens derived from a namespace shared key.
//!
//! A token grants access to exactly one resource URI until its expiry. It is
//! computed as HMAC-SHA256 over `"{encoded_uri}\n{expiry}"` with the raw key
//! bytes, then rendered as
//! `SharedAccessSignature sr=<uri>&sig=<signature>&se=<expiry>&skn=<key name>`.
//!
//! Neither the key nor the rendered token is ever logged: both types redact
//! themselves in `Debug` output.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::SharedKey;
use crate::encode::percent_encode;
use crate::error::ConfigError;
use crate::identity::ServiceIdentity;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

const TOKEN_PREFIX: &str = "SharedAccessSignature";

/// Abstraction over the wall clock so token expiry is testable.
pub trait ClockSource: Send + Sync {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now(&self) -> u64;
}

/// Clock source that reads the real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Short-lived credential attached to every request a channel sends.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
    issued_for: ServiceIdentity,
    expires_at: u64,
}

impl AuthToken {
    /// Wraps an already-rendered token value.
    #[must_use]
    pub fn new(value: impl Into<String>, issued_for: ServiceIdentity, expires_at: u64) -> Self {
        Self {
            value: value.into(),
            issued_for,
            expires_at,
        }
    }

    /// The rendered token, suitable for an authorization header. Never log it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// The identity this token was signed for.
    #[must_use]
    pub fn issued_for(&self) -> &ServiceIdentity {
        &self.issued_for
    }

    /// Expiry in seconds since Unix epoch.
    #[must_use]
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Whether the token has expired at `now_secs` (seconds since Unix epoch).
    #[must_use]
    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        now_secs >= self.expires_at
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("issued_for", &self.issued_for)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Produces tokens for a target identity from a shared key.
pub trait TokenProvider: Send + Sync {
    /// Creates a token granting access to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] if the key is empty or the
    /// target does not resolve to a valid endpoint.
    fn create_token(
        &self,
        shared_key: &SharedKey,
        target: &ServiceIdentity,
    ) -> Result<AuthToken, ConfigError>;
}

/// Signs Shared Access Signature tokens with HMAC-SHA256.
#[derive(Clone)]
pub struct SharedAccessSignatureProvider {
    ttl: Duration,
    clock: Arc<dyn ClockSource>,
}

impl SharedAccessSignatureProvider {
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn ClockSource>) -> Self {
        Self { ttl, clock }
    }
}

impl Default for SharedAccessSignatureProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_TTL, Arc::new(SystemClock))
    }
}

impl fmt::Debug for SharedAccessSignatureProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedAccessSignatureProvider")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenProvider for SharedAccessSignatureProvider {
    fn create_token(
        &self,
        shared_key: &SharedKey,
        target: &ServiceIdentity,
    ) -> Result<AuthToken, ConfigError> {
        if shared_key.is_empty() {
            return Err(ConfigError::invalid("shared_key", "must not be empty"));
        }
        if shared_key.name().is_empty() {
            return Err(ConfigError::invalid(
                "shared_key",
                "key name must not be empty",
            ));
        }

        let endpoint = target.endpoint()?;
        let resource = percent_encode(&endpoint.as_str().to_lowercase());
        let expires_at = (self.clock.now() / 1000).saturating_add(self.ttl.as_secs());

        let signature = sign(shared_key.expose(), &format!("{resource}\n{expires_at}"))?;
        let value = format!(
            "{TOKEN_PREFIX} sr={resource}&sig={}&se={expires_at}&skn={}",
            percent_encode(&signature),
            percent_encode(shared_key.name()),
        );

        tracing::debug!(
            service = target.service_name(),
            expires_at,
            "issued shared access signature"
        );

        Ok(AuthToken::new(value, target.clone(), expires_at))
    }
}

/// Base64 of HMAC-SHA256 over `data` keyed with the UTF-8 bytes of `key`.
fn sign(key: &str, data: &str) -> Result<String, ConfigError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes())
        .map_err(|e| ConfigError::invalid("shared_key", e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clock pinned to a fixed instant.
    struct FixedClock(u64);

    impl ClockSource for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    fn provider_at(millis: u64) -> SharedAccessSignatureProvider {
        SharedAccessSignatureProvider::new(DEFAULT_TOKEN_TTL, Arc::new(FixedClock(millis)))
    }

    fn identity() -> ServiceIdentity {
        ServiceIdentity::new("myns", "mysvc", "https")
    }

    fn key() -> SharedKey {
        SharedKey::new("RootManageSharedAccessKey", "c2VjcmV0LWtleQ==")
    }

    /// Splits `SharedAccessSignature a=1&b=2` into its fields.
    fn fields(token: &str) -> Vec<(String, String)> {
        let body = token.strip_prefix("SharedAccessSignature ").unwrap();
        body.split('&')
            .map(|kv| {
                let (k, v) = kv.split_once('=').unwrap();
                (k.to_string(), v.to_string())
            })
            .collect()
    }

    #[test]
    fn token_has_expected_fields() {
        let token = provider_at(1_700_000_000_000)
            .create_token(&key(), &identity())
            .unwrap();
        let fields = fields(token.expose());
        let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["sr", "sig", "se", "skn"]);
        assert_eq!(fields[0].1, "https%3A%2F%2Fmyns%2Fmysvc");
        assert_eq!(fields[2].1, "1700003600");
        assert_eq!(fields[3].1, "RootManageSharedAccessKey");
    }

    #[test]
    fn signature_is_hmac_over_resource_and_expiry() {
        let token = provider_at(1_700_000_000_000)
            .create_token(&key(), &identity())
            .unwrap();
        let expected = sign(key().expose(), "https%3A%2F%2Fmyns%2Fmysvc\n1700003600").unwrap();
        assert_eq!(fields(token.expose())[1].1, percent_encode(&expected));
    }

    #[test]
    fn expiry_follows_ttl() {
        let provider = SharedAccessSignatureProvider::new(
            Duration::from_secs(60),
            Arc::new(FixedClock(5_000)),
        );
        let token = provider.create_token(&key(), &identity()).unwrap();
        assert_eq!(token.expires_at(), 65);
        assert!(!token.is_expired_at(64));
        assert!(token.is_expired_at(65));
    }

    #[test]
    fn huge_ttl_saturates_expiry() {
        let provider = SharedAccessSignatureProvider::new(
            Duration::from_secs(u64::MAX),
            Arc::new(FixedClock(1_700_000_000_000)),
        );
        let token = provider.create_token(&key(), &identity()).unwrap();
        assert_eq!(token.expires_at(), u64::MAX);
        assert!(token.expose().contains(&format!("&se={}&", u64::MAX)));
    }

    #[test]
    fn same_inputs_same_token() {
        let provider = provider_at(42_000);
        let a = provider.create_token(&key(), &identity()).unwrap();
        let b = provider.create_token(&key(), &identity()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_key_changes_signature() {
        let provider = provider_at(42_000);
        let a = provider.create_token(&key(), &identity()).unwrap();
        let b = provider
            .create_token(&SharedKey::new("RootManageSharedAccessKey", "other"), &identity())
            .unwrap();
        assert_ne!(fields(a.expose())[1], fields(b.expose())[1]);
    }

    #[test]
    fn resource_uri_is_lowercased() {
        let target = ServiceIdentity::new("MyNS", "MySvc", "https");
        let token = provider_at(0).create_token(&key(), &target).unwrap();
        assert_eq!(fields(token.expose())[0].1, "https%3A%2F%2Fmyns%2Fmysvc");
    }

    #[test]
    fn token_remembers_target() {
        let token = provider_at(0).create_token(&key(), &identity()).unwrap();
        assert_eq!(token.issued_for(), &identity());
    }

    #[test]
    fn empty_key_is_configuration_error() {
        let err = provider_at(0)
            .create_token(&SharedKey::new("RootManageSharedAccessKey", ""), &identity())
            .unwrap_err();
        assert_eq!(err.field(), "shared_key");
    }

    #[test]
    fn empty_key_name_is_configuration_error() {
        let err = provider_at(0)
            .create_token(&SharedKey::new("", "abc"), &identity())
            .unwrap_err();
        assert_eq!(err.field(), "shared_key");
    }

    #[test]
    fn malformed_target_is_configuration_error() {
        let target = ServiceIdentity::new("myns", "mysvc", "ftp");
        let err = provider_at(0).create_token(&key(), &target).unwrap_err();
        assert_eq!(err.field(), "scheme");
    }

    #[test]
    fn debug_output_redacts_token_value() {
        let token = provider_at(0).create_token(&key(), &identity()).unwrap();
        let rendered = format!("{token:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("SharedAccessSignature"));
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800_000);
    }
}
