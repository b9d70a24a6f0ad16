//! Relay configuration and the provider seam the invocation path reads it through.

use std::fmt;

use serde::Deserialize;

/// Key name used by relay namespaces that have not been given a dedicated
/// access policy.
pub const DEFAULT_KEY_NAME: &str = "RootManageSharedAccessKey";

/// Supplies the namespace and credentials for remote invocations.
///
/// Passed explicitly to the invocation runner so tests can substitute fixed
/// values without touching process-wide state.
pub trait ConfigurationProvider: Send + Sync {
    /// Relay namespace host, e.g. `contoso.servicebus.windows.net`.
    fn namespace_address(&self) -> &str;

    /// URI scheme used to reach the namespace (`http` or `https`).
    fn scheme(&self) -> &str;

    /// Shared access key used to sign tokens for every service in the namespace.
    fn shared_key(&self) -> &SharedKey;
}

/// Named shared secret. The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SharedKey {
    name: String,
    value: String,
}

impl SharedKey {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Access policy name the key belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw key material. Callers must not log it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Default for SharedKey {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_NAME, "")
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKey")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Static relay configuration, the default [`ConfigurationProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay namespace host.
    pub namespace_address: String,
    /// URI scheme, `https` unless talking to a local relay.
    pub scheme: String,
    /// Shared access key for the namespace.
    pub shared_key: SharedKey,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            namespace_address: String::new(),
            scheme: "https".to_string(),
            shared_key: SharedKey::default(),
        }
    }
}

impl ConfigurationProvider for RelayConfig {
    fn namespace_address(&self) -> &str {
        &self.namespace_address
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn shared_key(&self) -> &SharedKey {
        &self.shared_key
    }
}
