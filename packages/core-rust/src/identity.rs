use crate::config::ConfigurationProvider;
use crate::endpoint::{resolve, Endpoint};
use crate::error::ConfigError;

/// Identifies a remote service reachable through a relay namespace.
///
/// Built once per call from configuration plus the target service name and
/// read-only afterwards. Validation is deferred to [`ServiceIdentity::endpoint`]
/// so that malformed identities surface as [`ConfigError`] at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity {
    namespace_address: String,
    service_name: String,
    scheme: String,
}

impl ServiceIdentity {
    #[must_use]
    pub fn new(
        namespace_address: impl Into<String>,
        service_name: impl Into<String>,
        scheme: impl Into<String>,
    ) -> Self {
        Self {
            namespace_address: namespace_address.into(),
            service_name: service_name.into(),
            scheme: scheme.into(),
        }
    }

    /// Builds the identity of `service_name` within the configured namespace.
    #[must_use]
    pub fn from_config(config: &dyn ConfigurationProvider, service_name: &str) -> Self {
        Self::new(config.namespace_address(), service_name, config.scheme())
    }

    #[must_use]
    pub fn namespace_address(&self) -> &str {
        &self.namespace_address
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Resolves this identity into a fully-qualified endpoint.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        resolve(&self.scheme, &self.namespace_address, &self.service_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RelayConfig, SharedKey};

    #[test]
    fn endpoint_uses_all_three_parts() {
        let identity = ServiceIdentity::new("myns", "mysvc", "https");
        assert_eq!(identity.endpoint().unwrap().as_str(), "https://myns/mysvc");
    }

    #[test]
    fn from_config_takes_namespace_and_scheme() {
        let config = RelayConfig {
            namespace_address: "contoso.servicebus.windows.net".to_string(),
            scheme: "http".to_string(),
            shared_key: SharedKey::new("RootManageSharedAccessKey", "c2VjcmV0"),
        };
        let identity = ServiceIdentity::from_config(&config, "inventory");
        assert_eq!(identity.namespace_address(), "contoso.servicebus.windows.net");
        assert_eq!(identity.service_name(), "inventory");
        assert_eq!(identity.scheme(), "http");
    }

    #[test]
    fn malformed_identity_fails_at_resolution() {
        let identity = ServiceIdentity::new("myns", "", "https");
        assert!(identity.endpoint().is_err());
    }
}
