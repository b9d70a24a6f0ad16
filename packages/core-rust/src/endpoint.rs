//! Endpoint resolution: `scheme://namespace/service` composition and validation.
//!
//! A relay-hosted service is addressed by the namespace it is published under
//! and its service name, never by a direct network address. Resolution is a
//! pure string composition; nothing here touches the network.

use std::fmt;
use std::str::FromStr;

use crate::encode::percent_encode;
use crate::error::ConfigError;

/// Transport scheme accepted by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain HTTP. Only meaningful against local relays and test doubles.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URI.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ConfigError::invalid("scheme", "must not be empty"));
        }
        if s.eq_ignore_ascii_case("http") {
            Ok(Self::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Self::Https)
        } else {
            Err(ConfigError::invalid(
                "scheme",
                format!("unrecognized scheme `{s}`, expected `http` or `https`"),
            ))
        }
    }
}

/// A fully-qualified, validated service URI. Only [`resolve`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    scheme: Scheme,
    uri: String,
}

impl Endpoint {
    /// The scheme the URI was resolved with.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The URI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Appends an operation name as a final, percent-encoded path segment.
    #[must_use]
    pub fn join_operation(&self, operation: &str) -> String {
        format!("{}/{}", self.uri, percent_encode(operation))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// Builds `scheme://namespace_address/service_name`.
///
/// Leading and trailing `/` are trimmed from both the namespace and the
/// service name. Each `/`-separated segment of the service name is
/// percent-encoded; the namespace is taken verbatim after validation.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfiguration`] when any input is empty, the
/// scheme is not `http`/`https`, the namespace already carries a scheme or
/// contains characters that cannot appear in an authority, or the service
/// name contains an empty path segment.
///
/// # Examples
///
/// ```
/// use relaycall_core::endpoint::resolve;
///
/// let endpoint = resolve("https", "myns", "mysvc").unwrap();
/// assert_eq!(endpoint.as_str(), "https://myns/mysvc");
/// assert!(resolve("", "myns", "mysvc").is_err());
/// ```
pub fn resolve(
    scheme: &str,
    namespace_address: &str,
    service_name: &str,
) -> Result<Endpoint, ConfigError> {
    let scheme: Scheme = scheme.parse()?;

    let namespace = namespace_address.trim_matches('/');
    if namespace.is_empty() {
        return Err(ConfigError::invalid(
            "namespace_address",
            "must not be empty",
        ));
    }
    if namespace.contains("://") {
        return Err(ConfigError::invalid(
            "namespace_address",
            "must not carry a scheme, configure it separately",
        ));
    }
    if let Some(c) = namespace
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'))
    {
        return Err(ConfigError::invalid(
            "namespace_address",
            format!("contains illegal character {c:?}"),
        ));
    }

    let service = service_name.trim_matches('/');
    if service.is_empty() {
        return Err(ConfigError::invalid("service_name", "must not be empty"));
    }
    let mut path = String::with_capacity(service.len());
    for (i, segment) in service.split('/').enumerate() {
        if segment.is_empty() {
            return Err(ConfigError::invalid(
                "service_name",
                "contains an empty path segment",
            ));
        }
        if i > 0 {
            path.push('/');
        }
        path.push_str(&percent_encode(segment));
    }

    Ok(Endpoint {
        scheme,
        uri: format!("{scheme}://{namespace}/{path}"),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn resolves_https_endpoint() {
        let endpoint = resolve("https", "myns", "mysvc").unwrap();
        assert_eq!(endpoint.as_str(), "https://myns/mysvc");
        assert_eq!(endpoint.scheme(), Scheme::Https);
    }

    #[test]
    fn resolves_http_endpoint() {
        let endpoint = resolve("http", "localhost:9090", "orders").unwrap();
        assert_eq!(endpoint.to_string(), "http://localhost:9090/orders");
        assert_eq!(endpoint.scheme(), Scheme::Http);
    }

    #[test]
    fn scheme_is_case_insensitive_and_normalized() {
        let endpoint = resolve("HTTPS", "myns", "mysvc").unwrap();
        assert_eq!(endpoint.as_str(), "https://myns/mysvc");
    }

    #[test]
    fn empty_scheme_is_invalid_configuration() {
        let err = resolve("", "myns", "mysvc").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidConfiguration { field: "scheme", .. }
        ));
    }

    #[test]
    fn unknown_scheme_is_invalid_configuration() {
        let err = resolve("sb", "myns", "mysvc").unwrap_err();
        assert_eq!(err.field(), "scheme");
    }

    #[test]
    fn empty_namespace_is_invalid_configuration() {
        let err = resolve("https", "", "mysvc").unwrap_err();
        assert_eq!(err.field(), "namespace_address");
        let err = resolve("https", "//", "mysvc").unwrap_err();
        assert_eq!(err.field(), "namespace_address");
    }

    #[test]
    fn empty_service_name_is_invalid_configuration() {
        let err = resolve("https", "myns", "").unwrap_err();
        assert_eq!(err.field(), "service_name");
    }

    #[test]
    fn namespace_with_scheme_is_rejected() {
        let err = resolve("https", "https://myns", "mysvc").unwrap_err();
        assert_eq!(err.field(), "namespace_address");
    }

    #[test]
    fn surrounding_slashes_are_trimmed() {
        let endpoint = resolve("https", "myns.servicebus.windows.net/", "/mysvc/").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://myns.servicebus.windows.net/mysvc"
        );
    }

    #[test]
    fn nested_service_path_keeps_separators() {
        let endpoint = resolve("https", "myns", "billing/v2/invoices").unwrap();
        assert_eq!(endpoint.as_str(), "https://myns/billing/v2/invoices");
    }

    #[test]
    fn service_segments_are_percent_encoded() {
        let endpoint = resolve("https", "myns", "my svc").unwrap();
        assert_eq!(endpoint.as_str(), "https://myns/my%20svc");
    }

    #[test]
    fn empty_service_segment_is_rejected() {
        let err = resolve("https", "myns", "a//b").unwrap_err();
        assert_eq!(err.field(), "service_name");
    }

    #[test]
    fn join_operation_appends_encoded_segment() {
        let endpoint = resolve("https", "myns", "mysvc").unwrap();
        assert_eq!(
            endpoint.join_operation("Get Status"),
            "https://myns/mysvc/Get%20Status"
        );
    }

    proptest! {
        #[test]
        fn simple_names_compose_verbatim(
            ns in "[a-z][a-z0-9-]{0,30}",
            svc in "[A-Za-z][A-Za-z0-9_.-]{0,30}",
        ) {
            let endpoint = resolve("https", &ns, &svc).unwrap();
            prop_assert_eq!(endpoint.as_str(), format!("https://{ns}/{svc}"));
        }

        #[test]
        fn resolution_is_deterministic(
            ns in "[a-z]{1,12}",
            svc in "\\PC{1,24}",
        ) {
            let first = resolve("http", &ns, &svc);
            let second = resolve("http", &ns, &svc);
            prop_assert_eq!(first, second);
        }
    }
}
