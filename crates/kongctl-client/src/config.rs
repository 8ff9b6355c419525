//! Admin API address parsing and standing headers.

use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{Error, Result};

/// Scheme and host of the admin API, split from a `scheme://host` URL.
///
/// Only the scheme and authority are kept; any path on the configured URL is
/// discarded, since resource paths are supplied per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUrl {
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// Host, including an optional port.
    pub host: String,
}

impl FromStr for AdminUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| malformed(s))?;

        // Keep only the authority part of whatever follows the scheme.
        let host = rest.split('/').next().unwrap_or_default();
        if scheme.is_empty() || host.is_empty() {
            return Err(malformed(s));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
        })
    }
}

impl fmt::Display for AdminUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

fn malformed(url: &str) -> Error {
    Error::Config(format!(
        "unable to parse admin URL `{url}`: expected scheme://host"
    ))
}

/// Build the standing header map for basic-token authentication.
///
/// # Errors
///
/// Returns [`Error::Config`] when the token is empty or contains bytes that
/// are not valid in a header value.
pub fn basic_auth_header(token: &str) -> Result<HeaderMap> {
    if token.is_empty() {
        return Err(Error::Config(
            "an admin token is required (--auth or KONG_ADMIN_TOKEN)".to_string(),
        ));
    }

    let value = HeaderValue::from_str(&format!("Basic {token}"))
        .map_err(|e| Error::Config(format!("invalid admin token: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheme_and_host() {
        let url: AdminUrl = "http://127.0.0.1:8001".parse().unwrap();
        assert_eq!(url.scheme, "http");
        assert_eq!(url.host, "127.0.0.1:8001");
        assert_eq!(url.to_string(), "http://127.0.0.1:8001");
    }

    #[test]
    fn discards_trailing_path() {
        let url: AdminUrl = "https://kong.internal:8444/ignored/path".parse().unwrap();
        assert_eq!(url.scheme, "https");
        assert_eq!(url.host, "kong.internal:8444");
    }

    #[test]
    fn rejects_missing_scheme() {
        let err = "127.0.0.1:8001".parse::<AdminUrl>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("127.0.0.1:8001"));
    }

    #[test]
    fn rejects_empty_host() {
        assert!("http://".parse::<AdminUrl>().is_err());
        assert!("://host".parse::<AdminUrl>().is_err());
    }

    #[test]
    fn basic_auth_header_sets_authorization() {
        let headers = basic_auth_header("c2VjcmV0").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic c2VjcmV0");
    }

    #[test]
    fn basic_auth_header_rejects_empty_token() {
        assert!(matches!(basic_auth_header(""), Err(Error::Config(_))));
    }
}
