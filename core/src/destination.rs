//! Upload URL composition.

use std::fmt;

/// Path every upload is posted to.
pub const UPLOAD_PATH: &str = "/upload";

/// Fully composed upload URL: scheme, host, optional port and `/upload`.
///
/// Always carries an explicit `http://` or `https://` scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    url: String,
}

impl Destination {
    /// Compose `host[:port]/upload`, prefixing `http://` when the host does not
    /// already name a scheme. An empty `port` is omitted.
    pub fn compose(host: &str, port: &str) -> Self {
        let mut address = host.to_string();
        if !port.is_empty() {
            address.push(':');
            address.push_str(port);
        }
        if !has_scheme(&address) {
            address.insert_str(0, "http://");
        }
        address.push_str(UPLOAD_PATH);
        Self { url: address }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The part between the scheme and the upload path, i.e. `host[:port]`.
    pub fn authority(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        rest.strip_suffix(UPLOAD_PATH).unwrap_or(rest)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

fn has_scheme(address: &str) -> bool {
    address.starts_with("http://") || address.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_onion_host_gets_http_scheme() {
        let dest = Destination::compose("abcdefghijklmnop.onion", "");
        assert_eq!(dest.as_str(), "http://abcdefghijklmnop.onion/upload");
    }

    #[test]
    fn port_is_appended_before_path() {
        let dest = Destination::compose("abcdefghijklmnop.onion", "8080");
        assert_eq!(dest.as_str(), "http://abcdefghijklmnop.onion:8080/upload");
        assert_eq!(dest.authority(), "abcdefghijklmnop.onion:8080");
    }

    #[test]
    fn existing_https_scheme_is_kept() {
        let dest = Destination::compose("https://example.onion", "443");
        assert_eq!(dest.as_str(), "https://example.onion:443/upload");
    }

    #[test]
    fn existing_http_scheme_is_not_doubled() {
        let dest = Destination::compose("http://example.onion", "");
        assert_eq!(dest.as_str(), "http://example.onion/upload");
    }

    #[test]
    fn scheme_check_is_prefix_only() {
        // "ftp://" is not a recognised scheme, so http:// is still prepended.
        let dest = Destination::compose("ftp://example.onion", "");
        assert_eq!(dest.as_str(), "http://ftp://example.onion/upload");
    }

    #[test]
    fn display_matches_as_str() {
        let dest = Destination::compose("example.onion", "80");
        assert_eq!(dest.to_string(), dest.as_str());
    }
}
