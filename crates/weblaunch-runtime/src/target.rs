//! Host/port extraction from the configured URL.

use std::net::{SocketAddr, ToSocketAddrs};

use weblaunch_core::error::LaunchError;

/// The TCP endpoint behind an `http(s)://host[:port][/path]` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTarget {
    pub host: String,
    pub port: u16,
}

impl HttpTarget {
    pub fn parse(url: &str) -> Result<Self, LaunchError> {
        let invalid = |reason: &str| LaunchError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;
        let default_port = match scheme.to_ascii_lowercase().as_str() {
            "http" => 80,
            "https" => 443,
            _ => return Err(invalid("unsupported scheme")),
        };

        let authority = rest
            .split(|c: char| matches!(c, '/' | '?' | '#'))
            .next()
            .unwrap_or_default();
        let authority = authority.rsplit('@').next().unwrap_or(authority);
        if authority.is_empty() {
            return Err(invalid("missing host"));
        }

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, after) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated IPv6 literal"))?;
            (host, after.strip_prefix(':'))
        } else {
            match authority.rsplit_once(':') {
                Some((h, p)) => (h, Some(p)),
                None => (authority, None),
            }
        };
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let port = match port {
            Some(p) => p.parse::<u16>().map_err(|_| invalid("invalid port"))?,
            None => default_port,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// All socket addresses the host resolves to. `localhost` usually yields
    /// both 127.0.0.1 and ::1; the application may be bound to either.
    pub fn socket_addrs(&self) -> Vec<SocketAddr> {
        match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                tracing::debug!(host = %self.host, "address resolution failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let t = HttpTarget::parse("http://localhost:8000").unwrap();
        assert_eq!(t, HttpTarget { host: "localhost".into(), port: 8000 });
    }

    #[test]
    fn test_path_query_and_default_ports() {
        let t = HttpTarget::parse("http://127.0.0.1/static/index.html?x=1").unwrap();
        assert_eq!(t.port, 80);
        assert_eq!(t.host, "127.0.0.1");
        let t = HttpTarget::parse("HTTPS://example.com").unwrap();
        assert_eq!(t.port, 443);
    }

    #[test]
    fn test_ipv6_literal() {
        let t = HttpTarget::parse("http://[::1]:8000/").unwrap();
        assert_eq!(t, HttpTarget { host: "::1".into(), port: 8000 });
    }

    #[test]
    fn test_rejects_bad_urls() {
        for url in ["localhost:8000", "ftp://host", "http://", "http://host:99999", "http://[::1"] {
            let err = HttpTarget::parse(url).unwrap_err();
            assert!(matches!(err, LaunchError::InvalidUrl { .. }), "{url}");
        }
    }

    #[test]
    fn test_localhost_resolves_to_loopback() {
        let t = HttpTarget::parse("http://localhost:8000").unwrap();
        let addrs = t.socket_addrs();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|a| a.ip().is_loopback() && a.port() == 8000));
    }
}
