use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::{REFERER, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use mayfly_shortener::ClickMetadata;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Click details read from the redirect request.
#[derive(Debug, Clone, Default)]
pub struct ClickContext(pub ClickMetadata);

impl<S> FromRequestParts<S> for ClickContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self(ClickMetadata {
            referrer: header_str(&parts.headers, REFERER.as_str()),
            user_agent: header_str(&parts.headers, USER_AGENT.as_str()),
            ip_address: client_ip(&parts.headers, peer),
        }))
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Client address, preferring proxy headers over the socket peer.
///
/// Order: first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer.
/// Header values that are not IP addresses are skipped.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = header_str(headers, X_FORWARDED_FOR)
        .and_then(|xff| xff.split(',').next().map(|first| first.trim().to_string()));
    let real_ip = header_str(headers, X_REAL_IP).map(|ip| ip.trim().to_string());

    [forwarded, real_ip]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.parse::<IpAddr>().is_ok())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:5555".parse().unwrap())
    }

    #[test]
    fn forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.1, 10.0.0.1"),
        );
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.2"));

        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("203.0.113.1"));
    }

    #[test]
    fn real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("198.51.100.2"));

        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("192.0.2.10"));
        assert_eq!(client_ip(&headers, None), None);
    }

    #[test]
    fn garbage_headers_fall_through() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("unknown"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("::1"));

        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("::1"));
    }
}
