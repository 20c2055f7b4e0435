//! HTTP client construction
//!
//! Builds the shared reqwest client with the streaming-friendly timeout and
//! the proxy resolution order the original tool used: proxy environment
//! variables first, then a `proxy.txt` next to the binary or under the
//! user's config directory.

use crate::errors::Result;
use reqwest::{Client, Proxy};
use std::path::PathBuf;
use std::time::Duration;

/// Streaming responses can stay open for minutes
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Create the HTTP client used for every provider request
pub fn new_client() -> Result<Client> {
    let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

    if let Some(addr) = resolve_proxy() {
        if let Ok(proxy) = Proxy::all(&addr) {
            builder = builder.proxy(proxy);
        } else {
            eprintln!("Warning: Invalid proxy format {:?}, must start with http://, socks5:// or socks5h://", addr);
        }
    }

    Ok(builder.build()?)
}

fn resolve_proxy() -> Option<String> {
    for var in ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
        if let Ok(addr) = std::env::var(var) {
            if !addr.is_empty() {
                return valid_proxy(addr);
            }
        }
    }

    let mut candidates = vec![PathBuf::from("proxy.txt")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".config").join("termchat").join("proxy.txt"));
    }

    for path in candidates {
        if let Ok(content) = std::fs::read_to_string(&path) {
            let addr = content.trim().to_string();
            if !addr.is_empty() && !addr.starts_with('#') {
                return valid_proxy(addr);
            }
        }
    }

    None
}

fn valid_proxy(addr: String) -> Option<String> {
    if addr.starts_with("http://") || addr.starts_with("socks5://") || addr.starts_with("socks5h://") {
        Some(addr)
    } else {
        eprintln!("Warning: Invalid proxy format {:?}, must start with http://, socks5:// or socks5h://", addr);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(new_client().is_ok());
    }

    #[test]
    fn test_valid_proxy_schemes() {
        assert!(valid_proxy("http://127.0.0.1:8080".into()).is_some());
        assert!(valid_proxy("socks5://127.0.0.1:1080".into()).is_some());
        assert!(valid_proxy("ftp://127.0.0.1".into()).is_none());
    }
}
