use reqwest::Proxy;

use crate::client::Proxies;
use crate::error::{Error, Result};

pub(crate) const CLIENT_NAME: &str = "pvwatts-rs";
pub(crate) const PLATFORM_TAG: &str = "Rust";

/// `pvwatts-rs/<version> (Rust)`
pub(crate) fn user_agent() -> String {
    format!(
        "{}/{} ({})",
        CLIENT_NAME,
        env!("CARGO_PKG_VERSION"),
        PLATFORM_TAG
    )
}

/// Converts a scheme -> proxy url map into reqwest proxies.
///
/// Recognised schemes are `http`, `https` and `all`.
pub(crate) fn build_proxies(proxies: &Proxies) -> Result<Vec<Proxy>> {
    proxies
        .iter()
        .map(|(scheme, url)| {
            let proxy = match scheme.to_ascii_lowercase().as_str() {
                "http" => Proxy::http(url.as_str()),
                "https" => Proxy::https(url.as_str()),
                "all" => Proxy::all(url.as_str()),
                _ => return Err(Error::UnsupportedProxyScheme(scheme.clone())),
            };
            proxy.map_err(|source| Error::Proxy {
                scheme: scheme.clone(),
                source,
            })
        })
        .collect()
}

/// Shortens a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str, max: usize) -> String {
    if body.chars().count() <= max {
        return body.to_string();
    }
    let mut out: String = body.chars().take(max).collect();
    out.push_str("...");
    out
}
