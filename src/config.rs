use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::client::{ClientConfig, DEFAULT_URL, DEMO_KEY, Proxies};

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    url: Option<String>,
    key: Option<String>,
    http_proxy: Option<String>,
    https_proxy: Option<String>,
}

impl RcConfig {
    fn set(&mut self, name: &str, value: &str) {
        let value = Some(value.to_string());
        match name {
            "url" => self.url = value,
            "key" => self.key = value,
            "http_proxy" => self.http_proxy = value,
            "https_proxy" => self.https_proxy = value,
            _ => {}
        }
    }
}

/// Resolves a [`ClientConfig`] from (in order of precedence):
/// - environment variables `PVWATTS_URL`, `PVWATTS_API_KEY`,
///   `PVWATTS_HTTP_PROXY`, `PVWATTS_HTTPS_PROXY`
/// - the first rc file found (`PVWATTS_RC`, `./.pvwattsrc`, `~/.pvwattsrc`)
///
/// A missing url falls back to the public endpoint and a missing key to
/// `DEMO_KEY`.
pub(crate) fn load_config() -> Result<ClientConfig> {
    let mut url = env("PVWATTS_URL");
    let mut key = env("PVWATTS_API_KEY");
    let mut http_proxy = env("PVWATTS_HTTP_PROXY");
    let mut https_proxy = env("PVWATTS_HTTPS_PROXY");

    if url.is_none() || key.is_none() || http_proxy.is_none() || https_proxy.is_none() {
        for rc_path in rc_candidates() {
            if rc_path.exists() {
                let cfg = read_rc(&rc_path).with_context(|| {
                    format!("failed to read configuration file {}", rc_path.display())
                })?;
                debug!(path = %rc_path.display(), "loaded PVWatts rc file");

                url = url.or(cfg.url);
                key = key.or(cfg.key);
                http_proxy = http_proxy.or(cfg.http_proxy);
                https_proxy = https_proxy.or(cfg.https_proxy);
                break;
            }
        }
    }

    let key = key.unwrap_or_else(|| {
        debug!("no PVWatts API key configured, using {}", DEMO_KEY);
        DEMO_KEY.to_string()
    });

    let mut proxies = Proxies::new();
    if let Some(p) = http_proxy {
        proxies.insert("http".to_string(), p);
    }
    if let Some(p) = https_proxy {
        proxies.insert("https".to_string(), p);
    }

    Ok(ClientConfig {
        url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
        api_key: key,
        proxies: if proxies.is_empty() { None } else { Some(proxies) },
    })
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // `key:` may be followed by its value on the next line.
    let mut pending: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = pending.take() {
            if !line.contains(':') || line.contains("://") {
                cfg.set(name, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                pending = Some(k);
            } else {
                cfg.set(k, v);
            }
        }
    }

    cfg
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    if let Some(p) = env("PVWATTS_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".pvwattsrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".pvwattsrc"));
    }
    v
}
