use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::load_config;
use crate::error::{Error, Result};
use crate::params::RequestParams;
use crate::result::PvWattsResult;
use crate::util::{build_proxies, truncate_body, user_agent};

/// PVWatts v4 endpoint.
pub const DEFAULT_URL: &str = "http://developer.nrel.gov/api/pvwatts/v4.json";

/// Key accepted by NREL for low-volume anonymous use.
pub const DEMO_KEY: &str = "DEMO_KEY";

/// Proxy urls keyed by scheme (`http`, `https` or `all`).
pub type Proxies = BTreeMap<String, String>;

// Process-wide key read by every client built with `Client::new`/`Client::shared`
// and by the free `request` function. Last write wins.
static SHARED_API_KEY: RwLock<Cow<'static, str>> = RwLock::new(Cow::Borrowed(DEMO_KEY));

/// Returns the current process-wide API key.
pub fn shared_api_key() -> String {
    SHARED_API_KEY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .to_string()
}

/// Replaces the process-wide API key.
///
/// Every shared-key client, including ones constructed earlier, uses the new
/// key from its next request on.
pub fn set_shared_api_key(key: impl Into<String>) {
    *SHARED_API_KEY
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Cow::Owned(key.into());
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint url, normally [`DEFAULT_URL`].
    pub url: String,
    pub api_key: String,
    /// Outbound proxies applied to every request of this client.
    pub proxies: Option<Proxies>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: DEMO_KEY.to_string(),
            proxies: None,
        }
    }
}

#[derive(Debug, Clone)]
enum ApiKey {
    Shared,
    Owned(String),
}

#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    key: ApiKey,
    http: HttpClient,
}

impl Client {
    /// Creates a client the way `pypvwatts.PVWatts(api_key, proxies)` does.
    ///
    /// The key is written to the process-wide slot (see [`set_shared_api_key`])
    /// and this client reads that slot on every request. Constructing another
    /// shared client with a different key therefore changes the key used by
    /// this one as well. Use [`Client::with_config`] for a client that owns its
    /// key.
    pub fn new(api_key: impl Into<String>, proxies: Option<Proxies>) -> Result<Self> {
        Self::shared(ClientConfig {
            api_key: api_key.into(),
            proxies,
            ..ClientConfig::default()
        })
    }

    /// Like [`Client::new`], with a configurable endpoint.
    ///
    /// The process-wide key is only replaced once the client has been built.
    pub fn shared(config: ClientConfig) -> Result<Self> {
        let client = Self::build(config.url, ApiKey::Shared, config.proxies.as_ref())?;
        set_shared_api_key(config.api_key);
        Ok(client)
    }

    /// Creates a client that owns its key and leaves the process-wide key alone.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::build(
            config.url,
            ApiKey::Owned(config.api_key),
            config.proxies.as_ref(),
        )
    }

    /// Creates an owned-key client from environment variables and/or `.pvwattsrc`.
    pub fn from_env() -> Result<Self> {
        Self::with_config(load_config()?)
    }

    /// Shared-key client without proxies that does not touch the shared key.
    pub(crate) fn unbound(url: &str) -> Result<Self> {
        Self::build(url.to_string(), ApiKey::Shared, None)
    }

    fn build(url: String, key: ApiKey, proxies: Option<&Proxies>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent())
                .unwrap_or(HeaderValue::from_static("pvwatts-rs")),
        );

        let mut builder = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(60));

        if let Some(proxies) = proxies {
            for proxy in build_proxies(proxies)? {
                builder = builder.proxy(proxy);
            }
        }

        let http = builder.build()?;

        Ok(Self { url, key, http })
    }

    /// The key the next request will carry.
    pub fn api_key(&self) -> String {
        match &self.key {
            ApiKey::Shared => shared_api_key(),
            ApiKey::Owned(key) => key.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    /// Validates `params`, sends them and wraps the decoded body.
    ///
    /// Nothing is sent if any parameter fails validation.
    pub fn request(&self, params: &RequestParams) -> Result<PvWattsResult> {
        let mut query = params.to_query()?;
        query.push(("api_key", self.api_key()));

        let data = self.get_data(&query)?;
        Ok(PvWattsResult::new(data))
    }

    /// Sends one GET with the given query pairs and returns the decoded JSON.
    ///
    /// HTTP 403 becomes [`Error::Authorization`]. Other error statuses are
    /// decoded like successes since the service reports problems in an
    /// `errors` array; only a non-JSON error body yields [`Error::Status`].
    pub fn get_data<K, V>(&self, params: &[(K, V)]) -> Result<Value>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();

        debug!(url = %self.url, params = query.len(), "sending PVWatts request");
        let resp = self.http.get(&self.url).query(&query).send()?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            warn!(url = %self.url, "PVWatts rejected the API key (HTTP 403)");
            return Err(Error::Authorization);
        }

        let text = resp.text()?;
        match serde_json::from_str::<Value>(&text) {
            Ok(data) => {
                if !status.is_success() {
                    warn!(%status, "PVWatts returned an error status with a JSON body");
                }
                Ok(data)
            }
            Err(e) if status.is_success() => Err(e.into()),
            Err(_) => Err(Error::Status {
                status,
                body: truncate_body(&text, 512),
            }),
        }
    }
}
