//! Runtime configuration read from the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OPENSKY_API_URL` | `https://opensky-network.org/api` |
//! | `OPENSKY_TOKEN_URL` | OpenSky Keycloak token endpoint (comma-separated list allowed) |
//! | `OPENSKY_CLIENT_ID` / `OPENSKY_CLIENT_SECRET` | unset |
//! | `OPENSKY_SCOPE` | unset |
//! | `OPENSKY_USERNAME` / `OPENSKY_PASSWORD` | unset |
//! | `CACHE_SECONDS` | `5` |
//! | `SKYROUTE_SUMMARY_CACHE_SECONDS` | `120` |
//! | `SKYROUTE_ROUTE_CACHE_SECONDS` | `43200` |
//! | `SKYROUTE_ROUTE_CACHE_PATH` | `data/route-cache.json` |
//! | `SKYROUTE_AIRPORTS_PATH` | bundled dataset |
//! | `SKYROUTE_HISTORY_LOOKBACK_SECONDS` | `21600` |
//! | `SKYROUTE_MOVEMENT_LOOKBACK_SECONDS` | `10800` |
//! | `SKYROUTE_REQUEST_TIMEOUT_MS` | `10000` |
//! | `PORT` | `8080` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://opensky-network.org/api";
pub const DEFAULT_TOKEN_URL: &str =
    "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token";

/// OAuth client-credentials settings.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: Option<String>,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Basic-auth fallback account.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkyrouteConfig {
    pub port: u16,
    pub api_url: String,
    pub token_urls: Vec<String>,
    pub oauth: Option<OAuthCredentials>,
    pub basic: Option<BasicCredentials>,
    pub airspace_cache_ttl: Duration,
    pub summary_cache_ttl: Duration,
    pub route_cache_ttl: Duration,
    pub route_cache_path: Option<PathBuf>,
    pub airports_path: Option<PathBuf>,
    pub history_lookback: Duration,
    pub movement_lookback: Duration,
    pub request_timeout_ms: u64,
}

impl Default for SkyrouteConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            api_url: String::from(DEFAULT_API_URL),
            token_urls: vec![String::from(DEFAULT_TOKEN_URL)],
            oauth: None,
            basic: None,
            airspace_cache_ttl: Duration::from_secs(5),
            summary_cache_ttl: Duration::from_secs(120),
            route_cache_ttl: Duration::from_secs(12 * 60 * 60),
            route_cache_path: Some(PathBuf::from("data/route-cache.json")),
            airports_path: None,
            history_lookback: Duration::from_secs(6 * 60 * 60),
            movement_lookback: Duration::from_secs(3 * 60 * 60),
            request_timeout_ms: 10_000,
        }
    }
}

impl SkyrouteConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup. Unparseable numbers keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let oauth = match (non_empty("OPENSKY_CLIENT_ID"), non_empty("OPENSKY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(OAuthCredentials {
                client_id,
                client_secret,
                scope: non_empty("OPENSKY_SCOPE"),
            }),
            _ => None,
        };

        let basic = match (non_empty("OPENSKY_USERNAME"), non_empty("OPENSKY_PASSWORD")) {
            (Some(username), Some(password)) => Some(BasicCredentials { username, password }),
            _ => None,
        };

        let token_urls = non_empty("OPENSKY_TOKEN_URL")
            .map(|value| {
                value
                    .split(',')
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|urls| !urls.is_empty())
            .unwrap_or(defaults.token_urls);

        let seconds = |key: &str, default: Duration| {
            parsed::<u64>(non_empty(key)).map_or(default, Duration::from_secs)
        };

        Self {
            port: parsed(non_empty("PORT")).unwrap_or(defaults.port),
            api_url: non_empty("OPENSKY_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            token_urls,
            oauth,
            basic,
            airspace_cache_ttl: seconds("CACHE_SECONDS", defaults.airspace_cache_ttl),
            summary_cache_ttl: seconds("SKYROUTE_SUMMARY_CACHE_SECONDS", defaults.summary_cache_ttl),
            route_cache_ttl: seconds("SKYROUTE_ROUTE_CACHE_SECONDS", defaults.route_cache_ttl),
            route_cache_path: non_empty("SKYROUTE_ROUTE_CACHE_PATH")
                .map(PathBuf::from)
                .or(defaults.route_cache_path),
            airports_path: non_empty("SKYROUTE_AIRPORTS_PATH").map(PathBuf::from),
            history_lookback: seconds(
                "SKYROUTE_HISTORY_LOOKBACK_SECONDS",
                defaults.history_lookback,
            ),
            movement_lookback: seconds(
                "SKYROUTE_MOVEMENT_LOOKBACK_SECONDS",
                defaults.movement_lookback,
            ),
            request_timeout_ms: parsed(non_empty("SKYROUTE_REQUEST_TIMEOUT_MS"))
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_oauth(mut self, oauth: OAuthCredentials) -> Self {
        self.oauth = Some(oauth);
        self
    }

    pub fn with_basic(mut self, basic: BasicCredentials) -> Self {
        self.basic = Some(basic);
        self
    }

    pub fn with_route_cache_path(mut self, path: Option<PathBuf>) -> Self {
        self.route_cache_path = path;
        self
    }

    pub fn with_airports_path(mut self, path: Option<PathBuf>) -> Self {
        self.airports_path = path;
        self
    }
}

fn parsed<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|raw| raw.trim().parse().ok())
}
