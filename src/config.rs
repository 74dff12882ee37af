//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` (optional), then
//! `QUOTER_`-prefixed environment variables. Nested keys use `__`, e.g.
//! `QUOTER_REMOTE__PROBABILITY=0.3`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use url::Url;

use crate::error::QuoterError;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "QUOTER_";

/// Quotes-on-design style endpoint: a JSON array of `{ title, content }` posts.
pub const DEFAULT_REMOTE_URL: &str =
    "https://quotesondesign.com/wp-json/posts?filter[orderby]=rand&filter[posts_per_page]=1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub listen_addr: String,
    #[serde(deserialize_with = "string_or_number")]
    pub database_url: String,
    #[serde(deserialize_with = "string_or_number")]
    pub loglevel: String,
    /// Empty disables the admin endpoints.
    #[serde(deserialize_with = "string_or_number")]
    pub admin_key: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:quoter.sqlite".to_string(),
            loglevel: "info".to_string(),
            admin_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: Url,
    /// Category assigned to every quote fetched remotely.
    #[serde(deserialize_with = "string_or_number")]
    pub category: String,
    /// Chance of going remote on each request, in `[0, 1]`.
    pub probability: f64,
    /// Extra attempts after the first failed fetch.
    pub retries: usize,
    pub timeout_secs: u64,
    pub proxy: Option<Url>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_REMOTE_URL).expect("default remote url is valid"),
            category: "Design".to_string(),
            probability: 0.5,
            retries: 2,
            timeout_secs: 10,
            proxy: None,
        }
    }
}

/// Env values are parsed as typed data, so `QUOTER_BASIC__ADMIN_KEY=123456`
/// arrives as a number. Accept it as its textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl de::Visitor<'_> for StringOrNumber {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, QuoterError> {
        Ok(Self::figment().extract()?)
    }
}
