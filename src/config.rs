use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

use crate::models::locale::Locale;

/// The core's configuration.
#[derive(Clone)]
pub struct Config {
    /// The base URL of the REST backend, without a trailing slash.
    pub api_base_url: String,
    /// The application key sent as `X-App-Key` when signing is enabled.
    pub app_key: Option<String>,
    /// The application secret used to key request signatures.
    /// Never transmitted, never logged.
    pub app_secret: Option<Zeroizing<String>>,
    /// Whether request signing is enabled. Requires both key and secret.
    pub signing_enabled: bool,
    /// The locale used when nothing valid is persisted.
    pub default_locale: Locale,
    /// Where durable client state (locale, device id, menu cache) lives.
    pub durable_state_path: PathBuf,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("PORTAL_API_URL")
            .context("PORTAL_API_URL must be set")?
            .trim_end_matches('/')
            .to_string();

        let app_key = env::var("PORTAL_APP_KEY").ok().filter(|k| !k.is_empty());
        let app_secret = env::var("PORTAL_APP_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(Zeroizing::new);

        let signing_flag = env::var("PORTAL_SIGNING_ENABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        // Signing degrades to a no-op when key material is missing.
        let signing_enabled = signing_flag && app_key.is_some() && app_secret.is_some();

        let default_locale = env::var("PORTAL_DEFAULT_LOCALE")
            .ok()
            .and_then(|code| Locale::parse(&code))
            .unwrap_or_default();

        let durable_state_path = env::var("PORTAL_STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".campusgate-state.json"));

        Ok(Self {
            api_base_url,
            app_key,
            app_secret,
            signing_enabled,
            default_locale,
            durable_state_path,
        })
    }
}
