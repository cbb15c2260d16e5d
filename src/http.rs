use std::sync::{Arc, RwLock};

use http::Method;
use http::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderName};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::crypto::device;
use crate::crypto::signer::RequestSigner;
use crate::error::{CoreError, Result};
use crate::models::locale::Locale;
use crate::storage::KeyValueStorage;

/// Header mirroring the active locale for the backend.
pub const HEADER_LOCALE: HeaderName = HeaderName::from_static("x-locale");

/// The typed HTTP client every service goes through.
///
/// Owns the bearer token and locale headers so that a locale or session
/// change is reflected on all subsequent calls, and injects the request
/// signature header set when signing is enabled.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    signer: RequestSigner,
    device_id: String,
    bearer: RwLock<Option<String>>,
    locale: RwLock<Locale>,
}

impl ApiClient {
    /// Creates a client for the configured backend.
    ///
    /// # Arguments
    ///
    /// * `config` - The core configuration.
    /// * `durable` - Durable storage holding (or receiving) the device id.
    pub fn new(config: &Config, durable: &Arc<dyn KeyValueStorage>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            signer: RequestSigner::new(config),
            device_id: device::device_id(durable),
            bearer: RwLock::new(None),
            locale: RwLock::new(config.default_locale),
        }
    }

    /// Installs (or clears) the bearer token for subsequent requests.
    pub fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write().unwrap() = token;
    }

    /// Whether a bearer token is currently installed.
    pub fn has_bearer(&self) -> bool {
        self.bearer.read().unwrap().is_some()
    }

    /// Sets the locale mirrored on outgoing headers.
    pub fn set_locale(&self, locale: Locale) {
        *self.locale.write().unwrap() = locale;
    }

    /// The locale currently mirrored on outgoing headers.
    pub fn locale(&self) -> Locale {
        *self.locale.read().unwrap()
    }

    /// The persistent device id sent with signed requests.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// GETs `path` and decodes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let (_, body) = self.send(Method::GET, path, None).await?;
        Ok(sonic_rs::from_str(&body)?)
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let payload = sonic_rs::to_string(body)?;
        let (_, body) = self.send(Method::POST, path, Some(payload)).await?;
        Ok(sonic_rs::from_str(&body)?)
    }

    /// POSTs `body` as JSON to `path`, ignoring the response body.
    pub async fn post_ok<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let payload = sonic_rs::to_string(body)?;
        self.send(Method::POST, path, Some(payload)).await?;
        Ok(())
    }

    /// Sends one request with the full header set and maps non-success
    /// statuses to `CoreError::Api`.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<(u16, String)> {
        let url = format!("{}{}", self.base_url, path);
        let locale = self.locale();

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT_LANGUAGE, locale.as_str())
            .header(HEADER_LOCALE, locale.as_str());

        if let Some(token) = self.bearer.read().unwrap().clone() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        // The signature covers the path only, not the query string.
        let signed_path = path.split('?').next().unwrap_or(path);
        let signing = self.signer.headers(&self.device_id, &method, signed_path);
        if !signing.is_empty() {
            request = request.headers(signing);
        }

        if let Some(payload) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        tracing::debug!("➡️ {} {}", method, path);
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::debug!("⬅️ {} {} -> {}", method, path, status);
            return Err(CoreError::Api {
                status,
                message: extract_error_message(&text),
            });
        }

        Ok((status, text))
    }
}

/// Pulls a human-readable message out of an error body, falling back to
/// the raw (truncated) text.
fn extract_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        message: Option<String>,
    }

    if let Ok(parsed) = sonic_rs::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.error.or(parsed.message) {
            return msg;
        }
    }
    let mut text = body.trim().to_string();
    if text.len() > 200 {
        text.truncate(200);
    }
    if text.is_empty() {
        "request failed".to_string()
    } else {
        text
    }
}
