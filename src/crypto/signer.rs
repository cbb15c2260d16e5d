use http::header::HeaderName;
use http::{HeaderMap, HeaderValue, Method};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::Config;

/// Header carrying the application key.
pub const HEADER_APP_KEY: HeaderName = HeaderName::from_static("x-app-key");
/// Header carrying the signature timestamp (integer seconds).
pub const HEADER_TIMESTAMP: HeaderName = HeaderName::from_static("x-app-timestamp");
/// Header carrying the device id.
pub const HEADER_DEVICE_ID: HeaderName = HeaderName::from_static("x-device-id");
/// Header carrying the hex-encoded HMAC-SHA-256 signature.
pub const HEADER_SIGNATURE: HeaderName = HeaderName::from_static("x-app-signature");

/// Computes per-request signature headers that prove the caller holds the
/// app secret, defending the API from unauthorized non-browser clients.
///
/// The signed message is `appKey|timestamp|deviceId|METHOD|path`, keyed
/// with the app secret. The secret itself never leaves the signer.
#[derive(Clone)]
pub struct RequestSigner {
    app_key: Option<String>,
    app_secret: Option<Zeroizing<String>>,
    enabled: bool,
}

impl RequestSigner {
    /// Creates a signer from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            app_key: config.app_key.clone(),
            app_secret: config.app_secret.clone(),
            enabled: config.signing_enabled,
        }
    }

    /// Whether signing is configured and enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.app_key.is_some() && self.app_secret.is_some()
    }

    /// Computes the four signing headers for one request.
    ///
    /// # Returns
    ///
    /// An empty `HeaderMap` when signing is not configured — the feature
    /// degrades to a no-op rather than failing requests.
    pub fn headers(&self, device_id: &str, method: &Method, path: &str) -> HeaderMap {
        let timestamp = chrono::Utc::now().timestamp();
        self.headers_at(timestamp, device_id, method, path)
    }

    /// Computes the signing headers for a fixed timestamp.
    pub fn headers_at(
        &self,
        timestamp: i64,
        device_id: &str,
        method: &Method,
        path: &str,
    ) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let (Some(app_key), Some(secret)) = (&self.app_key, &self.app_secret) else {
            return headers;
        };
        if !self.enabled {
            return headers;
        }

        let signature = sign(secret.as_bytes(), app_key, timestamp, device_id, method, path);

        let insert = |headers: &mut HeaderMap, name: HeaderName, value: &str| {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        };
        insert(&mut headers, HEADER_APP_KEY, app_key);
        insert(&mut headers, HEADER_TIMESTAMP, &timestamp.to_string());
        insert(&mut headers, HEADER_DEVICE_ID, device_id);
        insert(&mut headers, HEADER_SIGNATURE, &signature);
        headers
    }
}

/// Computes the hex-encoded signature over the canonical message.
pub fn sign(
    secret: &[u8],
    app_key: &str,
    timestamp: i64,
    device_id: &str,
    method: &Method,
    path: &str,
) -> String {
    let message = format!(
        "{}|{}|{}|{}|{}",
        app_key,
        timestamp,
        device_id,
        method.as_str(),
        path
    );
    hex::encode(hmac_sha256(secret, message.as_bytes()))
}

/// Verifies a hex signature in constant time.
pub fn verify_signature(
    secret: &[u8],
    app_key: &str,
    timestamp: i64,
    device_id: &str,
    method: &Method,
    path: &str,
    signature_hex: &str,
) -> bool {
    let Ok(provided) = hex::decode(signature_hex) else {
        return false;
    };
    let expected = {
        let message = format!(
            "{}|{}|{}|{}|{}",
            app_key,
            timestamp,
            device_id,
            method.as_str(),
            path
        );
        hmac_sha256(secret, message.as_bytes())
    };
    expected.as_slice().ct_eq(provided.as_slice()).into()
}

/// HMAC-SHA-256 over `message`, keyed with `secret`.
fn hmac_sha256(secret: &[u8], message: &[u8]) -> [u8; 32] {
    const BLOCK_SIZE: usize = 64;
    let mut key_block = [0u8; BLOCK_SIZE];
    if secret.len() > BLOCK_SIZE {
        let digest = Sha256::digest(secret);
        key_block[..digest.len()].copy_from_slice(&digest);
    } else {
        key_block[..secret.len()].copy_from_slice(secret);
    }

    let mut o_key_pad = [0u8; BLOCK_SIZE];
    let mut i_key_pad = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        o_key_pad[i] = key_block[i] ^ 0x5c;
        i_key_pad[i] = key_block[i] ^ 0x36;
    }

    let mut inner = Sha256::new();
    inner.update(i_key_pad);
    inner.update(message);
    let inner_hash = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(o_key_pad);
    outer.update(inner_hash);
    outer.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn signing_config() -> Config {
        Config {
            api_base_url: "http://localhost".to_string(),
            app_key: Some("portal-web".to_string()),
            app_secret: Some(Zeroizing::new("super-secret".to_string())),
            signing_enabled: true,
            default_locale: Default::default(),
            durable_state_path: PathBuf::from("unused"),
        }
    }

    #[test]
    fn signature_is_deterministic() {
        let signer = RequestSigner::new(&signing_config());
        let a = signer.headers_at(1_700_000_000, "dev-1", &Method::GET, "/menu");
        let b = signer.headers_at(1_700_000_000, "dev-1", &Method::GET, "/menu");
        assert_eq!(a.get(HEADER_SIGNATURE), b.get(HEADER_SIGNATURE));
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn any_input_change_changes_signature() {
        let signer = RequestSigner::new(&signing_config());
        let base = signer.headers_at(1_700_000_000, "dev-1", &Method::GET, "/menu");
        let base_sig = base.get(HEADER_SIGNATURE).unwrap();

        let variants = [
            signer.headers_at(1_700_000_001, "dev-1", &Method::GET, "/menu"),
            signer.headers_at(1_700_000_000, "dev-2", &Method::GET, "/menu"),
            signer.headers_at(1_700_000_000, "dev-1", &Method::POST, "/menu"),
            signer.headers_at(1_700_000_000, "dev-1", &Method::GET, "/locale"),
        ];
        for variant in &variants {
            assert_ne!(variant.get(HEADER_SIGNATURE).unwrap(), base_sig);
        }
    }

    #[test]
    fn disabled_signer_emits_no_headers() {
        let mut config = signing_config();
        config.signing_enabled = false;
        let signer = RequestSigner::new(&config);
        assert!(
            signer
                .headers_at(1_700_000_000, "dev-1", &Method::GET, "/menu")
                .is_empty()
        );

        let mut config = signing_config();
        config.app_secret = None;
        let signer = RequestSigner::new(&config);
        assert!(
            signer
                .headers_at(1_700_000_000, "dev-1", &Method::GET, "/menu")
                .is_empty()
        );
    }

    #[test]
    fn verify_round_trip() {
        let secret = b"super-secret";
        let sig = sign(secret, "portal-web", 1_700_000_000, "dev-1", &Method::GET, "/menu");
        assert!(verify_signature(
            secret,
            "portal-web",
            1_700_000_000,
            "dev-1",
            &Method::GET,
            "/menu",
            &sig
        ));
        assert!(!verify_signature(
            secret,
            "portal-web",
            1_700_000_000,
            "dev-1",
            &Method::POST,
            "/menu",
            &sig
        ));
        assert!(!verify_signature(
            secret,
            "portal-web",
            1_700_000_000,
            "dev-1",
            &Method::GET,
            "/menu",
            "zz-not-hex"
        ));
    }
}
