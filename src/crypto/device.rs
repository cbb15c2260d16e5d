use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::storage::{KeyValueStorage, keys};

/// The number of random bytes mixed into a fresh device id.
const DEVICE_ENTROPY_BYTES: usize = 16;

/// Returns the persisted device id, generating and persisting one on
/// first use.
///
/// The id is derived from an environment fingerprint plus random bytes and
/// stays stable for the device's lifetime unless the durable storage is
/// explicitly cleared.
pub fn device_id(storage: &Arc<dyn KeyValueStorage>) -> String {
    if let Some(existing) = storage.get(keys::DEVICE_ID) {
        return existing;
    }

    let id = generate_device_id();
    storage.set(keys::DEVICE_ID, &id);
    tracing::info!("🆔 Generated new device id");
    id
}

fn generate_device_id() -> String {
    let mut entropy = [0u8; DEVICE_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut entropy);

    let mut hasher = Sha256::new();
    hasher.update(environment_fingerprint().as_bytes());
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    hasher.update(entropy);
    general_purpose::URL_SAFE_NO_PAD.encode(&hasher.finalize()[..16])
}

/// A coarse fingerprint of the runtime environment. Only mixed into the
/// id derivation; never sent on its own.
fn environment_fingerprint() -> String {
    format!(
        "{}/{}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::env::var("HOSTNAME").unwrap_or_default()
    )
}
