//! Private-channel authorization signatures for the realtime broadcaster.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// `"{app_key}:{hex(HMAC-SHA256(app_secret, "{socket_id}:{channel}"))}"`
pub fn sign_channel_auth(app_key: &str, app_secret: &str, socket_id: &str, channel: &str) -> String {
    format!(
        "{app_key}:{}",
        hmac_sha256_hex(app_secret.as_bytes(), format!("{socket_id}:{channel}").as_bytes())
    )
}

/// Lowercase hex HMAC-SHA256 of `message` under `secret`.
pub fn hmac_sha256_hex(secret: &[u8], message: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        // new_from_slice only fails for fixed-size-key MACs
        Err(_) => return String::new(),
    };
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}
