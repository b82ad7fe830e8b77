//! HMAC signatures for expiring file URLs served by this backend. The
//! signature covers the storage key and the expiry instant, so neither can
//! be swapped without invalidating the URL.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn signature_for(secret: &str, key: &str, expires_at: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(key.as_bytes());
    mac.update(b":");
    mac.update(expires_at.to_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify(secret: &str, key: &str, expires_at: i64, signature: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(key.as_bytes());
    mac.update(b":");
    mac.update(expires_at.to_string().as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}
