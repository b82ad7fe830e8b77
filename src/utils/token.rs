use rand::rngs::OsRng;
use rand::RngCore;

/// 128 bits of OS entropy, hex-encoded: URL-safe as a path segment and
/// unguessable enough that token uniqueness needs no retry loop.
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
