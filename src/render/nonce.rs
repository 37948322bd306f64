//! Per-response script nonce.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

const NONCE_BYTES: usize = 16;

/// Fresh random nonce, base64 encoded.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Header value allowing only scripts carrying `nonce`.
pub fn content_security_policy(nonce: &str) -> String {
    format!("script-src 'nonce-{nonce}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_fresh_and_sized() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), NONCE_BYTES);
        assert_eq!(content_security_policy("abc"), "script-src 'nonce-abc'");
    }
}
