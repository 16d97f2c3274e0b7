/*
 * BFX-FIX GATEWAY - UPSTREAM WS AUTH SIGNING
 * =================================================================
 * Component Name: src/upstream/auth.rs
 * Core Responsibility: HMAC-SHA384 signing of the authenticated WS
 * payload, per §6.
 * =================================================================
 */

use hmac::{Hmac, Mac};
use sha2::Sha384;

use crate::error::{GatewayError, GatewayResult};

type HmacSha384 = Hmac<Sha384>;

/// Build the `authSig` for an authenticated channel subscription.
///
/// The signed payload is `AUTH<nonce><nonce>`, matching the convention the
/// upstream's own client libraries use; `nonce` must be monotonically
/// increasing within the lifetime of the API key.
pub fn sign_auth_payload(api_secret: &str, nonce: u64) -> GatewayResult<String> {
    let payload = format!("AUTH{nonce}{nonce}");
    let mut mac = HmacSha384::new_from_slice(api_secret.as_bytes())
        .map_err(|e| GatewayError::AuthFailed(format!("invalid key length: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic_hex() {
        let sig1 = sign_auth_payload("secret", 1).unwrap();
        let sig2 = sign_auth_payload("secret", 1).unwrap();
        assert_eq!(sig1, sig2);
        assert!(sig1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_nonce_changes_signature() {
        let sig1 = sign_auth_payload("secret", 1).unwrap();
        let sig2 = sign_auth_payload("secret", 2).unwrap();
        assert_ne!(sig1, sig2);
    }
}
