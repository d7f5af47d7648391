use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use sha2::{Digest, Sha256};

/// Stable peer identity: lowercase hex SHA-256 fingerprint of the raw public key.
pub type PeerId = String;

/// Default maximum age of a signed timestamp (seconds).
pub const DEFAULT_EXPIRY_WINDOW_SECS: u64 = 300;

/// Outcome of a handshake verification. Always produced; malformed key or
/// signature material yields an invalid verdict rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub peer_id: Option<PeerId>,
}

impl Verdict {
    const fn invalid() -> Self {
        Self {
            valid: false,
            peer_id: None,
        }
    }

    /// The verified peer id, present only on a valid verdict.
    #[must_use]
    pub fn accepted(&self) -> Option<&str> {
        if self.valid {
            self.peer_id.as_deref()
        } else {
            None
        }
    }
}

/// Verifies Ed25519 authentication proofs presented at upgrade time.
///
/// A proof is the tuple (public key, timestamp, signature): the signature must
/// cover the exact timestamp string and the timestamp must not be older than
/// the configured expiry window. Keys and signatures travel base64-encoded.
#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    expiry_window: Duration,
}

impl IdentityVerifier {
    #[must_use]
    pub fn new(expiry_window: std::time::Duration) -> Self {
        Self {
            expiry_window: Duration::from_std(expiry_window).unwrap_or(Duration::MAX),
        }
    }

    /// Verify an authentication proof and derive the peer identity.
    ///
    /// Never fails: every malformed input path collapses into an invalid
    /// verdict so callers only ever branch on `valid`.
    #[must_use]
    pub fn verify(&self, public_key: &str, timestamp: &str, signature: &str) -> Verdict {
        if public_key.is_empty() || timestamp.is_empty() || signature.is_empty() {
            return Verdict::invalid();
        }

        let Some(key_bytes) = decode_exact::<PUBLIC_KEY_LENGTH>(public_key) else {
            return Verdict::invalid();
        };
        let Some(sig_bytes) = decode_exact::<SIGNATURE_LENGTH>(signature) else {
            return Verdict::invalid();
        };
        let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
            return Verdict::invalid();
        };
        let sig = Signature::from_bytes(&sig_bytes);

        if key.verify_strict(timestamp.as_bytes(), &sig).is_err() {
            return Verdict::invalid();
        }

        let Ok(signed_at) = DateTime::parse_from_rfc3339(timestamp) else {
            return Verdict::invalid();
        };
        let elapsed = Utc::now().signed_duration_since(signed_at);
        if elapsed > self.expiry_window {
            return Verdict::invalid();
        }

        Verdict {
            valid: true,
            peer_id: Some(fingerprint(&key_bytes)),
        }
    }
}

impl Default for IdentityVerifier {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(DEFAULT_EXPIRY_WINDOW_SECS))
    }
}

/// Deterministic fingerprint of a raw public key, stable across sessions.
#[must_use]
pub fn fingerprint(public_key: &[u8]) -> PeerId {
    hex::encode(Sha256::digest(public_key))
}

fn decode_exact<const N: usize>(armored: &str) -> Option<[u8; N]> {
    let raw = BASE64.decode(armored.trim()).ok()?;
    raw.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use proptest::prelude::*;
    use std::time::Duration as StdDuration;

    fn keypair(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn armored_public(key: &SigningKey) -> String {
        BASE64.encode(key.verifying_key().to_bytes())
    }

    fn sign_timestamp(key: &SigningKey, timestamp: &str) -> String {
        BASE64.encode(key.sign(timestamp.as_bytes()).to_bytes())
    }

    #[test]
    fn fresh_signed_timestamp_is_valid() {
        let key = keypair(7);
        let verifier = IdentityVerifier::default();
        let ts = Utc::now().to_rfc3339();

        let verdict = verifier.verify(&armored_public(&key), &ts, &sign_timestamp(&key, &ts));
        assert!(verdict.valid);
        assert_eq!(
            verdict.peer_id.as_deref(),
            Some(fingerprint(&key.verifying_key().to_bytes()).as_str())
        );
    }

    #[test]
    fn fingerprint_is_deterministic_across_sessions() {
        let key = keypair(9);
        let verifier = IdentityVerifier::default();

        let mut ids = Vec::new();
        for _ in 0..2 {
            let ts = Utc::now().to_rfc3339();
            let verdict = verifier.verify(&armored_public(&key), &ts, &sign_timestamp(&key, &ts));
            ids.push(verdict.peer_id.unwrap());
        }
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let key = keypair(3);
        let verifier = IdentityVerifier::new(StdDuration::from_secs(60));
        let ts = (Utc::now() - Duration::seconds(120)).to_rfc3339();

        let verdict = verifier.verify(&armored_public(&key), &ts, &sign_timestamp(&key, &ts));
        assert!(!verdict.valid);
        assert_eq!(verdict.accepted(), None);
    }

    #[test]
    fn missing_inputs_never_raise() {
        let key = keypair(4);
        let verifier = IdentityVerifier::default();
        let ts = Utc::now().to_rfc3339();
        let sig = sign_timestamp(&key, &ts);

        assert!(!verifier.verify("", &ts, &sig).valid);
        assert!(!verifier.verify(&armored_public(&key), "", &sig).valid);
        assert!(!verifier.verify(&armored_public(&key), &ts, "").valid);
    }

    #[test]
    fn signature_from_other_key_is_rejected() {
        let key = keypair(5);
        let imposter = keypair(6);
        let verifier = IdentityVerifier::default();
        let ts = Utc::now().to_rfc3339();

        let verdict = verifier.verify(&armored_public(&key), &ts, &sign_timestamp(&imposter, &ts));
        assert!(!verdict.valid);
    }

    #[test]
    fn signature_over_different_text_is_rejected() {
        let key = keypair(8);
        let verifier = IdentityVerifier::default();
        let ts = Utc::now().to_rfc3339();
        let other = (Utc::now() - Duration::seconds(1)).to_rfc3339();

        let verdict = verifier.verify(&armored_public(&key), &ts, &sign_timestamp(&key, &other));
        assert!(!verdict.valid);
    }

    #[test]
    fn non_timestamp_signed_text_is_rejected() {
        // Correctly signed, but the signed text is not an ISO-8601 timestamp.
        let key = keypair(11);
        let verifier = IdentityVerifier::default();

        let verdict = verifier.verify(
            &armored_public(&key),
            "not-a-timestamp",
            &sign_timestamp(&key, "not-a-timestamp"),
        );
        assert!(!verdict.valid);
    }

    proptest! {
        #[test]
        fn malformed_material_yields_invalid_verdict(pk in ".{0,80}", sig in ".{0,120}") {
            let verifier = IdentityVerifier::default();
            let ts = Utc::now().to_rfc3339();
            let verdict = verifier.verify(&pk, &ts, &sig);
            prop_assert!(!verdict.valid);
        }
    }
}
