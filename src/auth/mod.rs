// Upgrade-time authentication: Ed25519 proof verification and peer identity derivation

mod identity;

pub use identity::{
    fingerprint, IdentityVerifier, PeerId, Verdict, DEFAULT_EXPIRY_WINDOW_SECS,
};
