//! Configuration validation functions.

use super::Config;

/// Validate security-sensitive settings.
///
/// Hard errors are settings that would make the handshake meaningless;
/// production-only concerns are warned to stderr.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.security.expiry_window_secs == 0 {
        anyhow::bail!(
            "security.expiry_window_secs must be greater than zero; \
             a zero window rejects every authentication proof"
        );
    }

    if config.security.max_message_size < 1024 {
        anyhow::bail!(
            "security.max_message_size is {} bytes; signaling payloads (SDP offers, \
             ICE candidates) need at least 1024",
            config.security.max_message_size
        );
    }

    if config.server.outbound_queue_size == 0 {
        anyhow::bail!("server.outbound_queue_size must be greater than zero");
    }

    if is_production_mode() && config.security.cors_origins == "*" {
        eprintln!(
            "WARNING: permissive CORS in production. Set SIGNAL_RELAY__SECURITY__CORS_ORIGINS \
             to an explicit origin list."
        );
    }

    Ok(())
}

/// Whether the process runs in production mode (`SIGNAL_RELAY_ENV=production`).
#[must_use]
pub fn is_production_mode() -> bool {
    std::env::var("SIGNAL_RELAY_ENV")
        .map(|v| v.trim().eq_ignore_ascii_case("production"))
        .unwrap_or(false)
}
