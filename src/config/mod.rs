//! Configuration module for the signal relay.
//!
//! Supports JSON configuration files, environment variable overrides and
//! compiled-in defaults.
//!
//! # Module Structure
//!
//! - [`types`]: root `Config` struct
//! - [`server`]: queue sizing for connection plumbing
//! - [`security`]: handshake and wire-protocol limits
//! - [`logging`]: logging configuration
//! - [`loader`]: configuration loading functions
//! - [`validation`]: configuration validation functions
//! - [`defaults`]: default value functions

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod security;
pub mod server;
pub mod types;
pub mod validation;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use security::SecurityConfig;

pub use server::ServerConfig;

pub use types::Config;

pub use validation::{is_production_mode, validate};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 7000);
        assert_eq!(config.security.expiry_window_secs, 300);
        assert_eq!(config.security.max_message_size, 65536);
        assert_eq!(config.security.cors_origins, "*");
        assert_eq!(config.server.outbound_queue_size, 64);
        assert_eq!(config.server.event_buffer_size, 100);
        assert!(!config.logging.enable_file_logging);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn zero_expiry_window_is_rejected() {
        let mut config = Config::default();
        config.security.expiry_window_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn tiny_message_limit_is_rejected() {
        let mut config = Config::default();
        config.security.max_message_size = 16;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn partial_json_fills_remaining_fields_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"security":{"expiry_window_secs":60}}"#).unwrap();
        assert_eq!(config.security.expiry_window_secs, 60);
        assert_eq!(config.port, 7000);
        assert_eq!(config.server.outbound_queue_size, 64);
    }

    #[test]
    fn log_level_parses_aliases() {
        let level: LogLevel = serde_json::from_str(r#""WARNING""#).unwrap();
        assert_eq!(level, LogLevel::Warn);
        assert!(serde_json::from_str::<LogLevel>(r#""verbose""#).is_err());
    }
}
