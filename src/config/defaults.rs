//! Default value functions referenced from serde attributes and `Default` impls.

use super::logging::LogFormat;

pub fn default_port() -> u16 {
    7000
}

pub fn default_expiry_window_secs() -> u64 {
    300
}

pub fn default_max_message_size() -> usize {
    65536 // 64KB
}

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub fn default_outbound_queue_size() -> usize {
    64
}

pub fn default_event_buffer_size() -> usize {
    100
}

pub fn default_log_dir() -> String {
    "./logs".to_string()
}

pub fn default_log_filename() -> String {
    "signal-relay.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub fn default_enable_file_logging() -> bool {
    false
}

pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
