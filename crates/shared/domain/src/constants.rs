//! Protocol-level constants shared by both endpoints.

/// Shortest shared secret accepted by configuration validation.
pub const MIN_SECRET_LEN: usize = 16;

/// Request and response headers carried inside the sealed payload. Everything else is dropped.
pub const FORWARDED_HEADERS: [&str; 3] = ["content-type", "accept", "accept-language"];

/// Default mount point of the secure endpoint on the demo server.
pub const DEFAULT_MOUNT_PATH: &str = "/secure";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 300;
pub const DEFAULT_REPLAY_CAPACITY: u64 = 100_000;
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 30;
/// Upper bounds accepted by configuration validation.
pub const MAX_REPLAY_WINDOW_SECS: u64 = 24 * 60 * 60;
pub const MAX_CLOCK_SKEW_SECS: u64 = 60 * 60;

pub const DEFAULT_PORT: u16 = 3000;

/// Returns `true` if `name` is on the forwarded header allow-list (ASCII case-insensitive).
#[must_use]
pub fn is_forwarded_header(name: &str) -> bool {
    FORWARDED_HEADERS.iter().any(|allowed| allowed.eq_ignore_ascii_case(name))
}
