//! # Domain Models
//!
//! Pure secure-fetch types with minimal dependencies (`serde`, `zeroize`, `subtle`).
//! Keep it lean: no I/O, networking, or crypto, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod message;
pub mod secret;

pub use config::{
    ClientSettings, LogSettings, ProxySettings, ReplaySettings, ServerSettings, Settings,
    SettingsInner,
};
pub use message::{Header, PlainRequest, PlainResponse};
pub use secret::SharedSecret;
