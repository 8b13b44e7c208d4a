//! Kernel utilities shared by both protocol endpoints.
//! Keep this crate lightweight: settings loading and the validated, immutable
//! configuration objects the client and the proxy are constructed from.
//!
//! ## Config loading
//! ```rust,no_run
//! use sfetch_kernel::config::{ClientConfig, load_settings};
//!
//! let settings = load_settings(None::<&str>).unwrap();
//! let client = ClientConfig::from_settings(&settings).unwrap();
//! assert!(client.timeout().as_secs() > 0);
//! ```
//!
//! ## Programmatic configuration
//! ```rust
//! use sfetch_kernel::config::ProxyConfig;
//!
//! let proxy = ProxyConfig::builder().secret("0123456789abcdef0123").debug(true).build().unwrap();
//! assert!(proxy.debug());
//! ```
pub mod config;

pub use sfetch_domain as domain;
