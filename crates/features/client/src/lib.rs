//! # Client Sender
//!
//! Request function with the contract of a normal network call, except that the
//! method, path, allowed headers and body travel inside an authenticated-encrypted
//! envelope to a secure endpoint, and only a verified answer to that exact request
//! is ever returned.
//!
//! * One [`SecureClient`] per configuration; clones are cheap.
//! * Failures are typed ([`ClientError`]); only [`ClientError::Timeout`] is retryable.
//! * Debug mode (from [`sfetch_kernel::config::ClientConfig`]) adds `debug!` events with
//!   nonce fingerprints, sizes and timings. Secrets, paths and bodies are never logged.

mod client;
mod error;
mod options;
mod response;
mod session;

pub use client::SecureClient;
pub use error::{ClientError, ClientErrorExt};
pub use options::RequestOptions;
pub use response::SecureResponse;
