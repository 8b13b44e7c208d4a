//! # Proxy Middleware
//!
//! Server side of the secure channel, as a `tower` layer. Each request moves through
//! `Received → Verified → Forwarded → Sealed → Responded`:
//!
//! 1. The content type must be the envelope type (`415` otherwise) and the body fits the cap.
//! 2. The envelope is opened; any failure ends with an identical empty `400`.
//! 3. The plain request becomes an ordinary `http::Request` for the wrapped service.
//! 4. The downstream response is captured and sealed under a fresh nonce, bound to the request.
//! 5. The envelope is returned with status `200`, whatever the inner status was.
//!
//! The downstream service never sees envelopes and never sees unverified input.

mod error;
mod forward;
mod layer;
mod pipeline;

pub use error::{ProxyError, ProxyErrorExt};
pub use layer::{SecureProxy, SecureProxyLayer};
