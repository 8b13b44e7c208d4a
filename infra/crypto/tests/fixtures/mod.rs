use sfetch_crypto::prelude::*;
use sfetch_domain::SharedSecret;

pub const SECRET: &str = "integration-shared-secret-0123456789";

/// Builds an AES engine over [`SECRET`] with default replay settings.
/// # Panics
/// * If engine setup fails, the function will panic.
#[must_use]
pub fn engine() -> CryptoEngine {
    engine_with_secret(SECRET)
}

/// # Panics
/// * If engine setup fails, the function will panic.
#[must_use]
pub fn engine_with_secret(secret: &str) -> CryptoEngine {
    CryptoEngine::builder().secret(&SharedSecret::from(secret)).build().expect("Engine setup failed")
}
