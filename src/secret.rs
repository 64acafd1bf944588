//! Secret material generation
//!
//! Secrets are drawn from the operating system RNG and encoded with the
//! URL-safe base64 alphabet without padding, so they can be pasted into env
//! files, connection URLs and shell commands without quoting.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Entropy for the session signing secret.
pub const SESSION_SECRET_BYTES: usize = 48;

/// Entropy for the generated database password.
pub const DB_PASSWORD_BYTES: usize = 24;

/// Key under which the session signing secret is stored.
pub const SESSION_SECRET: &str = "session_secret";

/// Key under which the database password is stored.
pub const DB_PASSWORD: &str = "db_password";

/// Generate a fresh secret from `byte_length` bytes of OS randomness.
pub fn generate(byte_length: usize) -> String {
    let mut buf = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
