/// Password reset token generation
///
/// Reset tokens are 43 random base62 characters. The plaintext is handed to
/// the user once; only its SHA-256 digest is stored.
///
/// # Example
///
/// ```
/// use journal_shared::auth::reset_token::{generate_reset_token, hash_reset_token};
///
/// let (token, hash) = generate_reset_token();
/// assert_eq!(hash_reset_token(&token), hash);
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of a reset token (~256 bits of entropy)
pub const RESET_TOKEN_LENGTH: usize = 43;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new reset token, returning `(plaintext, sha256_hex)`
pub fn generate_reset_token() -> (String, String) {
    let mut rng = rand::thread_rng();
    let token: String = (0..RESET_TOKEN_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    let hash = hash_reset_token(&token);

    (token, hash)
}

/// SHA-256 hex digest of a reset token
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap shape check before touching storage
pub fn is_well_formed(token: &str) -> bool {
    token.len() == RESET_TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_alphanumeric())
}
