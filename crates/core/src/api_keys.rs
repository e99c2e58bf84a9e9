//! Desktop-client API key generation and hashing.
//!
//! The plaintext key is handed to the user once; only its SHA-256 digest
//! and a short display prefix are stored.

use rand::Rng;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the generated API key string (alphanumeric characters).
pub const KEY_LENGTH: usize = 48;

/// Number of leading characters stored as a human-visible prefix.
pub const KEY_PREFIX_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// API key generation
// ---------------------------------------------------------------------------

/// The result of generating a new API key.
pub struct GeneratedApiKey {
    /// The plaintext key (shown to the user exactly once, never stored).
    pub plaintext: String,
    /// The first [`KEY_PREFIX_LENGTH`] characters of the key for display.
    pub prefix: String,
    /// The SHA-256 hex digest of the plaintext key (stored in the database).
    pub hash: String,
}

/// Generate a new random API key.
pub fn generate_api_key() -> GeneratedApiKey {
    let key: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect();

    let prefix = extract_prefix(&key).to_string();
    let hash = hash_api_key(&key);

    GeneratedApiKey {
        plaintext: key,
        prefix,
        hash,
    }
}

/// Compute the SHA-256 hex digest of an API key.
///
/// Used both when issuing a key and when resolving a bearer credential.
pub fn hash_api_key(key: &str) -> String {
    crate::hashing::sha256_hex(key.as_bytes())
}

/// Extract the prefix from a plaintext API key.
pub fn extract_prefix(key: &str) -> &str {
    &key[..KEY_PREFIX_LENGTH.min(key.len())]
}

/// Whether a bearer credential looks like a JWT rather than an API key.
///
/// JWTs are three base64url segments joined by dots; generated API keys
/// are purely alphanumeric.
pub fn looks_like_jwt(credential: &str) -> bool {
    credential.split('.').count() == 3 && !credential.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_correct_length() {
        let key = generate_api_key();
        assert_eq!(key.plaintext.len(), KEY_LENGTH);
        assert!(key.plaintext.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn prefix_and_hash_derive_from_plaintext() {
        let key = generate_api_key();
        assert_eq!(key.prefix, &key.plaintext[..KEY_PREFIX_LENGTH]);
        assert_eq!(key.hash, hash_api_key(&key.plaintext));
        assert_eq!(key.hash.len(), 64);
    }

    #[test]
    fn keys_are_unique() {
        assert_ne!(generate_api_key().plaintext, generate_api_key().plaintext);
    }

    #[test]
    fn short_key_prefix_does_not_panic() {
        assert_eq!(extract_prefix("abc"), "abc");
    }

    #[test]
    fn distinguishes_jwt_from_api_key() {
        assert!(looks_like_jwt("aaa.bbb.ccc"));
        assert!(!looks_like_jwt(&generate_api_key().plaintext));
        assert!(!looks_like_jwt("a.b"));
    }
}
