use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::CacheError;

/// Identifies one memoized call.
///
/// The key is the lowercase hex SHA-256 of the function name, a NUL
/// separator, and the JSON encoding of the arguments. Identical arguments
/// always produce the same key; it is also safe to use as a file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for calling `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Key`] if `args` cannot be serialized to JSON.
    pub fn derive<A: Serialize + ?Sized>(name: &str, args: &A) -> Result<Self, CacheError> {
        let encoded = serde_json::to_vec(args)?;

        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(&encoded);

        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
