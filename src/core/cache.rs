//! Key-value persistence abstraction used by the rate cache

use async_trait::async_trait;

/// A named collection of byte keys and values.
///
/// Implementations swallow storage errors and log them; a failed read looks
/// like a missing key to the caller.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8]);
}
