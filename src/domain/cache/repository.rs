//! Cache transport seen by the domain

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// String key-value store with per-entry expiry.
///
/// Payloads cross the trait as JSON text so implementations can be used as
/// `Arc<dyn Cache>`; [`CacheExt`] layers typed access on top.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores `value` under `key`, replacing any previous entry and its TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// `true` when an entry was removed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Drops every entry this cache owns
    async fn clear(&self) -> Result<(), DomainError>;

    /// Approximate entry count
    async fn size(&self) -> Result<usize, DomainError>;

    async fn is_available(&self) -> bool {
        true
    }
}

fn decode<V: DeserializeOwned>(key: &str, payload: &str) -> Result<V, DomainError> {
    serde_json::from_str(payload)
        .map_err(|e| DomainError::serialization(format!("Undecodable cache entry '{}': {}", key, e)))
}

fn encode<V: Serialize + ?Sized>(key: &str, value: &V) -> Result<String, DomainError> {
    serde_json::to_string(value)
        .map_err(|e| DomainError::serialization(format!("Unencodable cache entry '{}': {}", key, e)))
}

/// Typed access through JSON; implemented for every [`Cache`]
pub trait CacheExt: Cache {
    /// A payload that no longer decodes as `V` is a serialization error, not a miss
    fn get<'a, V>(&'a self, key: &'a str) -> impl Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            self.get_raw(key)
                .await?
                .map(|payload| decode(key, &payload))
                .transpose()
        }
    }

    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let payload = encode(key, value)?;
            self.set_raw(key, &payload, ttl).await
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
