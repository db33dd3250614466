//! Champion metadata collaborator.
//!
//! Submitted champion identifiers are validated for existence against a
//! remote champion list, fetched once and cached in-process. The engine
//! must degrade gracefully: when no catalog is configured (or the fetch
//! fails) any well-formed id is accepted — the draft rules themselves do
//! not depend on champion metadata.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Champion id validity lookup.
#[async_trait]
pub trait ChampionCatalog: Send + Sync {
    /// Whether the id names a known champion. Implementations must err on
    /// the side of acceptance when the backing source is unavailable.
    async fn is_valid(&self, champion_id: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Accepts any id. Used when no catalog endpoint is configured.
pub struct OpenCatalog;

#[async_trait]
impl ChampionCatalog for OpenCatalog {
    async fn is_valid(&self, _champion_id: &str) -> bool {
        true
    }
}

/// Fetches a JSON array of champion ids from a remote endpoint on first
/// use and caches it for the process lifetime.
pub struct HttpChampionCatalog {
    client: reqwest::Client,
    url: String,
    cache: RwLock<Option<HashSet<String>>>,
}

impl HttpChampionCatalog {
    pub fn new(url: String) -> HttpChampionCatalog {
        HttpChampionCatalog {
            client: reqwest::Client::new(),
            url,
            cache: RwLock::new(None),
        }
    }

    async fn load(&self) -> Option<HashSet<String>> {
        let response = self.client.get(&self.url).send().await.ok()?;
        let ids: Vec<String> = response.error_for_status().ok()?.json().await.ok()?;
        Some(ids.into_iter().collect())
    }
}

#[async_trait]
impl ChampionCatalog for HttpChampionCatalog {
    async fn is_valid(&self, champion_id: &str) -> bool {
        if let Some(cache) = self.cache.read().await.as_ref() {
            return cache.contains(champion_id);
        }

        let loaded = self.load().await;
        let mut guard = self.cache.write().await;
        match loaded {
            Some(ids) => {
                let valid = ids.contains(champion_id);
                *guard = Some(ids);
                valid
            }
            None => {
                // Catalog unreachable: accept and let availability rules
                // do the real gatekeeping.
                tracing::warn!(url = %self.url, "Champion catalog unreachable, accepting id");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_catalog_accepts_anything() {
        assert!(OpenCatalog.is_valid("ahri").await);
        assert!(OpenCatalog.is_valid("not-a-champion").await);
    }
}
