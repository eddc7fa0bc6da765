//! Process-wide metadata cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use verity_core::ConfigurationError;

use crate::{BeanMetadata, MetadataBuilder, MetadataProvider};

/// Lazily built, build-once cache of flattened type metadata.
///
/// Reads take a short shared lock and clone an `Arc`. A miss upgrades
/// to the write lock and builds while holding it, so a type's metadata
/// is built at most once even under concurrent first access. Entries
/// are immutable afterwards and live as long as the cache.
pub struct MetadataCache {
    provider: Arc<dyn MetadataProvider>,
    cache: RwLock<HashMap<String, Arc<BeanMetadata>>>,
}

impl MetadataCache {
    /// Create a cache over a provider.
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get or build the metadata for a type.
    pub fn get(&self, type_name: &str) -> Result<Arc<BeanMetadata>, ConfigurationError> {
        if let Some(metadata) = self.cache.read().get(type_name) {
            return Ok(metadata.clone());
        }

        let mut cache = self.cache.write();
        // Another thread may have built it while we waited.
        if let Some(metadata) = cache.get(type_name) {
            return Ok(metadata.clone());
        }

        debug!(type_name, "building constraint metadata");
        let built = MetadataBuilder::new(self.provider.as_ref()).build(type_name)?;
        let metadata = Arc::new(built);
        cache.insert(type_name.to_string(), metadata.clone());
        Ok(metadata)
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns true if nothing has been built yet.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
