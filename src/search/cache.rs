use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info};

use crate::error::{LoaderError, Result};
use crate::recipe::Corpus;
use crate::search::data_loader::{load_corpus_from_reader, LoaderOptions};
use crate::search::engine::{search, QueryFilters, ScoredResult};
use crate::search::vector_space::{build_vector_space, VectorSpace};

/// A loaded corpus together with the vector space fitted over it.
#[derive(Debug)]
pub struct SearchIndex {
    corpus: Corpus,
    vector_space: VectorSpace,
}

impl SearchIndex {
    pub fn build(corpus: Corpus) -> Result<Self> {
        let vector_space = build_vector_space(&corpus)?;
        Ok(Self {
            corpus,
            vector_space,
        })
    }

    pub fn from_bytes(bytes: &[u8], options: &LoaderOptions) -> Result<Self> {
        Self::build(load_corpus_from_reader(bytes, options)?)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn vector_space(&self) -> &VectorSpace {
        &self.vector_space
    }

    pub fn search(&self, query: &str, filters: &QueryFilters) -> Vec<ScoredResult<'_>> {
        search(query, &self.vector_space, &self.corpus, filters)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    digest: [u8; 32],
    options: LoaderOptions,
}

impl CacheKey {
    fn new(bytes: &[u8], options: &LoaderOptions) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            digest: hasher.finalize().into(),
            options: *options,
        }
    }

    fn short_hex(&self) -> String {
        self.digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

type Slot = Arc<Mutex<Option<Arc<SearchIndex>>>>;

/// Builds each distinct source at most once and hands out shared handles.
///
/// Sources are keyed by the SHA-256 of their bytes plus the loader options,
/// so an edited file is a new entry. Concurrent callers asking for the same
/// key wait on that key's slot while other keys proceed. A failed build
/// leaves the slot empty and the next caller retries.
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static IndexCache {
        static CACHE: OnceLock<IndexCache> = OnceLock::new();
        CACHE.get_or_init(IndexCache::new)
    }

    pub fn get_or_load(&self, path: &Path, options: &LoaderOptions) -> Result<Arc<SearchIndex>> {
        let bytes = read_source(path)?;
        self.get_or_build(&bytes, options)
    }

    pub fn get_or_build(&self, bytes: &[u8], options: &LoaderOptions) -> Result<Arc<SearchIndex>> {
        let key = CacheKey::new(bytes, options);
        let slot = self.slot(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = guard.as_ref() {
            debug!(key = %key.short_hex(), "search index cache hit");
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(SearchIndex::from_bytes(bytes, options)?);
        info!(key = %key.short_hex(), recipes = index.corpus().len(), "search index built");
        *guard = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Rebuilds `path` even if an index for its current contents is cached.
    pub fn reload(&self, path: &Path, options: &LoaderOptions) -> Result<Arc<SearchIndex>> {
        let bytes = read_source(path)?;
        let key = CacheKey::new(&bytes, options);
        let slot = self.slot(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let index = Arc::new(SearchIndex::from_bytes(&bytes, options)?);
        info!(key = %key.short_hex(), recipes = index.corpus().len(), "search index reloaded");
        *guard = Some(Arc::clone(&index));
        Ok(index)
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Number of sources with a built index.
    pub fn len(&self) -> usize {
        self.lock_entries()
            .values()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: CacheKey) -> Slot {
        Arc::clone(self.lock_entries().entry(key).or_default())
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(LoaderError::data_source(format!(
            "Recipe CSV file not found at: {:?}",
            path
        )));
    }
    std::fs::read(path).map_err(|e| {
        LoaderError::data_source_with(format!("Failed to read recipe CSV file at {:?}", path), e)
    })
}
