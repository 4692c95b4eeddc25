//! Two-generation translation cache
//!
//! Every language pair has a *current* generation, loaded from the primary
//! store and written back by [`CacheStore::flush`], and an *old* generation
//! loaded from the backup snapshot, which is only ever read. Both are loaded
//! lazily the first time a pair is touched.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::cache::persist::{MemoryStore, PersistentStore};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::LangPair;

#[derive(Debug, Default)]
struct Generations {
    current: HashMap<String, String>,
    old: HashMap<String, String>,
    dirty: bool,
}

/// Process-lifetime cache shared by all translation threads
pub struct CacheStore {
    primary: Box<dyn PersistentStore>,
    backup: Box<dyn PersistentStore>,
    pairs: Mutex<HashMap<LangPair, Generations>>,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Create a cache over a primary and a backup store
    pub fn new(primary: Box<dyn PersistentStore>, backup: Box<dyn PersistentStore>) -> Self {
        Self {
            primary,
            backup,
            pairs: Mutex::new(HashMap::new()),
        }
    }

    /// Cache that starts empty and persists nowhere
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<LangPair, Generations>>> {
        self.pairs.lock().map_err(|e| TranslationError::LockPoisoned {
            message: format!("translation cache: {}", e),
        })
    }

    fn generations<'a>(
        &self,
        pairs: &'a mut HashMap<LangPair, Generations>,
        pair: &LangPair,
    ) -> Result<&'a mut Generations> {
        if !pairs.contains_key(pair) {
            let table = pair.table_name();
            let current = self.primary.load(&table)?;
            let old = self.backup.load(&table)?;
            info!(
                "Loaded {} items ({} in backup) for {}",
                current.len(),
                old.len(),
                table
            );
            pairs.insert(
                pair.clone(),
                Generations {
                    current,
                    old,
                    dirty: false,
                },
            );
        }
        pairs.get_mut(pair).ok_or_else(|| TranslationError::Config {
            message: format!("cache for {} vanished", pair),
        })
    }

    /// Find a translation, promoting hits from the old generation
    pub fn lookup(&self, pair: &LangPair, text: &str) -> Result<Option<String>> {
        let mut pairs = self.lock()?;
        let generations = self.generations(&mut pairs, pair)?;

        if let Some(hit) = generations.current.get(text).filter(|t| !t.is_empty()) {
            return Ok(Some(hit.clone()));
        }
        match generations.old.get(text).filter(|t| !t.is_empty()).cloned() {
            Some(hit) => {
                debug!("Promoted [{}]{:?} from the backup cache", pair, text);
                generations.current.insert(text.to_string(), hit.clone());
                generations.dirty = true;
                Ok(Some(hit))
            }
            None => Ok(None),
        }
    }

    /// Record a translation in the current generation
    pub fn store(&self, pair: &LangPair, text: &str, translated: &str) -> Result<()> {
        let mut pairs = self.lock()?;
        let generations = self.generations(&mut pairs, pair)?;
        generations
            .current
            .insert(text.to_string(), translated.to_string());
        generations.dirty = true;
        Ok(())
    }

    /// Force `text` to translate as `translated` from now on
    pub fn suggest(&self, pair: &LangPair, text: &str, translated: &str) -> Result<()> {
        debug!(
            "Suggest {:?} ({}) as {:?} ({})",
            text, pair.from, translated, pair.to
        );
        let mut pairs = self.lock()?;
        let generations = self.generations(&mut pairs, pair)?;
        if let Some(previous) = generations.current.get(text) {
            if !previous.is_empty() && previous != translated {
                debug!(
                    "Translation of [{}]{:?} changed: {:?} -> {:?}",
                    pair, text, previous, translated
                );
            }
        }
        generations
            .current
            .insert(text.to_string(), translated.to_string());
        generations.dirty = true;
        Ok(())
    }

    /// Number of entries in the current generation of `pair`
    pub fn len(&self, pair: &LangPair) -> Result<usize> {
        let mut pairs = self.lock()?;
        Ok(self.generations(&mut pairs, pair)?.current.len())
    }

    /// Write every modified current generation to the primary store
    pub fn flush(&self) -> Result<usize> {
        let mut pairs = self.lock()?;
        let mut written = 0;
        for (pair, generations) in pairs.iter_mut().filter(|(_, g)| g.dirty) {
            self.primary.save(&pair.table_name(), &generations.current)?;
            generations.dirty = false;
            written += generations.current.len();
            info!("Saved {} items for {}", generations.current.len(), pair);
        }
        Ok(written)
    }
}
