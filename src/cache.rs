//! Batch-scoped read-through memoisation.
//!
//! A cache lives for one batch and is dropped with it; entries never expire.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;

use crate::source::{DataSource, InhibitionRecord, ProcessRecord, ReleaseRecord, WaferCondition};
use crate::SourceError;

/// Concurrent "compute if absent" map.
///
/// Each key is populated at most once even when several threads ask for it at
/// the same time: late callers block until the first computation finishes. A
/// failed computation leaves the key empty.
#[derive(Debug)]
pub struct BatchCache<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for BatchCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> BatchCache<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `compute` if absent.
    ///
    /// # Errors
    ///
    /// Returns the error of `compute`; nothing is cached in that case.
    pub fn get_or_try_compute<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let cell = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };
        cell.get_or_try_init(compute).cloned()
    }

    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        match self.get_or_try_compute(key, || Ok::<V, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Number of populated keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|cell| cell.get().is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn tool_key(tool_ids: &[String]) -> Vec<String> {
    let mut key = tool_ids.to_vec();
    key.sort();
    key.dedup();
    key
}

/// A [`DataSource`] that memoises every lookup of the wrapped source for one batch.
pub struct CachedSource<'a> {
    inner: &'a dyn DataSource,
    forward: BatchCache<(String, String), Vec<ProcessRecord>>,
    inhibition: BatchCache<(String, Vec<String>), Vec<InhibitionRecord>>,
    wafer: BatchCache<String, Option<WaferCondition>>,
    release: BatchCache<(String, Vec<String>), Vec<ReleaseRecord>>,
    section: BatchCache<String, Option<String>>,
}

impl<'a> CachedSource<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn DataSource) -> Self {
        Self {
            inner,
            forward: BatchCache::new(),
            inhibition: BatchCache::new(),
            wafer: BatchCache::new(),
            release: BatchCache::new(),
            section: BatchCache::new(),
        }
    }

    /// Total number of memoised lookups.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.forward.len()
            + self.inhibition.len()
            + self.wafer.len()
            + self.release.len()
            + self.section.len()
    }
}

impl DataSource for CachedSource<'_> {
    fn forward_processes(
        &self,
        runcard_id: &str,
        condition: &str,
    ) -> Result<Vec<ProcessRecord>, SourceError> {
        self.forward
            .get_or_try_compute((runcard_id.to_owned(), condition.to_owned()), || {
                self.inner.forward_processes(runcard_id, condition)
            })
    }

    fn inhibition_records(
        &self,
        tool_ids: &[String],
        recipe_id: &str,
    ) -> Result<Vec<InhibitionRecord>, SourceError> {
        self.inhibition
            .get_or_try_compute((recipe_id.to_owned(), tool_key(tool_ids)), || {
                self.inner.inhibition_records(tool_ids, recipe_id)
            })
    }

    fn wafer_condition(&self, runcard_id: &str) -> Result<Option<WaferCondition>, SourceError> {
        self.wafer
            .get_or_try_compute(runcard_id.to_owned(), || self.inner.wafer_condition(runcard_id))
    }

    fn release_records(
        &self,
        recipe_id: &str,
        tool_ids: &[String],
    ) -> Result<Vec<ReleaseRecord>, SourceError> {
        self.release
            .get_or_try_compute((recipe_id.to_owned(), tool_key(tool_ids)), || {
                self.inner.release_records(recipe_id, tool_ids)
            })
    }

    fn engineer_section(&self, engineer: &str) -> Result<Option<String>, SourceError> {
        self.section
            .get_or_try_compute(engineer.to_owned(), || self.inner.engineer_section(engineer))
    }
}
