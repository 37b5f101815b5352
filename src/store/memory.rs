use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::types::{Entity, Repository};
use crate::error::CtrError;
use crate::models::Page;

/// In-memory implementation of Repository.
/// Records live in a BTreeMap keyed by id behind a RwLock; ids grow
/// monotonically so map order is creation order.
pub struct MemoryRepository<T> {
    records: Arc<parking_lot::RwLock<BTreeMap<i64, T>>>,
    next_id: AtomicI64,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(parking_lot::RwLock::new(BTreeMap::new())),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, CtrError> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn find_page(&self, page: usize, size: usize) -> Result<Page<T>, CtrError> {
        if size == 0 {
            return Err(CtrError::Internal("page size must be positive".to_string()));
        }
        let records = self.records.read();
        let total_items = records.len();
        let items = records
            .values()
            .skip(page.saturating_mul(size))
            .take(size)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total_items,
            total_pages: total_items.div_ceil(size),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, CtrError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_first(
        &self,
        matches: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
    ) -> Result<Option<T>, CtrError> {
        Ok(self.records.read().values().find(|record| matches(record)).cloned())
    }

    async fn create(&self, mut entity: T) -> Result<T, CtrError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        entity.set_id(id);
        self.records.write().insert(id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, CtrError> {
        let mut records = self.records.write();
        match records.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(CtrError::not_found(T::RESOURCE, entity.id())),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), CtrError> {
        self.records
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CtrError::not_found(T::RESOURCE, id))
    }
}
