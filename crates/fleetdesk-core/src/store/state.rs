// ── Mirror lifecycle state ──

use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::EntityId;

/// Where a mirror is in its load cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    NotStarted,
    Loading,
    Ready,
    /// The last load failed. Entities from the previous successful load,
    /// if any, are still held.
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Everything a subscriber sees: the load state and the entities in
/// server order, keyed by id so no id appears twice.
#[derive(Debug)]
pub struct MirrorState<T> {
    pub load: LoadState,
    pub entities: Arc<IndexMap<EntityId, Arc<T>>>,
}

impl<T> MirrorState<T> {
    /// Entities in order, as cheap `Arc` clones.
    pub fn to_vec(&self) -> Vec<Arc<T>> {
        self.entities.values().cloned().collect()
    }

    pub fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.entities.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T> Clone for MirrorState<T> {
    fn clone(&self) -> Self {
        Self {
            load: self.load.clone(),
            entities: Arc::clone(&self.entities),
        }
    }
}

impl<T> Default for MirrorState<T> {
    fn default() -> Self {
        Self {
            load: LoadState::NotStarted,
            entities: Arc::new(IndexMap::new()),
        }
    }
}
