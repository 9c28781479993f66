//! filter::registry
//!
//! Lookup of filters by machine name or UUID.

use std::sync::Arc;

use uuid::Uuid;

use super::{Filter, FilterMetadata};
use crate::filters;

/// A set of available filters.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in filter.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(filters::ImportGeometryFromFile));
        registry.register(Arc::new(filters::ExportStore));
        registry.register(Arc::new(filters::ReadStore));
        registry.register(Arc::new(filters::CreateDataGroup));
        registry.register(Arc::new(filters::DeleteData));
        registry
    }

    /// Add a filter, replacing any filter with the same name or UUID.
    pub fn register(&mut self, filter: Arc<dyn Filter>) {
        let meta = filter.metadata();
        self.filters.retain(|f| {
            let m = f.metadata();
            m.name != meta.name && m.uuid != meta.uuid
        });
        self.filters.push(filter);
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.filters
            .iter()
            .find(|f| f.metadata().name == name)
            .cloned()
    }

    pub fn by_uuid(&self, uuid: &Uuid) -> Option<Arc<dyn Filter>> {
        self.filters
            .iter()
            .find(|f| f.metadata().uuid == *uuid)
            .cloned()
    }

    /// Resolve either a machine name or a UUID string.
    pub fn resolve(&self, id: &str) -> Option<Arc<dyn Filter>> {
        self.by_name(id)
            .or_else(|| Uuid::parse_str(id).ok().and_then(|u| self.by_uuid(&u)))
    }

    /// Metadata of every registered filter, sorted by name.
    pub fn list(&self) -> Vec<FilterMetadata> {
        let mut all: Vec<_> = self.filters.iter().map(|f| f.metadata()).collect();
        all.sort_by(|a, b| a.name.cmp(b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|x| x.metadata().name))
            .finish()
    }
}
