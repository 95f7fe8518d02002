//! Cache of resolved node declarations
//!
//! Holds the last declaration resolved for each node, so unchanged nodes are
//! not re-declared when only part of the graph is dirty.

use std::collections::HashMap;

use crate::nodes::builder::Declaration;
use crate::nodes::NodeId;

/// Statistics about cache usage
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStatistics {
    pub total_entries: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Number of entries evicted due to invalidation
    pub cache_invalidations: usize,
}

impl CacheStatistics {
    pub fn hit_ratio(&self) -> f32 {
        let total_accesses = self.cache_hits + self.cache_misses;
        if total_accesses == 0 {
            0.0
        } else {
            self.cache_hits as f32 / total_accesses as f32
        }
    }
}

#[derive(Debug, Default)]
pub struct DeclarationCache {
    cache: HashMap<NodeId, Declaration>,
    stats: CacheStatistics,
}

impl DeclarationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_id: NodeId, declaration: Declaration) {
        if self.cache.insert(node_id, declaration).is_none() {
            self.stats.total_entries += 1;
        }
    }

    pub fn get(&mut self, node_id: NodeId) -> Option<&Declaration> {
        if self.cache.contains_key(&node_id) {
            self.stats.cache_hits += 1;
        } else {
            self.stats.cache_misses += 1;
        }
        self.cache.get(&node_id)
    }

    /// Lookup without touching statistics
    pub fn peek(&self, node_id: NodeId) -> Option<&Declaration> {
        self.cache.get(&node_id)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.cache.contains_key(&node_id)
    }

    /// Drop the entry for a node, returning whether one existed
    pub fn invalidate(&mut self, node_id: NodeId) -> bool {
        let removed = self.cache.remove(&node_id).is_some();
        if removed {
            self.stats.total_entries -= 1;
            self.stats.cache_invalidations += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.stats.cache_invalidations += self.cache.len();
        self.stats.total_entries = 0;
        self.cache.clear();
    }

    pub fn get_statistics(&self) -> &CacheStatistics {
        &self.stats
    }

    /// Reset hit/miss counters, keeping structural stats
    pub fn reset_statistics(&mut self) {
        self.stats.cache_hits = 0;
        self.stats.cache_misses = 0;
        self.stats.cache_invalidations = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic_operations() {
        let mut cache = DeclarationCache::new();
        cache.insert(1, Declaration::default());
        assert!(cache.contains(1));

        assert!(cache.get(1).is_some());
        assert!(cache.get(2).is_none());

        let stats = cache.get_statistics();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cache_invalidation() {
        let mut cache = DeclarationCache::new();
        cache.insert(1, Declaration::default());
        cache.insert(1, Declaration::default());
        cache.insert(2, Declaration::default());
        assert_eq!(cache.get_statistics().total_entries, 2);

        assert!(cache.invalidate(1));
        assert!(!cache.invalidate(1));
        assert!(cache.peek(1).is_none());

        cache.clear();
        let stats = cache.get_statistics();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.cache_invalidations, 2);

        cache.reset_statistics();
        assert_eq!(cache.get_statistics().cache_invalidations, 0);
    }
}
