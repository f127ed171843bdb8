//! In-memory geocoding cache
//!
//! Place name (exact input string) → resolved coordinates. Lives as long as
//! the resolver that owns it; nothing is evicted and nothing is written to
//! disk, so a new run starts cold.

use jobmap_common::Coordinates;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct GeoCache {
    entries: HashMap<String, Coordinates>,
}

impl GeoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: &str) -> Option<Coordinates> {
        self.entries.get(location).copied()
    }

    pub fn insert(&mut self, location: String, coordinates: Coordinates) {
        self.entries.insert(location, coordinates);
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_and_miss() {
        let mut cache = GeoCache::new();
        assert!(cache.is_empty());

        cache.insert("Leeds".into(), Coordinates::new(53.79, -1.54));

        assert_eq!(cache.get("Leeds"), Some(Coordinates::new(53.79, -1.54)));
        assert!(cache.get("leeds").is_none(), "keys are exact strings");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_overwrite() {
        let mut cache = GeoCache::new();
        cache.insert("York".into(), Coordinates::new(0.0, 0.0));
        cache.insert("York".into(), Coordinates::new(53.96, -1.08));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("York"), Some(Coordinates::new(53.96, -1.08)));
    }
}
