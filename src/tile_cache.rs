use std::collections::{HashMap, HashSet, VecDeque};

use iced_core::image::Handle;

use crate::tile_coord::TileCoord;

/// The cache which holds the decoded raster tiles of one map display.
///
/// Entries are ordered by when they were last drawn. Tiles that were fetched but never drawn
/// are not in that order yet, they are kept until the next eviction.
#[derive(Debug, Default)]
pub struct TileCache {
    images: HashMap<TileCoord, Handle>,
    recency: VecDeque<TileCoord>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tile_id: &TileCoord) -> Option<&Handle> {
        self.images.get(tile_id)
    }

    pub fn contains(&self, tile_id: &TileCoord) -> bool {
        self.images.contains_key(tile_id)
    }

    /// Insert a decoded tile. Replacing an existing image keeps its recency position.
    pub fn put(&mut self, tile_id: TileCoord, handle: Handle) {
        self.images.insert(tile_id, handle);
    }

    pub fn remove(&mut self, tile_id: &TileCoord) -> Option<Handle> {
        let handle = self.images.remove(tile_id)?;
        self.recency.retain(|recent| recent != tile_id);
        Some(handle)
    }

    /// Mark a tile as just drawn, moving it to the most recent position.
    pub fn touch(&mut self, tile_id: TileCoord) {
        if !self.images.contains_key(&tile_id) {
            return;
        }
        if let Some(index) = self.recency.iter().position(|recent| *recent == tile_id) {
            self.recency.remove(index);
        }
        self.recency.push_back(tile_id);
    }

    /// Drop the least recently drawn tiles until at most `max_count` remain in the recency
    /// list. When anything was dropped, tiles that were never drawn go as well, so the cache
    /// holds exactly the tiles of the recency list afterwards. Returns the number of evicted
    /// tiles.
    pub fn evict_excess(&mut self, max_count: usize) -> usize {
        let excess = self.recency.len().saturating_sub(max_count);
        if excess == 0 {
            return 0;
        }

        self.recency.drain(..excess);
        let recent: HashSet<TileCoord> = self.recency.iter().copied().collect();
        let before = self.images.len();
        self.images.retain(|tile_id, _| recent.contains(tile_id));

        let evicted = before - self.images.len();
        log::trace!("Evicted {evicted} tiles, {} remain", self.images.len());
        evicted
    }

    /// Tiles in the order they were drawn, least recent first.
    pub fn recency(&self) -> impl Iterator<Item = &TileCoord> {
        self.recency.iter()
    }

    pub fn recency_len(&self) -> usize {
        self.recency.len()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TileCoord> {
        self.images.keys()
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.recency.clear();
    }

    /// Check that every drawn tile is cached and listed exactly once.
    pub(crate) fn consistent(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.recency.len());
        self.recency
            .iter()
            .all(|tile_id| self.images.contains_key(tile_id) && seen.insert(*tile_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Handle {
        Handle::from_rgba(1, 1, vec![0u8, 0, 0, 255])
    }

    fn tile(x: u32) -> TileCoord {
        TileCoord::new(x, 0, 3)
    }

    #[test]
    fn get_and_put() {
        let mut cache = TileCache::new();
        assert!(cache.is_empty());

        cache.put(tile(1), image());
        assert!(cache.contains(&tile(1)));
        assert!(cache.get(&tile(2)).is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.recency_len(), 0);
    }

    #[test]
    fn touch_moves_to_back() {
        let mut cache = TileCache::new();
        for x in 0..3 {
            cache.put(tile(x), image());
            cache.touch(tile(x));
        }
        cache.touch(tile(0));
        cache.touch(tile(0));

        let order: Vec<_> = cache.recency().copied().collect();
        assert_eq!(order, vec![tile(1), tile(2), tile(0)]);
        assert!(cache.consistent());
    }

    #[test]
    fn touching_missing_tile_is_ignored() {
        let mut cache = TileCache::new();
        cache.touch(tile(4));
        assert_eq!(cache.recency_len(), 0);
    }

    #[test]
    fn evicts_least_recently_drawn() {
        let mut cache = TileCache::new();
        let [a, b, c, d] = [tile(0), tile(1), tile(2), tile(3)];

        for tile_id in [a, b, c, d] {
            cache.put(tile_id, image());
            cache.touch(tile_id);
            cache.evict_excess(3);
        }

        let order: Vec<_> = cache.recency().copied().collect();
        assert_eq!(order, vec![b, c, d]);
        assert!(!cache.contains(&a));
        assert_eq!(cache.len(), 3);
        assert!(cache.consistent());
    }

    #[test]
    fn undrawn_tiles_are_evicted() {
        let mut cache = TileCache::new();
        cache.put(tile(7), image());
        for x in 0..4 {
            cache.put(tile(x), image());
            cache.touch(tile(x));
        }

        assert_eq!(cache.evict_excess(2), 3);
        assert!(!cache.contains(&tile(7)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.recency().copied().collect::<Vec<_>>(), vec![tile(2), tile(3)]);
    }

    #[test]
    fn undrawn_tiles_wait_for_eviction() {
        let mut cache = TileCache::new();
        cache.put(tile(0), image());
        cache.touch(tile(0));
        cache.put(tile(7), image());

        // Nothing to drop yet
        assert_eq!(cache.evict_excess(1), 0);
        assert!(cache.contains(&tile(7)));
    }

    #[test]
    fn every_key_is_recent_after_eviction() {
        let late = |x| TileCoord::new(x, 1, 3);
        let mut cache = TileCache::new();
        for round in 0..6u32 {
            // A drawn tile, and a late arrival that is never drawn
            cache.put(tile(round), image());
            cache.touch(tile(round));
            cache.put(late(round), image());
            cache.touch(tile(round / 2));

            if cache.evict_excess(3) > 0 {
                assert_eq!(cache.len(), cache.recency_len());
                assert!(cache.keys().all(|key| cache.recency().any(|recent| recent == key)));
            }
            assert!(cache.recency_len() <= 3);
            assert!(cache.consistent());
        }
        assert!(cache.len() <= 4);
    }

    #[test]
    fn remove_and_clear() {
        let mut cache = TileCache::new();
        cache.put(tile(0), image());
        cache.touch(tile(0));
        cache.put(tile(1), image());

        assert!(cache.remove(&tile(0)).is_some());
        assert_eq!(cache.recency_len(), 0);
        assert!(cache.consistent());

        cache.clear();
        assert!(cache.is_empty());
    }
}
