use std::{collections::HashSet, ops::RangeInclusive, time::Instant};

use crate::{
    coordinate::Coordinate,
    fetch_queue::FetchQueue,
    projector::Projector,
    sources::TileProvider,
    tile_cache::TileCache,
    tile_coord::{TileCoord, total_tiles},
};

/// The tiles to draw for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Visible {
    /// Required tiles and the cached stand-ins for missing ones, coarsest zoom level first.
    pub tiles: Vec<TileCoord>,
    /// The zoom level the viewport is drawn at.
    pub zoom: u8,
    /// Middle of the viewport, in the tile grid of `zoom`.
    pub center: Coordinate,
}

/// Determines which tiles cover the viewport, requests the missing ones and finds cached
/// ancestors or children to draw in their place meanwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityResolver {
    /// Extra rows and columns around the viewport, so tiles are ready when panning.
    pub padding: u32,
}

impl VisibilityResolver {
    pub fn new(padding: u32) -> Self {
        Self { padding }
    }

    /// The rows and columns of the grid at `zoom` the viewport overlaps, padded and clamped
    /// to the grid. `None` when the viewport lies entirely outside the map.
    pub fn grid_range(
        &self,
        projector: &Projector,
        zoom: u8,
    ) -> Option<(RangeInclusive<u32>, RangeInclusive<u32>)> {
        let tiles = total_tiles(zoom) as f64;
        let reference = projector.reference_tile();
        let bounds = projector.bounds;

        // Interpolate the viewport edges against the reference tile
        let left = (bounds.x as f64 - reference.x) / reference.width;
        let right = ((bounds.x + bounds.width) as f64 - reference.x) / reference.width;
        let top = (bounds.y as f64 - reference.y) / reference.height;
        let bottom = ((bounds.y + bounds.height) as f64 - reference.y) / reference.height;

        let padding = self.padding as i64;
        let last = tiles as i64 - 1;
        let span = |start: f64, end: f64| {
            let low = (tiles * start).floor() as i64 - padding;
            let high = (tiles * end).ceil() as i64 - 1 + padding;

            // No wrapping around the world, tiles outside the grid are dropped
            let low = low.max(0);
            let high = high.min(last);
            (low <= high).then(|| low as u32..=high as u32)
        };

        Some((span(top, bottom)?, span(left, right)?))
    }

    /// Compute the tiles to draw and update the fetch queue for the current viewport.
    pub fn resolve(
        &self,
        projector: &Projector,
        provider: &dyn TileProvider,
        cache: &TileCache,
        queue: &mut FetchQueue,
        now: Instant,
    ) -> Visible {
        let zoom = projector.zoom_level(provider.min_zoom(), provider.max_zoom());
        let center = projector.center_coordinate().zoom_to(zoom as f64);

        let mut tiles = Vec::new();
        let mut seen: HashSet<TileCoord> = HashSet::new();
        let mut include = |tile_id: TileCoord, tiles: &mut Vec<TileCoord>| {
            if seen.insert(tile_id) {
                tiles.push(tile_id);
            }
        };

        if let Some((rows, columns)) = self.grid_range(projector, zoom) {
            for row in rows {
                for column in columns.clone() {
                    let coordinate = provider
                        .source_coordinate(Coordinate::new(row as f64, column as f64, zoom as f64))
                        .round_values();
                    let Some(tile_id) = coordinate.to_tile() else {
                        log::trace!("Provider maps ({row}, {column}) outside the grid");
                        continue;
                    };

                    include(tile_id, &mut tiles);

                    if cache.contains(&tile_id) {
                        continue;
                    }

                    queue.enqueue(tile_id, now);
                    for substitute in substitutes(coordinate, cache) {
                        include(substitute, &mut tiles);
                    }
                }
            }
        }

        // Draw coarse tiles first, so finer tiles end up on top
        tiles.sort_by_key(|tile_id| tile_id.zoom());

        queue.retain_all(&seen);
        queue.prioritize(center);

        Visible {
            tiles,
            zoom,
            center,
        }
    }
}

/// Cached tiles that can be drawn in place of the missing tile at `coordinate`: the nearest
/// cached ancestor down to zoom level 1, otherwise any cached children.
fn substitutes(coordinate: Coordinate, cache: &TileCache) -> Vec<TileCoord> {
    let zoom = coordinate.zoom as u8;

    for level in (1..zoom).rev() {
        let ancestor = coordinate.zoom_to(level as f64).container().to_tile();
        if let Some(ancestor) = ancestor.filter(|ancestor| cache.contains(ancestor)) {
            return vec![ancestor];
        }
    }

    let child = coordinate.zoom_by(1.0).container();
    [child, child.right(), child.down(), child.right().down()]
        .into_iter()
        .filter_map(|child| child.round_values().to_tile())
        .filter(|child| cache.contains(child))
        .collect()
}
