use std::{sync::Arc, time::Instant};

use iced::Rectangle;
use iced_core::image::Handle;
use tokio::{runtime, sync::mpsc};

use crate::{
    config::MapConfig,
    error::Error,
    fetch_queue::FetchQueue,
    loader::{Fetch, HttpFetcher, TileDone, TileLoader},
    projector::Projector,
    resolver::VisibilityResolver,
    sources::{Attribution, TileProvider},
    tile_cache::TileCache,
    tile_coord::TileCoord,
};

/// A tile to paint: its image and the area of the screen it covers.
#[derive(Debug, Clone)]
pub struct DrawTile {
    pub coord: TileCoord,
    pub handle: Handle,
    pub bounds: Rectangle,
}

/// The state behind one map view: the tile cache, the fetch queue and the loader feeding them.
///
/// Call [`MapDisplay::frame`] once per rendered frame. Everything but the loading itself happens
/// synchronously within that call, loaded tiles are picked up at the start of the next one.
#[derive(Debug)]
pub struct MapDisplay<F = HttpFetcher> {
    provider: Arc<dyn TileProvider>,
    config: MapConfig,
    cache: TileCache,
    queue: FetchQueue,
    resolver: VisibilityResolver,
    loader: TileLoader<F>,
    completed: mpsc::Receiver<TileDone>,
}

impl MapDisplay<HttpFetcher> {
    /// Create a display fetching tiles over HTTP. Must be called from within a tokio runtime.
    pub fn new(provider: impl TileProvider + 'static) -> Result<Self, Error> {
        Self::with_config(provider, MapConfig::default())
    }

    pub fn with_config(
        provider: impl TileProvider + 'static,
        config: MapConfig,
    ) -> Result<Self, Error> {
        let runtime = runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Self::with_runtime(provider, config, runtime)
    }

    /// Create a display that spawns its loaders on the given runtime.
    pub fn with_runtime(
        provider: impl TileProvider + 'static,
        config: MapConfig,
        runtime: runtime::Handle,
    ) -> Result<Self, Error> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(MapDisplay::with_fetcher(provider, fetcher, runtime, config))
    }
}

impl<F: Fetch> MapDisplay<F> {
    /// Create a display with a custom transport for tile data.
    pub fn with_fetcher(
        provider: impl TileProvider + 'static,
        fetcher: F,
        runtime: runtime::Handle,
        config: MapConfig,
    ) -> Self {
        let provider: Arc<dyn TileProvider> = Arc::new(provider);
        let (loader, completed) = TileLoader::new(fetcher, provider.clone(), runtime, &config);

        Self {
            provider,
            cache: TileCache::new(),
            queue: FetchQueue::new(config.retry_backoff),
            resolver: VisibilityResolver::new(config.grid_padding),
            loader,
            completed,
            config,
        }
    }

    pub fn provider(&self) -> &dyn TileProvider {
        self.provider.as_ref()
    }

    pub fn attribution(&self) -> Attribution {
        self.provider.attribution()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn queue(&self) -> &FetchQueue {
        &self.queue
    }

    /// Process one frame: apply loaded tiles, work out which tiles the viewport needs, start
    /// loading the most important missing ones and return what to paint, coarsest tiles first.
    pub fn frame(&mut self, projector: &Projector) -> Vec<DrawTile> {
        let now = Instant::now();
        self.receive_completed(now);

        let visible = self.resolver.resolve(
            projector,
            self.provider.as_ref(),
            &self.cache,
            &mut self.queue,
            now,
        );

        let free = self
            .config
            .max_in_flight
            .saturating_sub(self.queue.in_flight_len());
        for tile_id in self.queue.dispatch(self.config.dispatch_per_frame.min(free)) {
            log::debug!("Loading tile {tile_id:?}");
            self.loader.load(tile_id);
        }

        let tiles: Vec<DrawTile> = visible
            .tiles
            .iter()
            .filter_map(|tile_id| {
                let handle = self.cache.get(tile_id)?;
                Some(DrawTile {
                    coord: *tile_id,
                    handle: handle.clone(),
                    bounds: projector.tile_bounds(*tile_id),
                })
            })
            .collect();

        for tile in &tiles {
            self.cache.touch(tile.coord);
        }
        // Drawn tiles are the most recent ones, keep at least all of them
        self.cache.evict_excess(self.config.max_images.max(tiles.len()));

        debug_assert!(self.cache.consistent(), "recency list out of sync");
        debug_assert!(
            self.queue.consistent(|tile_id| self.cache.contains(tile_id)),
            "tile both cached and queued"
        );

        tiles
    }

    /// Apply the result of loading a tile. Failed tiles are retried on a later frame, as long
    /// as they are still needed.
    pub fn tile_done(&mut self, done: TileDone) {
        self.apply(done, Instant::now());
    }

    fn apply(&mut self, done: TileDone, now: Instant) {
        match done.image {
            Some(handle) => {
                log::debug!("Tile {:?} loaded", done.coord);
                self.queue.complete(&done.coord);
                self.cache.put(done.coord, handle);
            }
            None => self.queue.fail(&done.coord, now),
        }
    }

    /// Apply every tile that finished loading since the last call. Returns how many there were.
    pub fn receive_completed(&mut self, now: Instant) -> usize {
        let mut received = 0;
        while let Ok(done) = self.completed.try_recv() {
            self.apply(done, now);
            received += 1;
        }
        received
    }

    /// Wait until a tile finishes loading and apply it. Useful to request a redraw when new
    /// tiles arrive, rather than polling.
    pub async fn next_completed(&mut self) -> Option<TileCoord> {
        let done = self.completed.recv().await?;
        let coord = done.coord;
        self.apply(done, Instant::now());
        Some(coord)
    }

    /// Forget all cached and pending tiles. Tiles still being loaded arrive as usual.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.queue.clear();
    }
}
