use std::{path::PathBuf, time::Duration};

use crate::fetch_queue::Backoff;

/// Tunables of a [`crate::MapDisplay`].
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Number of drawn tiles kept in memory.
    pub max_images: usize,
    /// Extra rows and columns of tiles requested around the viewport.
    pub grid_padding: u32,
    /// Tiles handed to the loader per frame.
    pub dispatch_per_frame: usize,
    /// Tiles being loaded at any time.
    pub max_in_flight: usize,
    /// Concurrent HTTP requests, shared by all URLs of all tiles in flight.
    pub max_concurrent_requests: usize,
    /// Upper bound for loading one tile, including all of its layers.
    pub fetch_timeout: Duration,
    pub retry_backoff: Backoff,
    /// Capacity of the channel carrying loaded tiles back to the display.
    pub completion_capacity: usize,
    pub user_agent: String,
    /// Directory for a persistent HTTP cache of tile responses.
    pub http_cache_dir: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            max_images: 256,
            grid_padding: 1,
            dispatch_per_frame: 4,
            max_in_flight: 4,
            max_concurrent_requests: 6,
            fetch_timeout: Duration::from_secs(10),
            retry_backoff: Backoff::default(),
            completion_capacity: 64,
            user_agent: concat!("lib-tileview/", env!("CARGO_PKG_VERSION")).to_string(),
            http_cache_dir: None,
        }
    }
}

impl MapConfig {
    pub fn with_max_images(self, max_images: usize) -> Self {
        Self { max_images, ..self }
    }

    pub fn with_grid_padding(self, grid_padding: u32) -> Self {
        Self {
            grid_padding,
            ..self
        }
    }

    pub fn with_dispatch_per_frame(self, dispatch_per_frame: usize) -> Self {
        Self {
            dispatch_per_frame,
            ..self
        }
    }

    pub fn with_max_in_flight(self, max_in_flight: usize) -> Self {
        Self {
            max_in_flight,
            ..self
        }
    }

    pub fn with_max_concurrent_requests(self, max_concurrent_requests: usize) -> Self {
        Self {
            max_concurrent_requests: max_concurrent_requests.max(1),
            ..self
        }
    }

    pub fn with_fetch_timeout(self, fetch_timeout: Duration) -> Self {
        Self {
            fetch_timeout,
            ..self
        }
    }

    pub fn with_retry_backoff(self, base: Duration, max: Duration) -> Self {
        Self {
            retry_backoff: Backoff { base, max },
            ..self
        }
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..self
        }
    }

    /// Keep HTTP responses in a disk cache, honouring the cache headers of the tile server.
    pub fn with_http_cache(self, directory: impl Into<PathBuf>) -> Self {
        Self {
            http_cache_dir: Some(directory.into()),
            ..self
        }
    }
}
