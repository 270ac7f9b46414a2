pub mod sources;

mod config;
mod coordinate;
mod error;
mod fetch_queue;
mod loader;
mod map_display;
mod position;
mod projector;
mod resolver;
mod tile_cache;
mod tile_coord;
mod zoom;

pub use config::MapConfig;
pub use coordinate::Coordinate;
pub use error::Error;
pub use fetch_queue::{Backoff, FetchQueue};
pub use loader::{Fetch, HttpFetcher, TileDone, TileLoader};
pub use map_display::{DrawTile, MapDisplay};
pub use position::{Geographic, Mercator};
pub use projector::{BASE_SIZE, Projector, Viewport};
pub use resolver::{Visible, VisibilityResolver};
pub use tile_cache::TileCache;
pub use tile_coord::{MAX_ZOOM, TileCoord};
pub use zoom::{InvalidZoom, Zoom};
