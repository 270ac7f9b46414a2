use crate::tile_coord::TileCoord;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Middleware(#[from] reqwest_middleware::Error),
    #[error("Could not decode tile image")]
    Image(#[from] image::ImageError),
    #[error("The tile request timed out")]
    Timeout,
    #[error("The semaphore was closed")]
    SemaphoreClosed,
    #[error("A tokio runtime is required to load tiles")]
    NoRuntime,
    #[error("The decoding task failed")]
    Join(#[from] tokio::task::JoinError),
    #[error("The provider has no source for tile {0:?}")]
    NoSource(TileCoord),
    #[error("Nothing found at {0}")]
    NotFound(String),
}
