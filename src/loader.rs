use std::{future::Future, sync::Arc, time::Duration};

use http_cache_reqwest::{CACacheManager, Cache, CacheMode, HttpCache, HttpCacheOptions};
use iced_core::image::Handle;
use image::RgbaImage;
use reqwest_middleware::ClientWithMiddleware;
use tokio::{
    runtime,
    sync::{Semaphore, mpsc},
};

use crate::{config::MapConfig, error::Error, sources::TileProvider, tile_coord::TileCoord};

/// Transport used by the [`TileLoader`] to retrieve the raw bytes behind a tile URL.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, Error>> + Send;
}

/// Fetches tiles over HTTP(S), optionally through a persistent HTTP cache.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    pub fn new(config: &MapConfig) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .build()?;

        let mut builder = reqwest_middleware::ClientBuilder::new(client);
        if let Some(directory) = &config.http_cache_dir {
            log::debug!("Caching tile responses in {}", directory.display());
            builder = builder.with(Cache(HttpCache {
                mode: CacheMode::Default,
                manager: CACacheManager::new(directory.clone(), true),
                options: HttpCacheOptions::default(),
            }));
        }

        Ok(Self {
            client: builder.build(),
        })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        // Make request to tile source and get response
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// The outcome of loading a tile. `image` is `None` when fetching or decoding failed.
#[derive(Debug, Clone)]
pub struct TileDone {
    pub coord: TileCoord,
    pub image: Option<Handle>,
}

/// Pool of loader tasks. [`TileLoader::load`] only spawns work, results arrive on the
/// receiver returned by [`TileLoader::new`].
#[derive(Debug)]
pub struct TileLoader<F> {
    fetcher: Arc<F>,
    provider: Arc<dyn TileProvider>,
    runtime: runtime::Handle,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    sender: mpsc::Sender<TileDone>,
}

impl<F: Fetch> TileLoader<F> {
    /// The runtime must have its timer enabled.
    pub fn new(
        fetcher: F,
        provider: Arc<dyn TileProvider>,
        runtime: runtime::Handle,
        config: &MapConfig,
    ) -> (Self, mpsc::Receiver<TileDone>) {
        let (sender, receiver) = mpsc::channel(config.completion_capacity.max(1));
        let loader = Self {
            fetcher: Arc::new(fetcher),
            provider,
            runtime,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            timeout: config.fetch_timeout,
            sender,
        };
        (loader, receiver)
    }

    /// Start loading a tile in the background. Exactly one [`TileDone`] is sent per call, even
    /// when the loading task panics.
    pub fn load(&self, tile_id: TileCoord) {
        let fetcher = self.fetcher.clone();
        let provider = self.provider.clone();
        let semaphore = self.semaphore.clone();
        let sender = self.sender.clone();
        let timeout = self.timeout;

        let loading = self.runtime.spawn(async move {
            let urls = provider.tile_urls(tile_id);
            let loading = load_tile(fetcher.as_ref(), &semaphore, tile_id, urls);

            match tokio::time::timeout(timeout, loading).await {
                Ok(Ok(handle)) => Some(handle),
                Ok(Err(error)) => {
                    log::warn!("Failed to load tile {tile_id:?}: {error}");
                    None
                }
                Err(_) => {
                    log::warn!("Failed to load tile {tile_id:?}: {}", Error::Timeout);
                    None
                }
            }
        });

        self.runtime.spawn(async move {
            let image = match loading.await {
                Ok(image) => image,
                Err(error) => {
                    log::error!("Loader of tile {tile_id:?} stopped: {error}");
                    None
                }
            };

            if sender
                .send(TileDone {
                    coord: tile_id,
                    image,
                })
                .await
                .is_err()
            {
                log::trace!("Map display dropped before tile {tile_id:?} arrived");
            }
        });
    }
}

async fn load_tile<F: Fetch>(
    fetcher: &F,
    semaphore: &Semaphore,
    tile_id: TileCoord,
    urls: Vec<String>,
) -> Result<Handle, Error> {
    let mut urls = urls.into_iter();
    let base_url = urls.next().ok_or(Error::NoSource(tile_id))?;
    let base = fetch_url(fetcher, semaphore, &base_url).await?;

    let mut overlays = Vec::new();
    for url in urls {
        match fetch_url(fetcher, semaphore, &url).await {
            Ok(bytes) => overlays.push(bytes),
            Err(error) => log::debug!("Skipping overlay {url}: {error}"),
        }
    }

    let image = tokio::task::spawn_blocking(move || composite(&base, &overlays)).await??;
    let (width, height) = image.dimensions();
    Ok(Handle::from_rgba(width, height, image.into_raw()))
}

async fn fetch_url<F: Fetch>(
    fetcher: &F,
    semaphore: &Semaphore,
    url: &str,
) -> Result<Vec<u8>, Error> {
    // Semaphore ensures we are not making too many requests
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|_| Error::SemaphoreClosed)?;

    log::trace!("Fetching {url}");
    fetcher.fetch(url).await
}

/// Decode the base layer and blend every decodable overlay on top of it, in order.
pub(crate) fn composite(base: &[u8], overlays: &[Vec<u8>]) -> Result<RgbaImage, Error> {
    let mut image = image::load_from_memory(base)?.to_rgba8();

    for overlay in overlays {
        match image::load_from_memory(overlay) {
            Ok(layer) => image::imageops::overlay(&mut image, &layer.to_rgba8(), 0, 0),
            Err(error) => log::debug!("Skipping undecodable overlay: {error}"),
        }
    }

    Ok(image)
}
