use std::{
    collections::HashSet,
    io::Cursor,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use iced::{Point, Rectangle, Size, Vector};
use iced_core::image::Handle;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use tileview::{
    Error, Fetch, MapConfig, MapDisplay, Projector, TileCoord, TileDone, Viewport,
    sources::{Attribution, TileProvider},
};

#[derive(Debug)]
struct TestProvider;

fn url(tile_id: TileCoord) -> String {
    format!("test://{}/{}/{}", tile_id.zoom(), tile_id.x(), tile_id.y())
}

impl TileProvider for TestProvider {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        vec![url(tile_id)]
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "test",
            url: "test://",
        }
    }
}

/// Serves `ready` tiles, fails `broken` ones and never answers for anything else.
#[derive(Debug, Default)]
struct StubFetcher {
    ready: HashSet<String>,
    broken: HashSet<String>,
    requests: Arc<AtomicUsize>,
}

impl Fetch for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.ready.contains(url) {
            Ok(png())
        } else if self.broken.contains(url) {
            Err(Error::NotFound(url.to_string()))
        } else {
            std::future::pending().await
        }
    }
}

fn png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(2, 2, Rgba([0, 128, 0, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn image() -> Handle {
    Handle::from_rgba(1, 1, vec![255u8; 4])
}

/// 512 pixels square at zoom level 2, looking at the middle of the map. Covers tiles 1 and 2
/// in both directions.
fn projector() -> Projector {
    Projector::new(
        Viewport::new(Vector::new(-128.0, -128.0), 4.0),
        Rectangle::new(Point::ORIGIN, Size::new(512.0, 512.0)),
    )
}

fn display(fetcher: StubFetcher, config: MapConfig) -> MapDisplay<StubFetcher> {
    MapDisplay::with_fetcher(
        TestProvider,
        fetcher,
        tokio::runtime::Handle::current(),
        config.with_grid_padding(0),
    )
}

#[tokio::test]
async fn loaded_tile_is_drawn_on_next_frame() {
    let first = TileCoord::new(1, 1, 2);
    let fetcher = StubFetcher {
        ready: HashSet::from([url(first)]),
        ..Default::default()
    };
    let mut display = display(fetcher, MapConfig::default());

    assert!(display.frame(&projector()).is_empty());
    assert_eq!(display.queue().in_flight_len(), 4);
    assert_eq!(display.queue().pending_len(), 0);

    assert_eq!(display.next_completed().await, Some(first));

    let tiles = display.frame(&projector());
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].coord, first);
    assert_eq!(
        tiles[0].bounds,
        Rectangle::new(Point::ORIGIN, Size::new(256.0, 256.0))
    );
    assert_eq!(display.queue().in_flight_len(), 3);
    assert_eq!(display.cache().recency().collect::<Vec<_>>(), vec![&first]);
}

#[tokio::test]
async fn dispatch_is_limited_per_frame() {
    let config = MapConfig::default()
        .with_dispatch_per_frame(1)
        .with_max_in_flight(2);
    let mut display = display(StubFetcher::default(), config);

    display.frame(&projector());
    assert_eq!(display.queue().in_flight_len(), 1);
    assert_eq!(display.queue().pending_len(), 3);

    display.frame(&projector());
    assert_eq!(display.queue().in_flight_len(), 2);

    // No room left
    display.frame(&projector());
    assert_eq!(display.queue().in_flight_len(), 2);
    assert_eq!(display.queue().pending_len(), 2);
}

#[tokio::test]
async fn ancestor_is_drawn_for_missing_tiles() {
    let mut display = display(StubFetcher::default(), MapConfig::default());
    let ancestor = TileCoord::new(0, 0, 1);
    display.tile_done(TileDone {
        coord: ancestor,
        image: Some(image()),
    });

    let tiles = display.frame(&projector());

    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].coord, ancestor);
    assert_eq!(
        tiles[0].bounds,
        Rectangle::new(Point::new(-256.0, -256.0), Size::new(512.0, 512.0))
    );
    // The ancestor does not replace the tiles it stands in for
    assert_eq!(display.queue().in_flight_len(), 4);
}

#[tokio::test]
async fn tiles_on_screen_are_never_evicted() {
    let mut display = display(
        StubFetcher::default(),
        MapConfig::default().with_max_images(2),
    );
    let visible = [
        TileCoord::new(1, 1, 2),
        TileCoord::new(2, 1, 2),
        TileCoord::new(1, 2, 2),
        TileCoord::new(2, 2, 2),
    ];
    for coord in visible {
        display.tile_done(TileDone {
            coord,
            image: Some(image()),
        });
    }

    for _ in 0..3 {
        let tiles = display.frame(&projector());
        assert_eq!(tiles.len(), 4);
        assert_eq!(display.cache().len(), 4);
        assert_eq!(display.queue().in_flight_len(), 0);
        assert_eq!(display.queue().pending_len(), 0);
    }
}

#[tokio::test]
async fn least_recently_drawn_tiles_are_evicted() {
    let mut display = display(
        StubFetcher::default(),
        MapConfig::default().with_max_images(4),
    );
    let visible = [
        TileCoord::new(1, 1, 2),
        TileCoord::new(2, 1, 2),
        TileCoord::new(1, 2, 2),
        TileCoord::new(2, 2, 2),
    ];
    for coord in visible {
        display.tile_done(TileDone {
            coord,
            image: Some(image()),
        });
    }
    display.frame(&projector());

    // Pan one tile to the right, the left column drops out of view
    let moved = Projector::new(
        Viewport::new(Vector::new(-192.0, -128.0), 4.0),
        Rectangle::new(Point::ORIGIN, Size::new(512.0, 512.0)),
    );
    let fresh = [TileCoord::new(3, 1, 2), TileCoord::new(3, 2, 2)];
    for coord in fresh {
        display.tile_done(TileDone {
            coord,
            image: Some(image()),
        });
    }
    // A result for a tile that is no longer visible
    let stale = TileCoord::new(0, 0, 2);
    display.tile_done(TileDone {
        coord: stale,
        image: Some(image()),
    });

    let tiles = display.frame(&moved);
    assert_eq!(tiles.len(), 4);
    assert_eq!(display.cache().len(), 4);
    assert!(!display.cache().contains(&visible[0]));
    assert!(!display.cache().contains(&visible[2]));
    assert!(!display.cache().contains(&stale));
    assert_eq!(
        display.cache().recency().copied().collect::<Vec<_>>(),
        vec![visible[1], fresh[0], visible[3], fresh[1]]
    );
}

#[tokio::test]
async fn failed_tile_is_retried_after_backoff() {
    let broken = TileCoord::new(1, 1, 2);
    let requests = Arc::new(AtomicUsize::new(0));
    let fetcher = StubFetcher {
        broken: HashSet::from([url(broken)]),
        requests: requests.clone(),
        ..Default::default()
    };
    let config = MapConfig::default()
        .with_retry_backoff(Duration::from_millis(50), Duration::from_millis(50));
    let mut display = display(fetcher, config);

    display.frame(&projector());
    assert!(display.queue().is_in_flight(&broken));
    assert_eq!(display.next_completed().await, Some(broken));

    // Still backing off
    display.frame(&projector());
    assert!(!display.queue().is_in_flight(&broken));
    assert!(!display.queue().is_pending(&broken));

    tokio::time::sleep(Duration::from_millis(60)).await;
    display.frame(&projector());
    assert!(display.queue().is_in_flight(&broken));

    assert_eq!(display.next_completed().await, Some(broken));
    assert!(requests.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn clear_forgets_cached_tiles() {
    let mut display = display(StubFetcher::default(), MapConfig::default());
    display.tile_done(TileDone {
        coord: TileCoord::new(1, 1, 2),
        image: Some(image()),
    });
    display.frame(&projector());

    display.clear();
    assert!(display.cache().is_empty());
    assert_eq!(display.queue().pending_len(), 0);
    assert_eq!(display.queue().in_flight_len(), 3);
}

#[test]
fn http_display_requires_runtime() {
    assert!(matches!(
        MapDisplay::new(TestProvider),
        Err(Error::NoRuntime)
    ));
}
