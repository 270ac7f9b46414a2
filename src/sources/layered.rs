use super::{Attribution, TileProvider};
use crate::{Coordinate, Geographic, TileCoord};

/// A base provider with one or more overlay layers composited on top of every tile.
///
/// Overlays are URL templates where `{z}`, `{x}`, `{y}` and `{q}` (quadkey) are substituted.
/// They are drawn in the order they were added.
#[derive(Debug)]
pub struct Layered<P> {
    base: P,
    overlays: Vec<String>,
}

impl<P: TileProvider> Layered<P> {
    pub fn new(base: P) -> Self {
        Self {
            base,
            overlays: Vec::new(),
        }
    }

    pub fn with_overlay(mut self, template: impl Into<String>) -> Self {
        self.overlays.push(template.into());
        self
    }
}

fn expand(template: &str, tile_id: TileCoord) -> String {
    template
        .replace("{z}", &tile_id.zoom().to_string())
        .replace("{x}", &tile_id.x().to_string())
        .replace("{y}", &tile_id.y().to_string())
        .replace("{q}", &tile_id.quadkey())
}

impl<P: TileProvider> TileProvider for Layered<P> {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        let mut urls = self.base.tile_urls(tile_id);
        urls.extend(
            self.overlays
                .iter()
                .map(|template| expand(template, tile_id)),
        );
        urls
    }

    fn attribution(&self) -> Attribution {
        self.base.attribution()
    }

    fn source_coordinate(&self, coordinate: Coordinate) -> Coordinate {
        self.base.source_coordinate(coordinate)
    }

    fn location_to_coordinate(&self, location: Geographic) -> Coordinate {
        self.base.location_to_coordinate(location)
    }

    fn coordinate_to_location(&self, coordinate: Coordinate) -> Geographic {
        self.base.coordinate_to_location(coordinate)
    }

    fn min_zoom(&self) -> u8 {
        self.base.min_zoom()
    }

    fn max_zoom(&self) -> u8 {
        self.base.max_zoom()
    }
}
