//! Some common HTTP tile sources. Make sure you follow terms of usage of the particular source.

mod arcgis;
mod carto;
mod layered;
mod openstreetmap;
mod virtual_earth;

pub use arcgis::ArcGisWorldMap;
pub use carto::*;
pub use layered::Layered;
pub use openstreetmap::{OpenStreetMap, OpenTopo};
pub use virtual_earth::{VirtualEarth, VirtualEarthStyle};

use crate::{Coordinate, Geographic, Mercator, TileCoord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
    pub text: &'static str,
    pub url: &'static str,
}

/// Remote tile server definition, consumed by the [`crate::MapDisplay`].
///
/// Only [`TileProvider::tile_urls`] and [`TileProvider::attribution`] are required. The
/// remaining methods default to the Web Mercator slippy map scheme used by most servers.
pub trait TileProvider: core::fmt::Debug + Send + Sync {
    /// One or more URLs making up the tile. Additional URLs are composited on top of the first.
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String>;

    fn attribution(&self) -> Attribution;

    /// Normalize a coordinate into the addressing of this provider.
    fn source_coordinate(&self, coordinate: Coordinate) -> Coordinate {
        coordinate
    }

    /// Project a location onto the tile grid, at zoom level 0.
    fn location_to_coordinate(&self, location: Geographic) -> Coordinate {
        location.as_mercator().coordinate(0.0)
    }

    fn coordinate_to_location(&self, coordinate: Coordinate) -> Geographic {
        Mercator::from_coordinate(coordinate).as_geographic()
    }

    fn min_zoom(&self) -> u8 {
        0
    }

    fn max_zoom(&self) -> u8 {
        19
    }
}

impl<P: TileProvider + ?Sized> TileProvider for Box<P> {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        (**self).tile_urls(tile_id)
    }

    fn attribution(&self) -> Attribution {
        (**self).attribution()
    }

    fn source_coordinate(&self, coordinate: Coordinate) -> Coordinate {
        (**self).source_coordinate(coordinate)
    }

    fn location_to_coordinate(&self, location: Geographic) -> Coordinate {
        (**self).location_to_coordinate(location)
    }

    fn coordinate_to_location(&self, coordinate: Coordinate) -> Geographic {
        (**self).coordinate_to_location(coordinate)
    }

    fn min_zoom(&self) -> u8 {
        (**self).min_zoom()
    }

    fn max_zoom(&self) -> u8 {
        (**self).max_zoom()
    }
}

pub(crate) const OSM_ATTRIBUTION: Attribution = Attribution {
    text: "OpenStreetMap contributors",
    url: "https://www.openstreetmap.org/copyright",
};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_projection_round_trip() {
        let provider = OpenStreetMap;
        let paris = Geographic::new(2.3522, 48.8566);

        let coordinate = provider.location_to_coordinate(paris);
        assert_eq!(coordinate.zoom, 0.0);

        let back = provider.coordinate_to_location(coordinate.zoom_to(11.0));
        assert_relative_eq!(back.longitude(), paris.longitude(), epsilon = 1e-9);
        assert_relative_eq!(back.latitude(), paris.latitude(), epsilon = 1e-9);
    }

    #[test]
    fn paris_tile_at_zoom_ten() {
        let provider = OpenStreetMap;
        let paris = Geographic::new(2.3522, 48.8566);

        let tile = provider
            .location_to_coordinate(paris)
            .zoom_to(10.0)
            .container()
            .to_tile()
            .unwrap();
        assert_eq!(tile.x_y(), (518, 352));
    }

    #[test]
    fn boxed_provider_delegates() {
        let provider: Box<dyn TileProvider> = Box::new(OpenTopo);
        assert_eq!(provider.max_zoom(), OpenTopo.max_zoom());
        assert_eq!(
            provider.tile_urls(TileCoord::ZERO),
            OpenTopo.tile_urls(TileCoord::ZERO)
        );
    }
}
