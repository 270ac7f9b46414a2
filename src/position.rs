//! Project the lat/lon coordinates into a 2D x/y using the Web Mercator.
//! <https://en.wikipedia.org/wiki/Web_Mercator_projection>
//! <https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames>

use crate::coordinate::Coordinate;
use std::f64::consts::PI;

/// A position on the 2D mercator map projection.
/// Values range from `[-1 .. =1]` in both
/// x (east positive) and y (south positive) directions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    x: f64,
    y: f64,
}

impl Mercator {
    pub const fn new(east: f64, south: f64) -> Self {
        Self {
            x: east.clamp(-1., 1.),
            y: south.clamp(-1., 1.),
        }
    }

    pub fn as_geographic(&self) -> Geographic {
        Geographic::new(
            (self.x * PI).to_degrees(),
            -(self.y * PI).sinh().atan().to_degrees(),
        )
    }

    pub fn east_x(&self) -> f64 {
        self.x
    }

    pub fn south_y(&self) -> f64 {
        self.y
    }

    /// The fractional tile grid position of this point at some zoom level.
    pub fn coordinate(&self, zoom: f64) -> Coordinate {
        Coordinate::new((self.y + 1.0) / 2.0, (self.x + 1.0) / 2.0, 0.0).zoom_to(zoom)
    }

    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        let coordinate = coordinate.zoom_to(0.0);
        Self::new(coordinate.column * 2.0 - 1.0, coordinate.row * 2.0 - 1.0)
    }
}

/// A position on a sphere consisting of longitude
/// and latitude components, ranging from `[-180 .. =180]`
/// and `[-90 .. =90]` respectively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geographic {
    lon: f64,
    lat: f64,
}

impl Geographic {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon: lon.clamp(-180., 180.),
            lat: lat.clamp(-90., 90.),
        }
    }

    pub fn as_mercator(&self) -> Mercator {
        Mercator::new(
            self.lon.to_radians() / PI,
            -self.lat.to_radians().tan().asinh() / PI,
        )
    }

    pub fn longitude(&self) -> f64 {
        self.lon
    }

    pub fn latitude(&self) -> f64 {
        self.lat
    }
}
