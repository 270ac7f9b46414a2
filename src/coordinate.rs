use crate::tile_coord::{MAX_ZOOM, TileCoord};

/// A fractional position in the tile grid of some zoom level.
///
/// At integral values a [`Coordinate`] addresses the top-left corner of a single tile. All
/// operations return new values, ancestors and children are derived arithmetically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub row: f64,
    pub column: f64,
    pub zoom: f64,
}

impl Coordinate {
    pub const fn new(row: f64, column: f64, zoom: f64) -> Self {
        Self { row, column, zoom }
    }

    /// Rescale the position to the equivalent position at zoom level `zoom`.
    pub fn zoom_to(&self, zoom: f64) -> Self {
        let factor = 2f64.powf(zoom - self.zoom);
        Self {
            row: self.row * factor,
            column: self.column * factor,
            zoom,
        }
    }

    pub fn zoom_by(&self, delta: f64) -> Self {
        self.zoom_to(self.zoom + delta)
    }

    /// The top-left corner of the tile enclosing this position.
    pub fn container(&self) -> Self {
        Self {
            row: self.row.floor(),
            column: self.column.floor(),
            zoom: self.zoom,
        }
    }

    pub fn right(&self) -> Self {
        Self {
            column: self.column + 1.0,
            ..*self
        }
    }

    pub fn down(&self) -> Self {
        Self {
            row: self.row + 1.0,
            ..*self
        }
    }

    pub fn round_values(&self) -> Self {
        Self {
            row: self.row.round(),
            column: self.column.round(),
            zoom: self.zoom.round(),
        }
    }

    /// Straight-line distance in row/column units. Both positions should share a zoom level.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        (self.row - other.row).hypot(self.column - other.column)
    }

    /// Round to the tile this coordinate addresses, if it lies within the tile grid.
    pub fn to_tile(&self) -> Option<TileCoord> {
        let rounded = self.round_values();
        if !(0.0..=MAX_ZOOM as f64).contains(&rounded.zoom) {
            return None;
        }

        let zoom = rounded.zoom as u8;
        let total = 2f64.powi(zoom as i32);
        let in_grid = |value: f64| (0.0..total).contains(&value);
        if !in_grid(rounded.row) || !in_grid(rounded.column) {
            return None;
        }

        TileCoord::try_new(rounded.column as u32, rounded.row as u32, zoom)
    }
}

impl From<TileCoord> for Coordinate {
    fn from(tile: TileCoord) -> Self {
        tile.coordinate()
    }
}
