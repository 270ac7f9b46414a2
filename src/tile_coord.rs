use crate::coordinate::Coordinate;

/// Deepest zoom level a [`TileCoord`] can address.
pub const MAX_ZOOM: u8 = 30;

// zoom level   tile coverage  number of tiles  tile size(*) in degrees
// 0            1 tile         1 tile           360° x 170.1022°
// 1            2 × 2 tiles    4 tiles          180° x 85.0511°
// 2            4 × 4 tiles    16 tiles         90° x [variable]

pub(crate) fn total_tiles(zoom: u8) -> u32 {
    2u32.pow(zoom as u32)
}

/// Identifies a tile in the tile grid. This is the key of the [`crate::TileCache`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column of the tile.
    x: u32,

    /// Row of the tile.
    y: u32,

    /// Zoom level, where 0 means no zoom.
    /// See: <https://wiki.openstreetmap.org/wiki/Zoom_levels>
    zoom: u8,
}

impl TileCoord {
    /// The lowest-quality zoom level
    pub const ZERO: Self = TileCoord {
        x: 0,
        y: 0,
        zoom: 0,
    };

    /// Create a tile id, clamping the position into the grid of the zoom level.
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let num_tiles = total_tiles(zoom);
        TileCoord {
            x: x.clamp(0, num_tiles - 1),
            y: y.clamp(0, num_tiles - 1),
            zoom,
        }
    }

    /// Create a tile id, or `None` if the position is outside the grid of the zoom level.
    pub fn try_new(x: u32, y: u32, zoom: u8) -> Option<Self> {
        let tile = TileCoord { x, y, zoom };
        tile.valid().then_some(tile)
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn x_y(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// The fractional coordinate of the top-left corner of this tile.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.y as f64, self.x as f64, self.zoom as f64)
    }

    /// The fractional coordinate of the middle of this tile.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.y as f64 + 0.5, self.x as f64 + 0.5, self.zoom as f64)
    }

    /// Obtain the tile at a lower zoom level that covers this tile.
    pub fn ancestor(&self, zoom: u8) -> Option<TileCoord> {
        let levels = self.zoom.checked_sub(zoom)?;
        Some(TileCoord {
            x: self.x >> levels,
            y: self.y >> levels,
            zoom,
        })
    }

    // Obtain a lower-zoom level TileCoord that covers this tile.
    pub fn downsample(&self) -> Option<TileCoord> {
        self.ancestor(self.zoom.checked_sub(1)?)
    }

    /// The four tiles at the next zoom level, in reading order.
    pub fn children(&self) -> Option<[TileCoord; 4]> {
        let zoom = self.zoom.checked_add(1).filter(|zoom| *zoom <= MAX_ZOOM)?;
        let (x, y) = (self.x * 2, self.y * 2);
        Some([
            TileCoord { x, y, zoom },
            TileCoord { x: x + 1, y, zoom },
            TileCoord { x, y: y + 1, zoom },
            TileCoord {
                x: x + 1,
                y: y + 1,
                zoom,
            },
        ])
    }

    /// The Bing Maps quadkey of this tile.
    /// See: <https://learn.microsoft.com/en-us/bingmaps/articles/bing-maps-tile-system>
    pub fn quadkey(&self) -> String {
        (1..=self.zoom)
            .rev()
            .map(|level| {
                let mask = 1u32 << (level - 1);
                let mut digit = b'0';
                if self.x & mask != 0 {
                    digit += 1;
                }
                if self.y & mask != 0 {
                    digit += 2;
                }
                digit as char
            })
            .collect()
    }

    pub fn valid(&self) -> bool {
        self.zoom <= MAX_ZOOM && self.x < total_tiles(self.zoom) && self.y < total_tiles(self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_into_grid() {
        let tile = TileCoord::new(7, 9, 2);
        assert_eq!(tile.x_y(), (3, 3));
        assert_eq!(TileCoord::try_new(4, 0, 2), None);
    }

    #[test]
    fn ancestors() {
        let tile = TileCoord::new(13, 6, 4);
        assert_eq!(tile.downsample(), TileCoord::try_new(6, 3, 3));
        assert_eq!(tile.ancestor(1), TileCoord::try_new(1, 0, 1));
        assert_eq!(tile.ancestor(0), Some(TileCoord::ZERO));
        assert_eq!(tile.ancestor(5), None);
        assert_eq!(TileCoord::ZERO.downsample(), None);
    }

    #[test]
    fn children_cover_parent() {
        let tile = TileCoord::new(1, 2, 2);
        let children = tile.children().unwrap();
        assert_eq!(children[0], TileCoord::new(2, 4, 3));
        assert_eq!(children[3], TileCoord::new(3, 5, 3));
        assert!(children.iter().all(|child| child.downsample() == Some(tile)));
    }

    #[test]
    fn quadkeys() {
        assert_eq!(TileCoord::new(3, 5, 3).quadkey(), "213");
        assert_eq!(TileCoord::new(35210, 21493, 16).quadkey(), "1202102332221212");
        assert_eq!(TileCoord::ZERO.quadkey(), "");
    }

    #[test]
    fn coordinate_round_trip() {
        let tile = TileCoord::new(5, 9, 4);
        assert_eq!(tile.coordinate().to_tile(), Some(tile));
        assert_eq!(tile.center().container().to_tile(), Some(tile));
    }
}
