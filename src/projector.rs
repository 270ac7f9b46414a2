use iced::{Point, Rectangle, Vector};

use crate::{Coordinate, Geographic, TileCoord, Zoom, sources::TileProvider};

/// Size in pixels of the single zoom level 0 tile at a scale of 1.
pub const BASE_SIZE: f64 = 256.0;

/// The affine transform of the map display: the world is translated by `offset` (in zoom level
/// 0 pixels), scaled by `scale` and placed at the center of the display bounds.
///
/// `scale` must be positive and finite. A [`Viewport`] built from a [`Zoom`] always is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub offset: Vector<f64>,
    pub scale: f64,
}

impl Viewport {
    pub fn new(offset: Vector<f64>, scale: f64) -> Self {
        debug_assert!(
            scale.is_finite() && scale > 0.0,
            "degenerate viewport scale {scale}"
        );
        Self { offset, scale }
    }

    /// The transform that centers `location` in the display at the given zoom level.
    pub fn looking_at(provider: &dyn TileProvider, location: Geographic, zoom: Zoom) -> Self {
        let coordinate = provider.location_to_coordinate(location).zoom_to(0.0);
        Self::new(
            Vector::new(-coordinate.column * BASE_SIZE, -coordinate.row * BASE_SIZE),
            zoom.scale(),
        )
    }

    /// The fractional zoom level of the current scale.
    pub fn zoom(&self) -> f64 {
        self.scale.log2()
    }

    /// Move the map by a distance in screen pixels.
    pub fn pan_by(&mut self, delta: Vector) {
        self.offset = Vector::new(
            self.offset.x + delta.x as f64 / self.scale,
            self.offset.y + delta.y as f64 / self.scale,
        );
    }

    /// Zoom in/out while keeping the map position under `anchor` in place. This would
    /// typically be the cursor position.
    pub fn zoom_around(&mut self, zoom: Zoom, anchor: Point, bounds: Rectangle) {
        let projector = Projector {
            viewport: *self,
            bounds,
        };
        let (world_x, world_y) = projector.screen_into_world(anchor);
        let (center_x, center_y) = projector.center();

        self.scale = zoom.scale();
        self.offset = Vector::new(
            (anchor.x as f64 - center_x) / self.scale - world_x,
            (anchor.y as f64 - center_y) / self.scale - world_y,
        );
    }
}

/// Utility for projecting between screen space, the tile grid and geographic locations.
///
/// - The screen space has its origin in the top-left of the window, the display occupies
///   `bounds`.
/// - The world space is measured in pixels of the zoom level 0 tile, origin in its top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub viewport: Viewport,
    pub bounds: Rectangle,
}

impl Projector {
    pub fn new(viewport: Viewport, bounds: Rectangle) -> Self {
        Self { viewport, bounds }
    }

    fn center(&self) -> (f64, f64) {
        (
            self.bounds.x as f64 + self.bounds.width as f64 / 2.0,
            self.bounds.y as f64 + self.bounds.height as f64 / 2.0,
        )
    }

    fn world_into_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let (center_x, center_y) = self.center();
        let Viewport { offset, scale } = self.viewport;
        (
            center_x + scale * (x + offset.x),
            center_y + scale * (y + offset.y),
        )
    }

    fn screen_into_world(&self, point: Point) -> (f64, f64) {
        let (center_x, center_y) = self.center();
        let Viewport { offset, scale } = self.viewport;
        (
            (point.x as f64 - center_x) / scale - offset.x,
            (point.y as f64 - center_y) / scale - offset.y,
        )
    }

    /// Screen-space box of the zoom level 0 tile. All tiles of all zoom levels subdivide it.
    pub fn reference_tile(&self) -> Rectangle<f64> {
        let (min_x, min_y) = self.world_into_screen(0.0, 0.0);
        let (max_x, max_y) = self.world_into_screen(BASE_SIZE, BASE_SIZE);
        Rectangle {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// The integral zoom level whose tiles best match the current scale.
    pub fn zoom_level(&self, min_zoom: u8, max_zoom: u8) -> u8 {
        let zoom = self.viewport.zoom().round();
        zoom.clamp(min_zoom as f64, max_zoom as f64) as u8
    }

    /// Determines the screen space position of a fractional tile grid position.
    ///
    /// The returned [`Point`] may not be within screen bounds
    pub fn coordinate_into_screen(&self, coordinate: Coordinate) -> Point {
        let coordinate = coordinate.zoom_to(0.0);
        let (x, y) =
            self.world_into_screen(coordinate.column * BASE_SIZE, coordinate.row * BASE_SIZE);
        Point::new(x as f32, y as f32)
    }

    /// Determines the zoom level 0 tile grid position under a screen space point, by
    /// interpolating the point against the reference tile.
    pub fn screen_into_coordinate(&self, point: Point) -> Coordinate {
        let reference = self.reference_tile();
        let column = (point.x as f64 - reference.x) / reference.width;
        let row = (point.y as f64 - reference.y) / reference.height;
        Coordinate::new(row, column, 0.0)
    }

    /// The tile grid position at the middle of the display.
    pub fn center_coordinate(&self) -> Coordinate {
        let (x, y) = self.center();
        self.screen_into_coordinate(Point::new(x as f32, y as f32))
    }

    pub fn location_into_screen(&self, provider: &dyn TileProvider, location: Geographic) -> Point {
        self.coordinate_into_screen(provider.location_to_coordinate(location))
    }

    pub fn screen_into_location(&self, provider: &dyn TileProvider, point: Point) -> Geographic {
        provider.coordinate_to_location(self.screen_into_coordinate(point))
    }

    /// The area on the screen a tile covers at the current transform.
    pub fn tile_bounds(&self, tile: TileCoord) -> Rectangle {
        let top_left = tile.coordinate().zoom_to(0.0);
        let (x, y) = self.world_into_screen(top_left.column * BASE_SIZE, top_left.row * BASE_SIZE);
        let size = self.viewport.scale * BASE_SIZE / 2f64.powi(tile.zoom() as i32);
        Rectangle {
            x: x as f32,
            y: y as f32,
            width: size as f32,
            height: size as f32,
        }
    }
}
