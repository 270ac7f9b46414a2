use super::{Attribution, OSM_ATTRIBUTION, TileProvider};
use crate::TileCoord;

/// Pixel density of the served images. Denser tiles cover the same map area, they are
/// only sharper on high resolution displays.
#[derive(Debug, Clone, Copy)]
pub enum Scale {
    X1 = 1,
    X2 = 2,
    X4 = 4,
}

fn carto_url(style: &str, tile_id: TileCoord, scale: Scale) -> String {
    let suffix = match scale {
        Scale::X1 => String::new(),
        scale => format!("@{}x", scale as u32),
    };
    format!(
        "https://basemaps.cartocdn.com/{}/{}/{}/{}{}.png",
        style,
        tile_id.zoom(),
        tile_id.x(),
        tile_id.y(),
        suffix,
    )
}

/// <https://carto.com/basemaps>
#[derive(Debug, Clone, Copy)]
pub struct CartoLight(pub Scale);

impl TileProvider for CartoLight {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        vec![carto_url("light_all", tile_id, self.0)]
    }

    fn attribution(&self) -> Attribution {
        OSM_ATTRIBUTION
    }
}

/// <https://carto.com/basemaps>
#[derive(Debug, Clone, Copy)]
pub struct CartoDark(pub Scale);

impl TileProvider for CartoDark {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        vec![carto_url("dark_all", tile_id, self.0)]
    }

    fn attribution(&self) -> Attribution {
        OSM_ATTRIBUTION
    }
}

/// <https://carto.com/basemaps>
#[derive(Debug, Clone, Copy)]
pub struct CartoVoyager(pub Scale);

impl TileProvider for CartoVoyager {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        vec![carto_url("rastertiles/voyager", tile_id, self.0)]
    }

    fn attribution(&self) -> Attribution {
        OSM_ATTRIBUTION
    }
}
