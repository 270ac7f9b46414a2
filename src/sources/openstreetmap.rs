use super::{Attribution, OSM_ATTRIBUTION, TileProvider};
use crate::TileCoord;

/// <https://www.openstreetmap.org/about>
#[derive(Debug, Clone, Copy)]
pub struct OpenStreetMap;

impl TileProvider for OpenStreetMap {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        vec![format!(
            "https://tile.openstreetmap.org/{}/{}/{}.png",
            tile_id.zoom(),
            tile_id.x(),
            tile_id.y()
        )]
    }

    fn attribution(&self) -> Attribution {
        OSM_ATTRIBUTION
    }
}

/// <https://opentopomap.org/about>
#[derive(Debug, Clone, Copy)]
pub struct OpenTopo;

impl TileProvider for OpenTopo {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        vec![format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom(),
            tile_id.x(),
            tile_id.y()
        )]
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "OpenStreetMap contributors, SRTM | OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/about",
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}
