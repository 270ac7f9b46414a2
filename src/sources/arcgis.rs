use super::{Attribution, TileProvider};
use crate::TileCoord;

/// Esri World Imagery. Note that this server addresses tiles as `zoom/row/column`.
#[derive(Debug, Clone, Copy)]
pub struct ArcGisWorldMap;

impl TileProvider for ArcGisWorldMap {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        vec![format!(
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
            tile_id.zoom(),
            tile_id.y(),
            tile_id.x(),
        )]
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Esri, Maxar, Earthstar Geographics, and the GIS User Community",
            url: "https://www.esri.com/en-us/legal/terms/full-master-agreement",
        }
    }
}
