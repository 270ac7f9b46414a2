use super::{Attribution, TileProvider};
use crate::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualEarthStyle {
    Road,
    Aerial,
    Hybrid,
}

impl VirtualEarthStyle {
    fn prefix(&self) -> char {
        match self {
            VirtualEarthStyle::Road => 'r',
            VirtualEarthStyle::Aerial => 'a',
            VirtualEarthStyle::Hybrid => 'h',
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            VirtualEarthStyle::Road => "png",
            VirtualEarthStyle::Aerial | VirtualEarthStyle::Hybrid => "jpeg",
        }
    }
}

/// Microsoft Virtual Earth tiles, addressed by quadkey and spread over four subdomains.
/// <https://learn.microsoft.com/en-us/bingmaps/articles/bing-maps-tile-system>
#[derive(Debug, Clone, Copy)]
pub struct VirtualEarth(pub VirtualEarthStyle);

impl TileProvider for VirtualEarth {
    fn tile_urls(&self, tile_id: TileCoord) -> Vec<String> {
        let quadkey = tile_id.quadkey();
        let server = (tile_id.x() + tile_id.y()) % 4;
        vec![format!(
            "https://ecn.t{}.tiles.virtualearth.net/tiles/{}{}.{}?g=1",
            server,
            self.0.prefix(),
            quadkey,
            self.0.extension(),
        )]
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Microsoft Corporation",
            url: "https://www.microsoft.com/maps/product/terms.html",
        }
    }

    fn min_zoom(&self) -> u8 {
        1
    }
}
