use crate::tile_coord::MAX_ZOOM;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("zoom level {0} is out of range")]
pub struct InvalidZoom(pub f64);

/// A fractional zoom level. The scale of a map at zoom `z` is `2^z`, so a valid [`Zoom`]
/// never produces a degenerate (zero) scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Zoom(f64);

impl TryFrom<f64> for Zoom {
    type Error = InvalidZoom;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && (0.0..=MAX_ZOOM as f64).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidZoom(value))
        }
    }
}

impl Zoom {
    pub fn f64(&self) -> f64 {
        self.0
    }

    /// The map scale at this zoom level.
    pub fn scale(&self) -> f64 {
        2f64.powf(self.0)
    }

    /// Zoom in (positive) or out (negative), saturating at the valid range.
    pub fn zoom_by(&mut self, delta: f64) {
        self.0 = (self.0 + delta).clamp(0.0, MAX_ZOOM as f64);
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(Zoom::try_from(12.5).is_ok());
        assert_eq!(Zoom::try_from(-0.1), Err(InvalidZoom(-0.1)));
        assert!(Zoom::try_from(f64::NAN).is_err());
        assert!(Zoom::try_from(31.0).is_err());
    }

    #[test]
    fn zoom_by_saturates() {
        let mut zoom = Zoom::try_from(1.0).unwrap();
        zoom.zoom_by(-3.0);
        assert_eq!(zoom.f64(), 0.0);
        assert_eq!(zoom.scale(), 1.0);

        zoom.zoom_by(2.0);
        assert_eq!(zoom.scale(), 4.0);
    }
}
