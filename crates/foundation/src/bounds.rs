use crate::math::LonLat;

/// Axis-aligned lon/lat rectangle in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: LonLat,
    pub max: LonLat,
}

impl GeoBounds {
    pub fn new(min: LonLat, max: LonLat) -> Self {
        GeoBounds { min, max }
    }

    pub fn from_degrees(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        GeoBounds::new(LonLat::new(min_lon, min_lat), LonLat::new(max_lon, max_lat))
    }

    pub fn lon_span(&self) -> f64 {
        self.max.lon_deg - self.min.lon_deg
    }

    pub fn lat_span(&self) -> f64 {
        self.max.lat_deg - self.min.lat_deg
    }

    /// Maps unit fractions `u`, `v` in `[0, 1)` onto the rectangle.
    pub fn lerp(&self, u: f64, v: f64) -> LonLat {
        LonLat::new(
            self.min.lon_deg + u * self.lon_span(),
            self.min.lat_deg + v * self.lat_span(),
        )
    }

    /// Inclusive on all edges.
    pub fn contains(&self, p: LonLat) -> bool {
        p.lon_deg >= self.min.lon_deg
            && p.lon_deg <= self.max.lon_deg
            && p.lat_deg >= self.min.lat_deg
            && p.lat_deg <= self.max.lat_deg
    }
}
