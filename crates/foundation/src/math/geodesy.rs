/// Longitude bounds in degrees.
pub const LON_MIN_DEG: f64 = -180.0;
pub const LON_MAX_DEG: f64 = 180.0;
/// Latitude bounds in degrees.
pub const LAT_MIN_DEG: f64 = -90.0;
pub const LAT_MAX_DEG: f64 = 90.0;

/// WGS84 position in degrees, longitude first (KML axis order).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// False for non-finite or out-of-range components.
    pub fn is_valid(&self) -> bool {
        self.lon_deg.is_finite()
            && self.lat_deg.is_finite()
            && (LON_MIN_DEG..=LON_MAX_DEG).contains(&self.lon_deg)
            && (LAT_MIN_DEG..=LAT_MAX_DEG).contains(&self.lat_deg)
    }
}
