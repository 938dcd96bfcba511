use std::num::NonZeroUsize;
use std::path::Path;

use foundation::LonLat;
use serde::Deserialize;

use crate::config::ConfigError;

/// A named camera target.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub position: LonLat,
    /// LookAt range in meters.
    pub view_range: f64,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, lon_deg: f64, lat_deg: f64, view_range: f64) -> Self {
        Self {
            name: name.into(),
            position: LonLat::new(lon_deg, lat_deg),
            view_range,
        }
    }
}

/// 1-based position in a [`Catalog`]. Index 0 never exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaypointIndex(NonZeroUsize);

impl WaypointIndex {
    pub const FIRST: WaypointIndex = WaypointIndex(NonZeroUsize::MIN);

    pub fn new(index: usize) -> Option<Self> {
        NonZeroUsize::new(index).map(WaypointIndex)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// On-disk shape of a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WaypointSpec {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub range: f64,
}

/// Immutable, non-empty waypoint sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    waypoints: Vec<Waypoint>,
}

impl Catalog {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, ConfigError> {
        if waypoints.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for (i, wp) in waypoints.iter().enumerate() {
            if wp.name.trim().is_empty() {
                return Err(ConfigError::BlankWaypointName { index: i + 1 });
            }
            if !wp.position.is_valid() {
                return Err(ConfigError::InvalidPosition {
                    name: wp.name.clone(),
                    lon: wp.position.lon_deg,
                    lat: wp.position.lat_deg,
                });
            }
            if !wp.view_range.is_finite() || wp.view_range < 0.0 {
                return Err(ConfigError::InvalidRange {
                    name: wp.name.clone(),
                    range: wp.view_range,
                });
            }
        }
        Ok(Self { waypoints })
    }

    /// One LookAt per continent.
    pub fn continents() -> Self {
        Self {
            waypoints: vec![
                Waypoint::new("Australia", 134.6, -20.47, 3_500_000.0),
                Waypoint::new("Antarctica", 138.3, -86.37, 4_700_000.0),
                Waypoint::new("Europe", 18.37, 49.18, 3_400_000.0),
                Waypoint::new("Africa", 13.15, -1.01, 5_600_000.0),
                Waypoint::new("South America", -67.09, -22.48, 5_600_000.0),
                Waypoint::new("Asia", 102.0, 33.7, 4_700_000.0),
                Waypoint::new("North America", -100.7, 31.7, 4_200_000.0),
            ],
        }
    }

    /// Parses a JSON array of `{name, longitude, latitude, range}` objects.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let specs: Vec<WaypointSpec> = serde_json::from_str(raw)?;
        Self::new(
            specs
                .into_iter()
                .map(|s| Waypoint::new(s.name, s.longitude, s.latitude, s.range))
                .collect(),
        )
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> NonZeroUsize {
        // `new` and `continents` never build an empty catalog.
        NonZeroUsize::new(self.waypoints.len()).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn get(&self, index: WaypointIndex) -> Option<&Waypoint> {
        self.waypoints.get(index.get() - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }
}
