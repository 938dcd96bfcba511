use foundation::{GeoBounds, LonLat};
use rand::Rng;

use crate::config::{ConfigError, OracleConfig};
use crate::kml::{
    Container, Feature, KmlDocument, Link, LookAt, NetworkLink, NetworkLinkControl, Placemark,
    Point, PointChange, Update,
};

pub const INDEX_PATH: &str = "/index.kml";
pub const UPDATE_PATH: &str = "/update";
/// Id of the harness placemark's point.
pub const ORACLE_POINT_ID: &str = "p";
pub const ORACLE_RANGE: f64 = 10_000.0;
pub const ORACLE_TILT: f64 = 0.0;

/// Sampling area for updates: lon `[-122, -121]`, lat `[37, 38]`.
pub fn oracle_bounds() -> GeoBounds {
    GeoBounds::from_degrees(-122.0, 37.0, -121.0, 38.0)
}

#[derive(Debug, Clone)]
pub struct TestOracle {
    config: OracleConfig,
}

impl TestOracle {
    pub fn new(config: OracleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn index_href(&self) -> String {
        format!("{}{INDEX_PATH}", self.base())
    }

    pub fn update_href(&self) -> String {
        format!("{}{UPDATE_PATH}", self.base())
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Index path gets the base document; anything else gets an update.
    pub fn handle<R: Rng>(&self, path: &str, rng: &mut R) -> String {
        if path == INDEX_PATH {
            self.index_document().render()
        } else {
            let u: f64 = rng.random();
            let v: f64 = rng.random();
            self.update_document(oracle_bounds().lerp(u, v)).render()
        }
    }

    pub fn index_document(&self) -> KmlDocument {
        KmlDocument {
            control: None,
            container: Some(Container {
                document_name: Some("Document".to_string()),
                features: vec![
                    Feature::Placemark(Placemark {
                        name: "Placemark".to_string(),
                        style: None,
                        point: Point {
                            id: ORACLE_POINT_ID.to_string(),
                            position: oracle_bounds().min,
                        },
                    }),
                    Feature::NetworkLink(NetworkLink {
                        name: "Update Link".to_string(),
                        fly_to_view: true,
                        link: Link {
                            href: self.update_href(),
                            refresh_interval: Some(self.config.min_refresh_period),
                        },
                    }),
                ],
            }),
        }
    }

    pub fn update_document(&self, position: LonLat) -> KmlDocument {
        KmlDocument {
            control: Some(NetworkLinkControl {
                update: Some(Update {
                    target_href: self.index_href(),
                    changes: vec![PointChange {
                        target_id: ORACLE_POINT_ID.to_string(),
                        position,
                    }],
                }),
                look_at: Some(LookAt {
                    position,
                    range: ORACLE_RANGE,
                    tilt: Some(ORACLE_TILT),
                }),
                ..NetworkLinkControl::default()
            }),
            container: None,
        }
    }
}
