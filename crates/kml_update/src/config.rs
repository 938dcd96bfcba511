use crate::catalog::Catalog;

/// Seconds between viewer refreshes for the production cycle.
pub const DEFAULT_MIN_REFRESH_PERIOD: u32 = 7;
/// Seconds between viewer refreshes for the test harness.
pub const DEFAULT_ORACLE_REFRESH_PERIOD: u32 = 4;
pub const DEFAULT_ICON_URL: &str = "http://maps.google.com/mapfiles/kml/shapes/flag.png";
pub const DEFAULT_CALLBACK_HREF: &str = "http://localhost:8000/cgi-bin/continents";
pub const DEFAULT_ORACLE_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("catalog must contain at least one waypoint")]
    EmptyCatalog,
    #[error("waypoint {index} has an empty name")]
    BlankWaypointName { index: usize },
    #[error("waypoint {name:?} has an invalid position ({lon}, {lat})")]
    InvalidPosition { name: String, lon: f64, lat: f64 },
    #[error("waypoint {name:?} has an invalid view range {range}")]
    InvalidRange { name: String, range: f64 },
    #[error("minimum refresh period must be at least one second")]
    ZeroRefreshPeriod,
    #[error("{field} must be an absolute http(s) URL, got {value:?}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("unknown content type {0:?} (expected \"text\" or \"kml\")")]
    UnknownContentType(String),
    #[error("catalog JSON is malformed: {0}")]
    CatalogJson(#[from] serde_json::Error),
    #[error("catalog file {path} could not be read: {source}")]
    CatalogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// `Content-Type` declared on every protocol response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// What the CGI deployment served; viewers sniff the body anyway.
    #[default]
    PlainText,
    Kml,
}

impl ContentType {
    pub fn mime(self) -> &'static str {
        match self {
            ContentType::PlainText => "text/plain",
            ContentType::Kml => "application/vnd.google-earth.kml+xml",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "text/plain" => Ok(ContentType::PlainText),
            "kml" | "application/vnd.google-earth.kml+xml" => Ok(ContentType::Kml),
            _ => Err(ConfigError::UnknownContentType(raw.to_string())),
        }
    }
}

/// Configuration of the production waypoint cycle.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Must be the exact URL the viewer's NetworkLink fetches; the viewer
    /// drops any `<Update>` whose `targetHref` does not match it.
    pub callback_href: String,
    pub icon_url: String,
    pub min_refresh_period: u32,
    pub content_type: ContentType,
    pub catalog: Catalog,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            callback_href: DEFAULT_CALLBACK_HREF.to_string(),
            icon_url: DEFAULT_ICON_URL.to_string(),
            min_refresh_period: DEFAULT_MIN_REFRESH_PERIOD,
            content_type: ContentType::default(),
            catalog: Catalog::continents(),
        }
    }
}

impl CycleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_refresh_period == 0 {
            return Err(ConfigError::ZeroRefreshPeriod);
        }
        require_http_url("callback href", &self.callback_href)?;
        require_http_url("icon url", &self.icon_url)?;
        Ok(())
    }
}

/// Configuration of the randomized test harness.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Scheme and authority the harness is reachable at, without a trailing path.
    pub base_url: String,
    pub min_refresh_period: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ORACLE_BASE_URL.to_string(),
            min_refresh_period: DEFAULT_ORACLE_REFRESH_PERIOD,
        }
    }
}

impl OracleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_refresh_period == 0 {
            return Err(ConfigError::ZeroRefreshPeriod);
        }
        require_http_url("base url", &self.base_url)
    }
}

fn require_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"));
    match rest {
        Some(authority) if !authority.is_empty() && !authority.starts_with('/') => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cycle_config_is_valid() {
        CycleConfig::default().validate().unwrap();
    }

    #[test]
    fn relative_callback_is_rejected() {
        let cfg = CycleConfig {
            callback_href: "/cgi-bin/continents".to_string(),
            ..CycleConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidUrl { field: "callback href", .. })
        ));
    }

    #[test]
    fn zero_refresh_period_is_rejected() {
        let cfg = OracleConfig {
            min_refresh_period: 0,
            ..OracleConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroRefreshPeriod)));
    }

    #[test]
    fn content_type_parsing() {
        assert_eq!(ContentType::parse("text").unwrap(), ContentType::PlainText);
        assert_eq!(ContentType::parse(" KML ").unwrap(), ContentType::Kml);
        assert_eq!(
            ContentType::Kml.mime(),
            "application/vnd.google-earth.kml+xml"
        );
        assert!(ContentType::parse("json").is_err());
    }
}
