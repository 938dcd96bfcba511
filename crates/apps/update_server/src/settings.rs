use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use kml_update::{Catalog, ConfigError, ContentType, CycleConfig};
use tracing::warn;

use crate::routes::HEALTH_ROUTE;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_ROUTE: &str = "/cgi-bin/continents";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid UPDATE_ADDR {value:?}: {source}")]
    Addr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid UPDATE_ROUTE {0:?}: must start with '/', contain no ':' or '*', and not be /healthz")]
    Route(String),
    #[error("invalid {key} {value:?}: {source}")]
    Number {
        key: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    /// Path the update resource is mounted at.
    pub route: String,
    pub cycle: CycleConfig,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr_raw = lookup("UPDATE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw.parse().map_err(|source| SettingsError::Addr {
            value: addr_raw.clone(),
            source,
        })?;

        let route = lookup("UPDATE_ROUTE").unwrap_or_else(|| DEFAULT_ROUTE.to_string());
        if !route.starts_with('/') || route.contains([':', '*']) || route == HEALTH_ROUTE {
            return Err(SettingsError::Route(route));
        }

        let defaults = CycleConfig::default();
        let content_type = match lookup("UPDATE_CONTENT_TYPE") {
            Some(raw) => ContentType::parse(&raw)?,
            None => defaults.content_type,
        };
        let catalog = match lookup("UPDATE_CATALOG") {
            Some(path) => Catalog::load(&PathBuf::from(path))?,
            None => defaults.catalog,
        };

        let cycle = CycleConfig {
            callback_href: lookup("UPDATE_HREF").unwrap_or(defaults.callback_href),
            icon_url: lookup("UPDATE_ICON_URL").unwrap_or(defaults.icon_url),
            min_refresh_period: env_var_u32(&lookup, "UPDATE_MIN_REFRESH", defaults.min_refresh_period)?,
            content_type,
            catalog,
        };
        cycle.validate()?;

        if !href_path(&cycle.callback_href).starts_with(route.as_str()) {
            warn!(
                href = %cycle.callback_href,
                route = %route,
                "callback href does not point at the update route; viewers will ignore updates unless a proxy rewrites it"
            );
        }

        Ok(Self { addr, route, cycle })
    }
}

fn href_path(href: &str) -> &str {
    let rest = href.split_once("://").map_or(href, |(_, rest)| rest);
    rest.find('/').map_or("/", |i| &rest[i..])
}

fn env_var_u32<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|source| SettingsError::Number { key, value, source }),
        None => Ok(default),
    }
}
