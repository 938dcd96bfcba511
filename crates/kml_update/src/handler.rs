use tracing::info;

use crate::catalog::{Catalog, Waypoint};
use crate::config::{ConfigError, ContentType, CycleConfig};
use crate::cycle::{advance, Step};
use crate::kml;
use crate::token::Token;

/// Everything the transport needs to answer one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResponse {
    pub body: String,
    /// Token to hand back; also embedded in the body's `<cookie>`.
    pub token: Token,
    pub content_type: ContentType,
    /// Earliest the viewer may poll again, in seconds.
    pub min_refresh_period: u32,
    pub step: Step,
}

/// Stateless handler: all progress lives in the client's token.
#[derive(Debug, Clone)]
pub struct CycleHandler {
    config: CycleConfig,
}

impl CycleHandler {
    pub fn new(config: CycleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            waypoints = config.catalog.len().get(),
            href = %config.callback_href,
            min_refresh_period = config.min_refresh_period,
            "waypoint cycle configured"
        );
        Ok(Self { config })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.config.catalog
    }

    /// Never fails: a bad token degrades to the initial document.
    pub fn handle(&self, raw_token: Option<&str>) -> UpdateResponse {
        let cfg = &self.config;
        let (step, waypoint) = self.resolve(advance(raw_token, cfg.catalog.len()));
        let token = step.token();

        let body = match waypoint {
            Some(waypoint) => kml::render_update(
                cfg.min_refresh_period,
                waypoint,
                token,
                &cfg.callback_href,
                kml::STABLE_POINT_ID,
            ),
            None => kml::render_initial(cfg.min_refresh_period, &cfg.icon_url),
        };

        UpdateResponse {
            body,
            token,
            content_type: cfg.content_type,
            min_refresh_period: cfg.min_refresh_period,
            step,
        }
    }

    /// Pairs a step with its waypoint. An index the catalog does not hold
    /// becomes `Initial`, so the token always describes the body sent.
    fn resolve(&self, step: Step) -> (Step, Option<&Waypoint>) {
        match step {
            Step::Waypoint(index) => match self.config.catalog.get(index) {
                Some(waypoint) => (step, Some(waypoint)),
                None => (Step::Initial, None),
            },
            Step::Initial => (Step::Initial, None),
        }
    }
}
