//! Token-driven state machine for the waypoint cycle.
//!
//! `advance` is pure: the same token and catalog length always produce the
//! same step. There is no server-side counter.

use std::num::NonZeroUsize;

use tracing::{debug, warn};

use crate::catalog::WaypointIndex;
use crate::token::Token;

/// What the next response must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No usable token: send the document that creates the placemark.
    Initial,
    /// Move the placemark to this waypoint.
    Waypoint(WaypointIndex),
}

impl Step {
    pub fn is_initial(self) -> bool {
        matches!(self, Step::Initial)
    }

    /// Token the client must send back to continue from here.
    pub fn token(self) -> Token {
        match self {
            Step::Initial => Token::INITIAL,
            Step::Waypoint(index) => Token(index.get() as u64),
        }
    }
}

/// Computes the step following `raw_token` in a catalog of `len` waypoints.
///
/// Missing or unparseable tokens restart at [`Step::Initial`]. A counter of
/// `len` or more wraps to the first waypoint, so indices cycle `1..=len`.
pub fn advance(raw_token: Option<&str>, len: NonZeroUsize) -> Step {
    let Some(raw) = raw_token else {
        debug!("no token, sending initial document");
        return Step::Initial;
    };
    let Some(token) = Token::parse(raw) else {
        warn!(raw, "unparseable token, restarting cycle");
        return Step::Initial;
    };
    let step = Step::Waypoint(next_index(token, len));
    debug!(count = token.count(), ?step, "advanced cycle");
    step
}

fn next_index(token: Token, len: NonZeroUsize) -> WaypointIndex {
    let len = len.get() as u64;
    let next = token.count().saturating_add(1);
    if next > len {
        return WaypointIndex::FIRST;
    }
    // 1 <= next <= len, which always fits in usize.
    WaypointIndex::new(next as usize).unwrap_or(WaypointIndex::FIRST)
}
