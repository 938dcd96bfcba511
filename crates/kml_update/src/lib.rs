//! Polling update protocol for KML viewers.
//!
//! A viewer fetches a NetworkLink URL once to load a placemark, then keeps
//! re-fetching it. Each response is a `<NetworkLinkControl>` that mutates the
//! previously loaded point and camera instead of resending the scene. The
//! only state is a `count=<n>` cookie that the viewer hands back verbatim.

pub mod catalog;
pub mod config;
pub mod cycle;
pub mod handler;
pub mod kml;
pub mod oracle;
pub mod token;

pub use catalog::*;
pub use config::*;
pub use cycle::*;
pub use handler::*;
pub use oracle::*;
pub use token::*;
