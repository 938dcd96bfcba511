pub mod routes;
pub mod settings;

pub use routes::*;
pub use settings::*;
