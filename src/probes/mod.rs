// src/probes/mod.rs
mod auth;
mod country;
mod locations;
mod session;

pub use auth::{login, AuthToken, LoginProbe};
pub use country::{fetch_country_config, parse_client_config, CountryConfig, CountryConfigProbe};
pub use locations::{fetch_locations, LocationBundle, LocationsProbe, RecordCountProbe};
pub use session::{Session, Topology};
