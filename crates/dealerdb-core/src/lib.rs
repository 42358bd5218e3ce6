//! Shared domain types and configuration for the dealer discovery
//! pipeline.

pub mod app_config;
pub mod config;
mod dealers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use dealers::{
    Address, CatalogError, Contact, Coordinates, DealerCandidate, DealerCatalog, DiscoveryResult,
    Manufacturer, ManufacturerFilter, PersistedDealer,
};
