//! Dealer discovery pipeline.
//!
//! Drives manufacturer dealer-search pages through a headless rendering
//! session, extracts dealer records from the rendered markup with fuzzy
//! pattern matching, enriches them with coordinates, and merges them into
//! the persistent catalog without duplication.

pub mod address;
pub mod adapters;
pub mod automation;
pub mod discovery;
pub mod extract;
pub mod geocode;
pub mod merge;

pub use adapters::{discover_source, profile_for, SourceProfile, StepTimeouts};
pub use automation::{
    AutomationEngine, AutomationError, ChromeEngine, Locator, PageSession, ScrollTarget,
};
pub use discovery::{Discovery, DiscoveryError};
pub use extract::{extract_dealer_blocks, RawDealerBlock};
pub use geocode::Geocoder;
pub use merge::merge_into_catalog;
