//! Discovery orchestration across manufacturer sources.

use thiserror::Error;

use dealerdb_core::{DealerCandidate, DealerCatalog, DiscoveryResult, ManufacturerFilter};

use crate::adapters::{discover_source, profile_for, StepTimeouts};
use crate::automation::AutomationEngine;
use crate::geocode::Geocoder;
use crate::merge::merge_into_catalog;

/// The only errors a discovery run surfaces to its caller. Everything
/// past input validation degrades per source instead of failing the run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("postal code must not be empty")]
    EmptyPostalCode,

    #[error("unknown manufacturer: {0}")]
    InvalidManufacturer(String),
}

/// Runs the selected manufacturer adapters for one postal code.
///
/// Sources run sequentially and isolated: a failing source contributes an
/// empty set while the others still run.
pub struct Discovery<E> {
    engine: E,
    geocoder: Geocoder,
    timeouts: StepTimeouts,
}

impl<E: AutomationEngine> Discovery<E> {
    pub fn new(engine: E, geocoder: Geocoder, timeouts: StepTimeouts) -> Self {
        Self {
            engine,
            geocoder,
            timeouts,
        }
    }

    /// Scrape without touching the catalog.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError`] on an empty postal code or an unknown
    /// manufacturer filter; both are checked before any session launches.
    pub async fn preview(
        &self,
        filter: &str,
        postal_code: &str,
    ) -> Result<Vec<DealerCandidate>, DiscoveryError> {
        let (filter, postal_code) = validate(filter, postal_code)?;

        let mut candidates = Vec::new();
        for manufacturer in filter.manufacturers() {
            let profile = profile_for(manufacturer);
            let found = discover_source(
                &self.engine,
                &self.geocoder,
                &profile,
                postal_code,
                &self.timeouts,
            )
            .await;
            candidates.extend(found);
        }
        Ok(candidates)
    }

    /// Scrape and merge the results into the catalog.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`Discovery::preview`]; catalog failures
    /// never abort the run, they skip individual candidates.
    pub async fn discover_and_save<C: DealerCatalog>(
        &self,
        catalog: &C,
        filter: &str,
        postal_code: &str,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let candidates = self.preview(filter, postal_code).await?;
        Ok(merge_into_catalog(catalog, candidates).await)
    }
}

fn validate<'a>(
    filter: &str,
    postal_code: &'a str,
) -> Result<(ManufacturerFilter, &'a str), DiscoveryError> {
    let postal_code = postal_code.trim();
    if postal_code.is_empty() {
        return Err(DiscoveryError::EmptyPostalCode);
    }
    let filter = ManufacturerFilter::parse(filter)
        .ok_or_else(|| DiscoveryError::InvalidManufacturer(filter.to_string()))?;
    Ok((filter, postal_code))
}
