//! Domain types for dealer discovery and the persistent catalog.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A manufacturer whose dealer-search site we know how to drive.
///
/// The wire spelling (`"KIA"`, `"Seat"`, `"Opel"`) matches what the
/// manufacturer sites and existing catalog rows use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Manufacturer {
    #[serde(rename = "KIA")]
    Kia,
    Seat,
    Opel,
}

impl Manufacturer {
    pub const ALL: [Manufacturer; 3] = [Manufacturer::Kia, Manufacturer::Seat, Manufacturer::Opel];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Manufacturer::Kia => "KIA",
            Manufacturer::Seat => "Seat",
            Manufacturer::Opel => "Opel",
        }
    }

    /// Parse a manufacturer name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Manufacturer> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kia" => Some(Manufacturer::Kia),
            "seat" => Some(Manufacturer::Seat),
            "opel" => Some(Manufacturer::Opel),
            _ => None,
        }
    }
}

impl std::fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which manufacturers a discovery run should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManufacturerFilter {
    /// Every known manufacturer.
    All,
    One(Manufacturer),
}

impl ManufacturerFilter {
    /// Parse a filter value: a manufacturer name or the `"all"` wildcard.
    ///
    /// Returns `None` for anything outside the fixed enumeration, so
    /// callers can reject the request before any adapter runs.
    #[must_use]
    pub fn parse(value: &str) -> Option<ManufacturerFilter> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(ManufacturerFilter::All);
        }
        Manufacturer::parse(value).map(ManufacturerFilter::One)
    }

    /// The concrete manufacturers this filter expands to.
    #[must_use]
    pub fn manufacturers(self) -> Vec<Manufacturer> {
        match self {
            ManufacturerFilter::All => Manufacturer::ALL.to_vec(),
            ManufacturerFilter::One(m) => vec![m],
        }
    }
}

/// A postal address. Fields may be empty on a freshly extracted candidate
/// but are back-filled with placeholders before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Optional contact details extracted from a dealer block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// A `(longitude, latitude)` pair from geocoding enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    /// Whether both components are inside their valid geographic range.
    #[must_use]
    pub fn in_range(self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// A dealer extracted from one adapter run, not yet persisted.
///
/// Created by extraction, mutated only by address back-fill and coordinate
/// enrichment, consumed once by catalog merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealerCandidate {
    pub name: String,
    pub manufacturer: Manufacturer,
    pub address: Address,
    pub coordinates: Option<Coordinates>,
    pub contact: Contact,
}

impl DealerCandidate {
    /// Natural key for catalog dedup: SHA-256 over the normalized
    /// `(name, postal code, street)` triple.
    ///
    /// Name and street are lowercased and trimmed so that case and
    /// whitespace variations of the same dealer hash identically.
    #[must_use]
    pub fn natural_key(&self) -> String {
        use sha2::{Digest, Sha256};
        let input = format!(
            "{}\x00{}\x00{}",
            self.name.trim().to_lowercase(),
            self.address.postal_code.trim(),
            self.address.street.trim().to_lowercase(),
        );
        format!("{:x}", Sha256::digest(input.as_bytes()))
    }
}

/// A dealer row owned by the persistent catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDealer {
    pub id: i64,
    pub public_id: Uuid,
    pub dealer_key: String,
    pub name: String,
    pub manufacturer: Manufacturer,
    pub address: Address,
    pub coordinates: Option<Coordinates>,
    pub contact: Contact,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a discover-and-save run.
///
/// `saved_count` counts candidates newly inserted this run; reused rows
/// appear in `dealers` but not in `saved_count`, so
/// `saved_count <= scraped_count` always holds.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    pub dealers: Vec<PersistedDealer>,
    pub scraped_count: usize,
    pub saved_count: usize,
}

/// Errors from catalog lookups and inserts.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The candidate violates a storage-level required-field constraint.
    #[error("invalid dealer record: {reason}")]
    Validation { reason: String },

    #[error("catalog storage error: {0}")]
    Storage(String),
}

/// The persistent catalog, seen from the discovery pipeline.
///
/// Discovery only needs natural-key lookup and insert; the catalog's
/// query/filter surface lives elsewhere.
pub trait DealerCatalog: Send + Sync {
    /// Look up a dealer by its natural key.
    fn find_by_key(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<PersistedDealer>, CatalogError>> + Send;

    /// Insert a candidate as a new persisted dealer.
    fn insert(
        &self,
        candidate: &DealerCandidate,
    ) -> impl Future<Output = Result<PersistedDealer, CatalogError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, street: &str, postal: &str) -> DealerCandidate {
        DealerCandidate {
            name: name.to_string(),
            manufacturer: Manufacturer::Kia,
            address: Address {
                street: street.to_string(),
                city: "Berlin".to_string(),
                postal_code: postal.to_string(),
                country: "Germany".to_string(),
            },
            coordinates: None,
            contact: Contact::default(),
        }
    }

    #[test]
    fn manufacturer_parse_is_case_insensitive() {
        assert_eq!(Manufacturer::parse("KIA"), Some(Manufacturer::Kia));
        assert_eq!(Manufacturer::parse("kia"), Some(Manufacturer::Kia));
        assert_eq!(Manufacturer::parse(" Seat "), Some(Manufacturer::Seat));
        assert_eq!(Manufacturer::parse("Ford"), None);
    }

    #[test]
    fn filter_parse_accepts_wildcard_and_rejects_unknown() {
        assert_eq!(ManufacturerFilter::parse("all"), Some(ManufacturerFilter::All));
        assert_eq!(
            ManufacturerFilter::parse("Opel"),
            Some(ManufacturerFilter::One(Manufacturer::Opel))
        );
        assert_eq!(ManufacturerFilter::parse("Ford"), None);
        assert_eq!(ManufacturerFilter::parse(""), None);
    }

    #[test]
    fn wildcard_expands_to_every_manufacturer() {
        let all = ManufacturerFilter::All.manufacturers();
        assert_eq!(all.len(), 3);
        for m in Manufacturer::ALL {
            assert!(all.contains(&m));
        }
    }

    #[test]
    fn manufacturer_serializes_with_wire_spelling() {
        let json = serde_json::to_string(&Manufacturer::Kia).unwrap();
        assert_eq!(json, "\"KIA\"");
        let json = serde_json::to_string(&Manufacturer::Seat).unwrap();
        assert_eq!(json, "\"Seat\"");
    }

    #[test]
    fn natural_key_normalizes_name_and_street_case() {
        let a = candidate("Autohaus Schmidt GmbH", "Hauptstraße 1", "10115");
        let b = candidate("AUTOHAUS SCHMIDT GMBH", "  hauptstraße 1 ", "10115");
        assert_eq!(a.natural_key(), b.natural_key());
        assert_eq!(a.natural_key().len(), 64, "SHA-256 hex is 64 chars");
    }

    #[test]
    fn natural_key_differs_when_any_component_differs() {
        let base = candidate("Autohaus Schmidt", "Hauptstraße 1", "10115");
        assert_ne!(
            base.natural_key(),
            candidate("Autohaus Meier", "Hauptstraße 1", "10115").natural_key()
        );
        assert_ne!(
            base.natural_key(),
            candidate("Autohaus Schmidt", "Nebenstraße 2", "10115").natural_key()
        );
        assert_ne!(
            base.natural_key(),
            candidate("Autohaus Schmidt", "Hauptstraße 1", "80331").natural_key()
        );
    }

    #[test]
    fn coordinates_range_check() {
        assert!(Coordinates { longitude: 13.4, latitude: 52.5 }.in_range());
        assert!(!Coordinates { longitude: 181.0, latitude: 0.0 }.in_range());
        assert!(!Coordinates { longitude: 0.0, latitude: -90.5 }.in_range());
    }
}
