//! Database operations for the `dealers` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use dealerdb_core::{
    Address, CatalogError, Contact, Coordinates, DealerCandidate, DealerCatalog, Manufacturer,
    PersistedDealer,
};

use crate::DbError;

/// A row from the `dealers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealerRow {
    pub id: i64,
    pub public_id: Uuid,
    pub dealer_key: String,
    pub name: String,
    pub manufacturer: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const DEALER_COLUMNS: &str = "id, public_id, dealer_key, name, manufacturer, street, city, \
     postal_code, country, longitude, latitude, phone, email, website, created_at, updated_at";

impl DealerRow {
    /// Convert into the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if the stored manufacturer spelling
    /// is unknown or only one coordinate component is present.
    pub fn into_dealer(self) -> Result<PersistedDealer, DbError> {
        let manufacturer = Manufacturer::parse(&self.manufacturer).ok_or_else(|| {
            DbError::InvalidRow(format!("unknown manufacturer '{}'", self.manufacturer))
        })?;
        let coordinates = match (self.longitude, self.latitude) {
            (Some(longitude), Some(latitude)) => Some(Coordinates {
                longitude,
                latitude,
            }),
            (None, None) => None,
            _ => {
                return Err(DbError::InvalidRow(format!(
                    "dealer {} has a partial coordinate pair",
                    self.id
                )))
            }
        };

        Ok(PersistedDealer {
            id: self.id,
            public_id: self.public_id,
            dealer_key: self.dealer_key,
            name: self.name,
            manufacturer,
            address: Address {
                street: self.street,
                city: self.city,
                postal_code: self.postal_code,
                country: self.country,
            },
            coordinates,
            contact: Contact {
                phone: self.phone,
                email: self.email,
                website: self.website,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Reject a candidate that must never reach the database.
///
/// # Errors
///
/// Returns [`CatalogError::Validation`] when the name or the back-filled
/// address fields are empty.
pub fn validate_candidate(candidate: &DealerCandidate) -> Result<(), CatalogError> {
    if candidate.name.trim().is_empty() {
        return Err(CatalogError::Validation {
            reason: "dealer name is empty".to_string(),
        });
    }
    if candidate.address.postal_code.trim().is_empty() {
        return Err(CatalogError::Validation {
            reason: "postal code is empty".to_string(),
        });
    }
    Ok(())
}

/// [`DealerCatalog`] backed by the `dealers` table.
///
/// The unique index on `dealer_key` is the last line of defense against
/// concurrent discovery runs: a racing insert fails with a unique
/// violation and the merge layer skips that candidate.
#[derive(Debug, Clone)]
pub struct PgDealerCatalog {
    pool: PgPool,
}

impl PgDealerCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DealerCatalog for PgDealerCatalog {
    async fn find_by_key(&self, key: &str) -> Result<Option<PersistedDealer>, CatalogError> {
        let sql = format!("SELECT {DEALER_COLUMNS} FROM dealers WHERE dealer_key = $1");
        let row = sqlx::query_as::<_, DealerRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        row.map(|r| r.into_dealer().map_err(|e| CatalogError::Storage(e.to_string())))
            .transpose()
    }

    async fn insert(&self, candidate: &DealerCandidate) -> Result<PersistedDealer, CatalogError> {
        validate_candidate(candidate)?;

        let sql = format!(
            "INSERT INTO dealers \
                 (dealer_key, name, manufacturer, street, city, postal_code, country, \
                  longitude, latitude, phone, email, website) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {DEALER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DealerRow>(&sql)
            .bind(candidate.natural_key())
            .bind(&candidate.name)
            .bind(candidate.manufacturer.as_str())
            .bind(&candidate.address.street)
            .bind(&candidate.address.city)
            .bind(&candidate.address.postal_code)
            .bind(&candidate.address.country)
            .bind(candidate.coordinates.map(|c| c.longitude))
            .bind(candidate.coordinates.map(|c| c.latitude))
            .bind(&candidate.contact.phone)
            .bind(&candidate.contact.email)
            .bind(&candidate.contact.website)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        row.into_dealer()
            .map_err(|e| CatalogError::Storage(e.to_string()))
    }
}
