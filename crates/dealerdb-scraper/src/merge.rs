//! Dedup-aware merge of discovered candidates into the catalog.

use dealerdb_core::{DealerCandidate, DealerCatalog, DiscoveryResult};

/// Merge candidates into the catalog, reusing rows whose natural key is
/// already present.
///
/// An existing dealer is returned as stored and never updated; only keys
/// the catalog has not seen are inserted. A failed lookup or insert skips
/// that candidate and the batch continues, so one bad record cannot abort
/// a run.
pub async fn merge_into_catalog<C: DealerCatalog>(
    catalog: &C,
    candidates: Vec<DealerCandidate>,
) -> DiscoveryResult {
    let scraped_count = candidates.len();
    let mut dealers = Vec::with_capacity(scraped_count);
    let mut saved_count = 0;

    for candidate in candidates {
        let key = candidate.natural_key();
        match catalog.find_by_key(&key).await {
            Ok(Some(existing)) => {
                tracing::debug!(name = %candidate.name, "dealer already cataloged");
                dealers.push(existing);
            }
            Ok(None) => match catalog.insert(&candidate).await {
                Ok(persisted) => {
                    saved_count += 1;
                    dealers.push(persisted);
                }
                Err(e) => {
                    tracing::warn!(name = %candidate.name, error = %e, "insert skipped");
                }
            },
            Err(e) => {
                tracing::warn!(name = %candidate.name, error = %e, "lookup failed, skipped");
            }
        }
    }

    DiscoveryResult {
        dealers,
        scraped_count,
        saved_count,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::InMemoryCatalog;
    use super::*;

    use dealerdb_core::{Address, Contact, Manufacturer};

    fn candidate(name: &str, street: &str) -> DealerCandidate {
        DealerCandidate {
            name: name.to_string(),
            manufacturer: Manufacturer::Kia,
            address: Address {
                street: street.to_string(),
                city: "Berlin".to_string(),
                postal_code: "10115".to_string(),
                country: "Germany".to_string(),
            },
            coordinates: None,
            contact: Contact::default(),
        }
    }

    #[tokio::test]
    async fn second_identical_run_saves_nothing_new() {
        let catalog = InMemoryCatalog::default();
        let batch = vec![
            candidate("Autohaus Schmidt GmbH", "Hauptstraße 1"),
            candidate("Autozentrum Meier KG", "Bergweg 12"),
        ];

        let first = merge_into_catalog(&catalog, batch.clone()).await;
        assert_eq!(first.scraped_count, 2);
        assert_eq!(first.saved_count, 2);
        assert_eq!(first.dealers.len(), 2);

        let second = merge_into_catalog(&catalog, batch).await;
        assert_eq!(second.scraped_count, 2);
        assert_eq!(second.saved_count, 0);
        assert_eq!(second.dealers.len(), 2);
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn case_variant_of_same_dealer_is_reused() {
        let catalog = InMemoryCatalog::default();
        merge_into_catalog(&catalog, vec![candidate("Autohaus Schmidt GmbH", "Hauptstraße 1")])
            .await;

        let outcome = merge_into_catalog(
            &catalog,
            vec![candidate("AUTOHAUS SCHMIDT GMBH", "hauptstraße 1")],
        )
        .await;
        assert_eq!(outcome.saved_count, 0);
        assert_eq!(outcome.dealers.len(), 1);
        assert_eq!(outcome.dealers[0].name, "Autohaus Schmidt GmbH");
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn invalid_candidate_is_skipped_without_aborting_batch() {
        let catalog = InMemoryCatalog::default();
        let outcome = merge_into_catalog(
            &catalog,
            vec![
                candidate("", "Hauptstraße 1"),
                candidate("Autozentrum Meier KG", "Bergweg 12"),
            ],
        )
        .await;

        assert_eq!(outcome.scraped_count, 2);
        assert_eq!(outcome.saved_count, 1);
        assert_eq!(outcome.dealers.len(), 1);
        assert_eq!(outcome.dealers[0].name, "Autozentrum Meier KG");
    }
}
