//! Discovery endpoints.
//!
//! Both endpoints run the full scrape synchronously; a broken source
//! degrades to fewer results, never to a 5xx. The only client-visible
//! errors are the input-validation ones, mapped to 400.

use axum::{extract::Query, extract::State, Json};
use serde::Deserialize;

use dealerdb_core::{DealerCandidate, DiscoveryResult};
use dealerdb_scraper::DiscoveryError;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct DiscoverParams {
    pub postal_code: String,
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
}

fn default_manufacturer() -> String {
    "all".to_string()
}

fn map_discovery_error(error: &DiscoveryError) -> ApiError {
    ApiError::new("validation_error", error.to_string())
}

pub(super) async fn preview_dealers(
    State(state): State<AppState>,
    Query(params): Query<DiscoverParams>,
) -> Result<Json<ApiResponse<Vec<DealerCandidate>>>, ApiError> {
    let data = state
        .discovery
        .preview(&params.manufacturer, &params.postal_code)
        .await
        .map_err(|e| map_discovery_error(&e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::now(),
    }))
}

pub(super) async fn discover_dealers(
    State(state): State<AppState>,
    Query(params): Query<DiscoverParams>,
) -> Result<Json<ApiResponse<DiscoveryResult>>, ApiError> {
    let data = state
        .discovery
        .discover_and_save(&state.catalog, &params.manufacturer, &params.postal_code)
        .await
        .map_err(|e| map_discovery_error(&e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufacturer_defaults_to_all() {
        let params: DiscoverParams =
            serde_json::from_str(r#"{"postal_code":"10115"}"#).expect("deserialize");
        assert_eq!(params.manufacturer, "all");
        assert_eq!(params.postal_code, "10115");
    }

    #[test]
    fn validation_failure_maps_to_validation_error_code() {
        let error = map_discovery_error(&DiscoveryError::EmptyPostalCode);
        assert_eq!(error.error.code, "validation_error");
    }
}
