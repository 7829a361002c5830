//! HTTP record-store client.
//!
//! Implements [`RecordStore`] over the tabular store's REST API. The store
//! has no conditional-write primitive, so `write_signed` emulates one with
//! a read-check immediately before the PATCH and reports an already-signed
//! record as a conflict; the coordinator's fresh read on the next attempt
//! resolves it.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use varm_core::{classify_status_message, ErrorClass, Offer, OfferSlug, RecordStore, StoreError};

use crate::{
    config::StoreConfig,
    fields::{offer_from_record, record_matches_slug, RawRecord, SLUG_FIELDS},
};

/// Record list as returned by the store's list endpoint.
#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<RawRecord>,
}

/// Map a non-success HTTP response to a [`StoreError`].
///
/// 404 is NotFound; 409/412 responses matching the conflict signature are
/// Conflict; everything else is a plain API error carrying the status.
fn store_error_from_status(status: u16, message: String) -> StoreError {
    if status == 404 {
        return StoreError::NotFound(message);
    }
    match classify_status_message(Some(status), &message) {
        ErrorClass::Conflict => StoreError::conflict(Some(status), message),
        _ => StoreError::api(Some(status), message),
    }
}

/// `RecordStore` implementation over the tabular store's REST API.
#[derive(Debug, Clone)]
pub struct AirtableStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl AirtableStore {
    /// Create a store client for the given configuration.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch records matching a filter formula.
    async fn fetch_by_filter(&self, formula: &str) -> Result<RecordList, StoreError> {
        let response = self
            .client
            .get(self.config.table_url())
            .query(&[("filterByFormula", formula)])
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| StoreError::transport(e.to_string()))?;

        Self::parse_list(response).await
    }

    /// Fetch every record in the table (fallback when filter formulas
    /// are rejected by the store).
    async fn fetch_all(&self) -> Result<RecordList, StoreError> {
        let response = self
            .client
            .get(self.config.table_url())
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| StoreError::transport(e.to_string()))?;

        Self::parse_list(response).await
    }

    async fn parse_list(response: reqwest::Response) -> Result<RecordList, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(store_error_from_status(status.as_u16(), body));
        }
        response
            .json::<RecordList>()
            .await
            .map_err(|e| StoreError::transport(format!("malformed record list: {e}")))
    }

    /// Locate the raw record for a slug: try a filter formula per slug
    /// column variation, then fall back to scanning the full table.
    async fn find_record(&self, slug: &OfferSlug) -> Result<Option<RawRecord>, StoreError> {
        for field in SLUG_FIELDS {
            let formula = format!("{{{field}}} = \"{slug}\"");
            match self.fetch_by_filter(&formula).await {
                Ok(list) => {
                    if let Some(record) = list.records.into_iter().next() {
                        tracing::debug!(slug = %slug, field, "record located via filter");
                        return Ok(Some(record));
                    }
                }
                // Filter rejections are worth retrying with the next
                // column name; a dead connection is not.
                Err(err @ StoreError::Transport(_)) => return Err(err),
                Err(err) => {
                    tracing::warn!(slug = %slug, field, error = %err, "filter query failed");
                }
            }
        }

        tracing::debug!(slug = %slug, "no filter matched, scanning table");
        let all = self.fetch_all().await?;
        Ok(all
            .records
            .into_iter()
            .find(|record| record_matches_slug(record, slug.as_str())))
    }

    /// PATCH the signed fields onto a record, with a simplified payload
    /// fallback when the store does not know the date column.
    async fn patch_signed(&self, record_id: &str) -> Result<Offer, StoreError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let payload = json!({ "fields": { "Signed": true, "Signed At": today } });

        let response = self
            .client
            .patch(self.config.record_url(record_id))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StoreError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Self::parse_record(response).await;
        }

        let body = response.text().await.unwrap_or_default();

        // The date column does not exist in every base. Retry with only
        // the boolean flag before giving up.
        if status.as_u16() == 422
            && (body.contains("Signed At") || body.contains("UNKNOWN_FIELD_NAME"))
        {
            tracing::info!(record_id, "date column rejected, retrying with Signed only");
            let simple = json!({ "fields": { "Signed": true } });
            let retry = self
                .client
                .patch(self.config.record_url(record_id))
                .bearer_auth(&self.config.api_key)
                .json(&simple)
                .send()
                .await
                .map_err(|e| StoreError::transport(e.to_string()))?;

            let retry_status = retry.status();
            if retry_status.is_success() {
                return Self::parse_record(retry).await;
            }
            let retry_body = retry.text().await.unwrap_or_default();
            return Err(store_error_from_status(retry_status.as_u16(), retry_body));
        }

        Err(store_error_from_status(status.as_u16(), body))
    }

    async fn parse_record(response: reqwest::Response) -> Result<Offer, StoreError> {
        response
            .json::<RawRecord>()
            .await
            .map(|record| offer_from_record(&record))
            .map_err(|e| StoreError::transport(format!("malformed record: {e}")))
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn read_offer(&self, slug: &OfferSlug) -> Result<Offer, StoreError> {
        let formula = format!("{{Slug}} = \"{slug}\"");
        tracing::debug!(slug = %slug, formula, "fetching offer");

        let list = match self.fetch_by_filter(&formula).await {
            Ok(list) => list,
            // Some bases reject filter formulas outright; scan instead.
            Err(StoreError::Api {
                status: Some(422), ..
            }) => {
                tracing::warn!(slug = %slug, "filter formula rejected, scanning table");
                let all = self.fetch_all().await?;
                let records = all
                    .records
                    .into_iter()
                    .filter(|record| record_matches_slug(record, slug.as_str()))
                    .collect::<Vec<_>>();
                RecordList { records }
            }
            Err(err) => return Err(err),
        };

        list.records
            .first()
            .map(offer_from_record)
            .ok_or_else(|| StoreError::not_found(slug))
    }

    async fn write_signed(&self, slug: &OfferSlug) -> Result<Offer, StoreError> {
        let record = self
            .find_record(slug)
            .await?
            .ok_or_else(|| StoreError::not_found(slug))?;

        // Conditional-write emulation: the store accepts any PATCH, so the
        // last point of defense against double-signing is this read-check.
        // A writer that lost the race sees the winner's flag here.
        if offer_from_record(&record).is_signed {
            return Err(StoreError::conflict(
                Some(409),
                "record modified: this offer has already been signed",
            ));
        }

        tracing::info!(slug = %slug, record_id = %record.id, "signing offer");
        self.patch_signed(&record.id).await
    }
}
