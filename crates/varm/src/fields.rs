//! Tolerant field mapping from raw store records to offers.
//!
//! The tabular store has no enforced schema; column names vary between
//! bases ("Slug" vs "slug" vs "ID", "Signed" vs "Is Signed", ...). Every
//! logical field therefore has an ordered list of candidate column names,
//! and values are coerced from whatever type the store returns.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use varm_core::{Offer, OfferSlug};

/// Candidate column names for the offer slug
pub const SLUG_FIELDS: &[&str] = &["Slug", "slug", "id", "ID", "Id"];

/// Candidate column names for the customer name
const CUSTOMER_NAME_FIELDS: &[&str] = &["Name", "name", "customerName", "Customer Name"];

/// Candidate column names for the customer email
const CUSTOMER_EMAIL_FIELDS: &[&str] = &["Email", "email", "customerEmail", "Customer Email"];

/// Candidate column names for the offer amount
const OFFER_AMOUNT_FIELDS: &[&str] = &["Offer Amount", "offerAmount", "Amount", "Value"];

/// Candidate column names for the document URL
const DOCUMENT_URL_FIELDS: &[&str] =
    &["Document URL", "documentURL", "DocumentURL", "pdfUrl", "PDF URL"];

/// Candidate column names for the signed flag
const IS_SIGNED_FIELDS: &[&str] = &["Signed", "signed", "isSigned", "Is Signed"];

/// Candidate column names for the signing timestamp
const SIGNED_AT_FIELDS: &[&str] = &["Signed At", "signedAt", "Sign Date", "Date Signed"];

/// Candidate column names for the project address
const PROJECT_ADDRESS_FIELDS: &[&str] = &[
    "Address",
    "address",
    "projectAddress",
    "Project Address",
    "Projektadresse",
];

/// Candidate column names for free-form notes
const NOTES_FIELDS: &[&str] = &[
    "Notes",
    "notes",
    "Note",
    "note",
    "Description",
    "description",
    "Comment",
    "comment",
];

/// A raw record as returned by the store's REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Store-assigned record identifier
    pub id: String,
    /// Column name to value map
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Creation timestamp, when the store includes it
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
}

/// First value present under any of the candidate column names.
fn field_value<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| fields.get(*name))
}

/// String value of the first present candidate column, trimmed of nulls.
fn string_field(fields: &Map<String, Value>, names: &[&str]) -> Option<String> {
    field_value(fields, names).and_then(|value| match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

/// Amount coercion: numbers pass through, strings are parsed, everything
/// else (and unparseable strings) becomes zero.
fn amount_from(fields: &Map<String, Value>) -> f64 {
    match field_value(fields, OFFER_AMOUNT_FIELDS) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Signed-flag coercion: booleans pass through; strings count as signed
/// when they read "true", "yes", or "signed"; numbers when non-zero.
fn signed_from(fields: &Map<String, Value>) -> bool {
    match field_value(fields, IS_SIGNED_FIELDS) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let lower = s.to_lowercase();
            lower == "true" || lower == "yes" || lower == "signed"
        }
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

/// Parse a signing timestamp: RFC 3339 first, then a bare `YYYY-MM-DD`
/// date (the store's Date columns carry no time component).
fn parse_signed_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Transform a raw store record into an [`Offer`].
///
/// Missing descriptive fields fall back to neutral defaults rather than
/// failing: a record with no slug column gets `record-{id}` so it remains
/// addressable, a record with no name gets "Unnamed Customer".
#[must_use]
pub fn offer_from_record(record: &RawRecord) -> Offer {
    let fields = &record.fields;

    let slug = string_field(fields, SLUG_FIELDS)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("record-{}", record.id));

    let customer_name = string_field(fields, CUSTOMER_NAME_FIELDS)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unnamed Customer".to_string());

    let signed_at = string_field(fields, SIGNED_AT_FIELDS)
        .as_deref()
        .and_then(parse_signed_at);

    Offer {
        slug: OfferSlug::new(slug),
        customer_name,
        customer_email: string_field(fields, CUSTOMER_EMAIL_FIELDS).filter(|s| !s.is_empty()),
        offer_amount: amount_from(fields),
        document_url: string_field(fields, DOCUMENT_URL_FIELDS).unwrap_or_default(),
        is_signed: signed_from(fields),
        signed_at,
        project_address: string_field(fields, PROJECT_ADDRESS_FIELDS).filter(|s| !s.is_empty()),
        notes: string_field(fields, NOTES_FIELDS).filter(|s| !s.is_empty()),
    }
}

/// Slug of a raw record, if any candidate column matches the given value.
#[must_use]
pub fn record_matches_slug(record: &RawRecord, slug: &str) -> bool {
    SLUG_FIELDS
        .iter()
        .any(|name| record.fields.get(*name).and_then(Value::as_str) == Some(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: Value) -> RawRecord {
        RawRecord {
            id: "rec123".to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
            created_time: None,
        }
    }

    #[test]
    fn test_standard_field_names() {
        let offer = offer_from_record(&record(json!({
            "Slug": "offer-42",
            "Name": "Test Customer",
            "Email": "test@example.com",
            "Offer Amount": 45000,
            "Document URL": "https://example.com/offer.pdf",
            "Signed": false,
        })));

        assert_eq!(offer.slug.as_str(), "offer-42");
        assert_eq!(offer.customer_name, "Test Customer");
        assert_eq!(offer.customer_email.as_deref(), Some("test@example.com"));
        assert!((offer.offer_amount - 45000.0).abs() < f64::EPSILON);
        assert_eq!(offer.document_url, "https://example.com/offer.pdf");
        assert!(!offer.is_signed);
    }

    #[test]
    fn test_lowercase_field_variations() {
        let offer = offer_from_record(&record(json!({
            "slug": "offer-7",
            "name": "Other Customer",
            "offerAmount": "12500.50",
            "pdfUrl": "https://example.com/doc.pdf",
            "isSigned": true,
        })));

        assert_eq!(offer.slug.as_str(), "offer-7");
        assert_eq!(offer.customer_name, "Other Customer");
        assert!((offer.offer_amount - 12500.50).abs() < f64::EPSILON);
        assert!(offer.is_signed);
    }

    #[test]
    fn test_slug_falls_back_to_record_id() {
        let offer = offer_from_record(&record(json!({ "Name": "No Slug" })));
        assert_eq!(offer.slug.as_str(), "record-rec123");
    }

    #[test]
    fn test_missing_name_falls_back() {
        let offer = offer_from_record(&record(json!({ "Slug": "offer-1" })));
        assert_eq!(offer.customer_name, "Unnamed Customer");
    }

    #[test]
    fn test_amount_string_coercion() {
        let offer = offer_from_record(&record(json!({ "Amount": "999" })));
        assert!((offer.offer_amount - 999.0).abs() < f64::EPSILON);

        let offer = offer_from_record(&record(json!({ "Amount": "not a number" })));
        assert!(offer.offer_amount.abs() < f64::EPSILON);
    }

    #[test]
    fn test_signed_string_coercions() {
        for truthy in ["true", "Yes", "SIGNED"] {
            let offer = offer_from_record(&record(json!({ "Signed": truthy })));
            assert!(offer.is_signed, "{truthy} should count as signed");
        }
        for falsy in ["false", "no", ""] {
            let offer = offer_from_record(&record(json!({ "Signed": falsy })));
            assert!(!offer.is_signed, "{falsy} should not count as signed");
        }
    }

    #[test]
    fn test_signed_numeric_coercion() {
        let offer = offer_from_record(&record(json!({ "Signed": 1 })));
        assert!(offer.is_signed);
        let offer = offer_from_record(&record(json!({ "Signed": 0 })));
        assert!(!offer.is_signed);
    }

    #[test]
    fn test_signed_at_date_only() {
        let offer = offer_from_record(&record(json!({
            "Signed": true,
            "Signed At": "2025-06-01",
        })));
        let signed_at = offer.signed_at.expect("parsed");
        assert_eq!(signed_at.to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_signed_at_rfc3339() {
        let offer = offer_from_record(&record(json!({
            "Signed": true,
            "signedAt": "2025-06-01T12:30:00Z",
        })));
        let signed_at = offer.signed_at.expect("parsed");
        assert_eq!(signed_at.to_rfc3339(), "2025-06-01T12:30:00+00:00");
    }

    #[test]
    fn test_signed_at_garbage_is_none() {
        let offer = offer_from_record(&record(json!({ "Signed At": "soon" })));
        assert!(offer.signed_at.is_none());
    }

    #[test]
    fn test_project_address_variations() {
        let offer = offer_from_record(&record(json!({ "Projektadresse": "Hovedgaden 1" })));
        assert_eq!(offer.project_address.as_deref(), Some("Hovedgaden 1"));
    }

    #[test]
    fn test_record_matches_slug() {
        let rec = record(json!({ "slug": "offer-42" }));
        assert!(record_matches_slug(&rec, "offer-42"));
        assert!(!record_matches_slug(&rec, "offer-43"));
    }

    #[test]
    fn test_empty_fields_map() {
        let offer = offer_from_record(&RawRecord {
            id: "rec999".to_string(),
            fields: Map::new(),
            created_time: None,
        });
        assert_eq!(offer.slug.as_str(), "record-rec999");
        assert!(!offer.is_signed);
        assert!(offer.signed_at.is_none());
    }
}
