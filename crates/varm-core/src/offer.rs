//! Offer record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque stable key identifying an offer record in the external store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferSlug(String);

impl OfferSlug {
    /// Create a new offer slug
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Get the slug as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OfferSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An offer record as held by the external tabular store.
///
/// The store owns the record lifecycle; this type is a read-side projection.
/// The only field this crate ever writes is the `is_signed`/`signed_at` pair,
/// and only through [`crate::coordinator::RecordStore::write_signed`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Stable lookup key
    pub slug: OfferSlug,
    /// Customer display name
    pub customer_name: String,
    /// Customer email, when the store has one
    pub customer_email: Option<String>,
    /// Offer amount in the store's currency
    pub offer_amount: f64,
    /// URL of the offer document
    pub document_url: String,
    /// Whether the offer has been signed (monotonic false -> true)
    pub is_signed: bool,
    /// When the offer was signed; set exactly once, alongside `is_signed`
    pub signed_at: Option<DateTime<Utc>>,
    /// Project address, when present
    pub project_address: Option<String>,
    /// Free-form notes, when present
    pub notes: Option<String>,
}

impl Offer {
    /// Create an unsigned offer with the minimum descriptive fields.
    #[must_use]
    pub fn new(slug: OfferSlug, customer_name: impl Into<String>) -> Self {
        Self {
            slug,
            customer_name: customer_name.into(),
            customer_email: None,
            offer_amount: 0.0,
            document_url: String::new(),
            is_signed: false,
            signed_at: None,
            project_address: None,
            notes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_display_and_as_str() {
        let slug = OfferSlug::new("offer-42");
        assert_eq!(slug.as_str(), "offer-42");
        assert_eq!(slug.to_string(), "offer-42");
    }

    #[test]
    fn test_new_offer_is_unsigned() {
        let offer = Offer::new(OfferSlug::new("offer-42"), "Test Customer");
        assert!(!offer.is_signed);
        assert!(offer.signed_at.is_none());
    }

    #[test]
    fn test_offer_serde_round_trip() {
        let mut offer = Offer::new(OfferSlug::new("offer-42"), "Test Customer");
        offer.is_signed = true;
        offer.signed_at = Some(Utc::now());

        let json = serde_json::to_string(&offer).expect("serialize works");
        let back: Offer = serde_json::from_str(&json).expect("deserialize works");
        assert_eq!(back.slug, offer.slug);
        assert!(back.is_signed);
        assert!(back.signed_at.is_some());
    }
}
