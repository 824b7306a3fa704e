use crate::error::{Result, ScraperError};
use crate::types::{NormalizedListing, NA};
use serde_json::Value;

/// Flatten one raw inventory record into the fixed listing shape.
///
/// Optional fields are copied verbatim when present and replaced with the
/// `"NA"` sentinel when absent. The two price objects are required: a
/// record without `currentPrice.amount` or `listingPrice.amount` is a
/// malformed vendor response and fails normalization for the whole event.
pub fn normalize_listing(raw: &Value) -> Result<NormalizedListing> {
    let seat_numbers = match raw.get("seatNumbers").and_then(Value::as_str) {
        Some(seats) => seats.replace(',', ";"),
        None => NA.to_string(),
    };

    Ok(NormalizedListing {
        listing_id: field_or_na(raw, "listingId"),
        section_id: field_or_na(raw, "sectionId"),
        row: field_or_na(raw, "row"),
        quantity: field_or_na(raw, "quantity"),
        seller_section_name: field_or_na(raw, "sellerSectionName"),
        section_name: field_or_na(raw, "sectionName"),
        zone_id: field_or_na(raw, "zoneId"),
        zone_name: field_or_na(raw, "zoneName"),
        dirty_ticket_ind: field_or_na(raw, "dirtyTicketInd"),
        score: field_or_na(raw, "score"),
        current_price: amount(raw, "currentPrice")?,
        listing_price: amount(raw, "listingPrice")?,
        seat_numbers,
    })
}

/// Normalize a page of raw records, preserving input order.
pub fn normalize_listings(raw: &[Value]) -> Result<Vec<NormalizedListing>> {
    raw.iter().map(normalize_listing).collect()
}

fn field_or_na(raw: &Value, key: &str) -> Value {
    raw.get(key)
        .cloned()
        .unwrap_or_else(|| Value::String(NA.to_string()))
}

fn amount(raw: &Value, key: &str) -> Result<f64> {
    raw.get(key)
        .and_then(|price| price.get("amount"))
        .and_then(Value::as_f64)
        .ok_or_else(|| ScraperError::MissingField(format!("{}.amount", key)))
}
