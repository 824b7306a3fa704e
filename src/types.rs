use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel substituted for listing fields the vendor omitted.
pub const NA: &str = "NA";

/// One event discovered on a venue page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub event_name: String,
    pub event_date: String,
}

/// A ticket listing flattened to a fixed field set.
///
/// The ten optional fields keep whatever JSON value the vendor sent
/// (ids and quantities are numbers, names are strings) and fall back to
/// the `"NA"` sentinel when absent, so every listing serializes with the
/// same shape regardless of the source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedListing {
    pub listing_id: Value,
    pub section_id: Value,
    pub row: Value,
    pub quantity: Value,
    pub seller_section_name: Value,
    pub section_name: Value,
    pub zone_id: Value,
    pub zone_name: Value,
    pub dirty_ticket_ind: Value,
    pub score: Value,
    pub current_price: f64,
    pub listing_price: f64,
    /// Comma-separated in the raw record; stored with semicolons so the
    /// value stays a single field in comma-delimited output.
    pub seat_numbers: String,
}

/// What happened to one event's inventory fetch.
///
/// An empty listing vector is a completed fetch (the event may simply be
/// sold out), not a failure. Failures carry the error that stopped the
/// fetch so a broken event is distinguishable from an empty one.
#[derive(Debug, Clone, Serialize)]
pub enum FetchOutcome {
    Listings(Vec<NormalizedListing>),
    Failed(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Listings(_))
    }

    pub fn listing_count(&self) -> usize {
        match self {
            FetchOutcome::Listings(listings) => listings.len(),
            FetchOutcome::Failed(_) => 0,
        }
    }
}

/// Per-event result collected by the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub event_name: String,
    pub outcome: FetchOutcome,
    pub duration_secs: f64,
    /// True when the page cap stopped pagination before `totalListings`
    /// was reached.
    pub truncated: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Aggregate statistics for one batch run. Derived from the per-event
/// results, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_events: usize,
    pub average_duration_secs: f64,
    pub success_rate_percent: f64,
    pub failed_count: usize,
    pub empty_count: usize,
    pub truncated_count: usize,
}

/// Source of events for a venue.
///
/// The production implementation scrapes the vendor's venue page; keeping
/// the extraction rule behind this trait means a markup change (or a future
/// API endpoint) swaps the source without touching orchestration.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn discover_events(&self) -> Result<Vec<Event>>;
}
