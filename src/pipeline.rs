use crate::client::VendorClient;
use crate::config::{Config, StubhubConfig};
use crate::inventory::fetch_listings;
use crate::types::{Event, FetchOutcome, FetchResult, RunSummary};
use chrono::Utc;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Runs the per-event inventory fetches across a bounded worker pool and
/// reduces the results into batch statistics.
pub struct Orchestrator {
    client: VendorClient,
    config: Config,
}

impl Orchestrator {
    pub fn new(client: VendorClient, config: Config) -> Self {
        Self { client, config }
    }

    /// Fetch every event's inventory concurrently.
    ///
    /// One task per event, with a semaphore bounding how many run at once.
    /// Every fault inside a task becomes that event's recorded outcome; a
    /// single broken event never aborts the batch. Results are gathered in
    /// submission order.
    pub async fn run_batch(
        &self,
        events: Vec<Event>,
        paginate: bool,
    ) -> (Vec<FetchResult>, RunSummary) {
        let pool = Arc::new(Semaphore::new(self.config.stubhub.workers));
        let mut handles = Vec::with_capacity(events.len());

        for event in events {
            let pool = pool.clone();
            let client = self.client.clone();
            let stubhub = self.config.stubhub.clone();
            let event_name = event.event_name.clone();

            let handle = tokio::spawn(async move {
                let _permit = pool.acquire_owned().await.expect("worker pool semaphore closed");
                fetch_event(client, event, paginate, stubhub).await
            });
            handles.push((event_name, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (event_name, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Worker for event {} panicked: {}", event_name, e);
                    results.push(FetchResult {
                        event_name,
                        outcome: FetchOutcome::Failed(format!("worker panicked: {}", e)),
                        duration_secs: 0.0,
                        truncated: false,
                        fetched_at: Utc::now(),
                    });
                }
            }
        }

        let summary = summarize(&results);
        (results, summary)
    }
}

/// One worker unit: fetch a single event's inventory.
///
/// Errors are recorded on the result instead of propagated, keeping the
/// fault boundary uniform with per-anchor handling in discovery.
async fn fetch_event(
    client: VendorClient,
    event: Event,
    paginate: bool,
    config: StubhubConfig,
) -> FetchResult {
    let fetched_at = Utc::now();
    let started = Instant::now();

    let (outcome, truncated) = match fetch_listings(&client, &event.event_id, paginate, &config).await
    {
        Ok(fetch) => {
            if fetch.truncated {
                warn!(
                    "Inventory for event {} truncated at {} of {} listings",
                    event.event_name,
                    fetch.listings.len(),
                    fetch.total_listings
                );
            }
            (FetchOutcome::Listings(fetch.listings), fetch.truncated)
        }
        Err(e) => {
            warn!("Fetching listings for event {} failed: {}", event.event_name, e);
            (FetchOutcome::Failed(e.to_string()), false)
        }
    };

    let duration_secs = started.elapsed().as_secs_f64();
    info!(
        "Fetched {} listings for event {} in {:.2} seconds",
        outcome.listing_count(),
        event.event_name,
        duration_secs
    );

    histogram!("stubhub_fetch_duration_seconds").record(duration_secs);
    counter!(
        "stubhub_fetches_total",
        "outcome" => if outcome.is_success() { "ok" } else { "error" }
    )
    .increment(1);
    counter!("stubhub_listings_fetched_total").increment(outcome.listing_count() as u64);

    FetchResult {
        event_name: event.event_name,
        outcome,
        duration_secs,
        truncated,
        fetched_at,
    }
}

/// Reduce per-event results into batch statistics.
///
/// Failed means the fetch errored; an event that completed with zero
/// listings counts as empty, not failed. All ratios are defined as 0 for
/// an empty batch.
pub fn summarize(results: &[FetchResult]) -> RunSummary {
    let total_events = results.len();
    if total_events == 0 {
        return RunSummary {
            total_events: 0,
            average_duration_secs: 0.0,
            success_rate_percent: 0.0,
            failed_count: 0,
            empty_count: 0,
            truncated_count: 0,
        };
    }

    let total_duration: f64 = results.iter().map(|r| r.duration_secs).sum();
    let failed_count = results.iter().filter(|r| !r.outcome.is_success()).count();
    let empty_count = results
        .iter()
        .filter(|r| r.outcome.is_success() && r.outcome.listing_count() == 0)
        .count();
    let truncated_count = results.iter().filter(|r| r.truncated).count();

    RunSummary {
        total_events,
        average_duration_secs: total_duration / total_events as f64,
        success_rate_percent: 100.0 * (1.0 - failed_count as f64 / total_events as f64),
        failed_count,
        empty_count,
        truncated_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NormalizedListing;
    use serde_json::json;

    fn listing() -> NormalizedListing {
        NormalizedListing {
            listing_id: json!(1),
            section_id: json!("NA"),
            row: json!("NA"),
            quantity: json!(2),
            seller_section_name: json!("NA"),
            section_name: json!("NA"),
            zone_id: json!("NA"),
            zone_name: json!("NA"),
            dirty_ticket_ind: json!("NA"),
            score: json!("NA"),
            current_price: 50.0,
            listing_price: 55.0,
            seat_numbers: "NA".to_string(),
        }
    }

    fn result(outcome: FetchOutcome, duration_secs: f64) -> FetchResult {
        FetchResult {
            event_name: "Test Event".to_string(),
            outcome,
            duration_secs,
            truncated: false,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn empty_batch_has_zeroed_ratios() {
        let summary = summarize(&[]);

        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.average_duration_secs, 0.0);
        assert_eq!(summary.success_rate_percent, 0.0);
        assert_eq!(summary.failed_count, 0);
    }

    #[test]
    fn failed_fetch_halves_success_rate() {
        let results = vec![
            result(FetchOutcome::Listings(vec![listing(); 5]), 2.0),
            result(FetchOutcome::Failed("inventory request failed".into()), 4.0),
        ];

        let summary = summarize(&results);

        assert_eq!(summary.total_events, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.success_rate_percent, 50.0);
        assert_eq!(summary.average_duration_secs, 3.0);
    }

    #[test]
    fn sold_out_event_is_empty_not_failed() {
        let results = vec![
            result(FetchOutcome::Listings(vec![listing(); 5]), 1.0),
            result(FetchOutcome::Listings(Vec::new()), 1.0),
        ];

        let summary = summarize(&results);

        assert_eq!(summary.failed_count, 0);
        assert_eq!(summary.empty_count, 1);
        assert_eq!(summary.success_rate_percent, 100.0);
    }

    #[test]
    fn truncated_results_are_counted() {
        let mut truncated = result(FetchOutcome::Listings(vec![listing()]), 1.0);
        truncated.truncated = true;
        let results = vec![truncated, result(FetchOutcome::Listings(Vec::new()), 1.0)];

        assert_eq!(summarize(&results).truncated_count, 1);
    }
}
