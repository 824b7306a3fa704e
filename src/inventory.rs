use crate::client::VendorClient;
use crate::config::StubhubConfig;
use crate::constants::INVENTORY_SEARCH_PATH;
use crate::error::{Result, ScraperError};
use crate::normalize::normalize_listings;
use crate::types::NormalizedListing;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// One page of the inventory search response.
#[derive(Debug, Deserialize)]
pub struct InventoryPage {
    #[serde(rename = "totalListings")]
    pub total_listings: u64,
    #[serde(default)]
    pub listing: Vec<Value>,
}

/// Listings for one event, with pagination accounting.
#[derive(Debug)]
pub struct InventoryFetch {
    pub listings: Vec<NormalizedListing>,
    /// Server-reported inventory size, which can exceed what was fetched.
    pub total_listings: u64,
    /// True when the continuation-page cap (or a short server response)
    /// stopped pagination before `total_listings` was reached.
    pub truncated: bool,
    pub requests: u32,
}

/// What the pagination loop should do after a page has been accumulated.
#[derive(Debug, PartialEq)]
enum NextPage {
    Fetch { start: u64 },
    Done,
    CapReached,
}

fn plan_next_page(accumulated: u64, total: u64, extra_pages: u32, rows: u64, cap: u32) -> NextPage {
    if accumulated >= total {
        return NextPage::Done;
    }
    if extra_pages >= cap {
        return NextPage::CapReached;
    }
    NextPage::Fetch {
        start: (u64::from(extra_pages) + 1) * rows,
    }
}

/// Fetch the ticket inventory for one event.
///
/// With `paginate` false only the first page (up to `rows_per_page`
/// records) is returned. With `paginate` true, continuation pages are
/// requested until the accumulated count reaches the server-reported
/// `totalListings` or the configured page cap fires, whichever comes
/// first. Hitting the cap marks the result truncated; callers must not
/// assume completeness when `total_listings` exceeds what one run can
/// cover.
pub async fn fetch_listings(
    client: &VendorClient,
    event_id: &str,
    paginate: bool,
    config: &StubhubConfig,
) -> Result<InventoryFetch> {
    let rows = config.rows_per_page;

    let first = fetch_page(client, event_id, rows, 0).await?;
    let total_listings = first.total_listings;
    let mut raw = first.listing;
    let mut requests = 1u32;
    let mut truncated = false;

    if paginate {
        let mut extra_pages = 0u32;
        loop {
            match plan_next_page(
                raw.len() as u64,
                total_listings,
                extra_pages,
                rows,
                config.max_extra_pages,
            ) {
                NextPage::Done => break,
                NextPage::CapReached => {
                    warn!(
                        event_id,
                        total_listings,
                        fetched = raw.len(),
                        "Continuation page cap reached, returning a truncated inventory"
                    );
                    truncated = true;
                    break;
                }
                NextPage::Fetch { start } => {
                    let mut page = fetch_page(client, event_id, rows, start).await?;
                    if page.listing.is_empty() {
                        // The server ran dry before reaching its own count;
                        // looping further would never make progress.
                        warn!(
                            event_id,
                            start, "Empty continuation page before totalListings was reached"
                        );
                        truncated = true;
                        break;
                    }
                    raw.append(&mut page.listing);
                    extra_pages += 1;
                    requests += 1;
                }
            }
        }
    }

    let listings = normalize_listings(&raw)?;
    debug!(
        event_id,
        fetched = listings.len(),
        total_listings,
        requests,
        "Inventory fetch complete"
    );

    Ok(InventoryFetch {
        listings,
        total_listings,
        truncated,
        requests,
    })
}

async fn fetch_page(
    client: &VendorClient,
    event_id: &str,
    rows: u64,
    start: u64,
) -> Result<InventoryPage> {
    debug!(event_id, start, "Requesting inventory page");

    let response = client
        .get_api(INVENTORY_SEARCH_PATH)
        .query(&[
            ("eventid", event_id),
            ("rows", &rows.to_string()),
            ("start", &start.to_string()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ScraperError::Api {
            message: format!(
                "inventory request for event {} failed with status {}",
                event_id,
                response.status()
            ),
        });
    }

    Ok(response.json::<InventoryPage>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Drive the planner the way the fetch loop does: every Fetch adds a
    // full page of `rows` records.
    fn run_plan(total: u64, rows: u64, cap: u32) -> (u32, bool) {
        let mut accumulated = rows.min(total); // first page
        let mut requests = 1u32;
        let mut extra_pages = 0u32;
        loop {
            match plan_next_page(accumulated, total, extra_pages, rows, cap) {
                NextPage::Done => return (requests, false),
                NextPage::CapReached => return (requests, true),
                NextPage::Fetch { start } => {
                    assert_eq!(start, (u64::from(extra_pages) + 1) * rows);
                    accumulated += rows.min(total - accumulated);
                    extra_pages += 1;
                    requests += 1;
                }
            }
        }
    }

    #[test]
    fn single_page_inventory_needs_one_request() {
        let (requests, truncated) = run_plan(150, 200, 10);
        assert_eq!(requests, 1);
        assert!(!truncated);
    }

    #[test]
    fn stops_exactly_at_total_listings() {
        // 350 listings: first page of 200, one continuation page
        let (requests, truncated) = run_plan(350, 200, 10);
        assert_eq!(requests, 2);
        assert!(!truncated);

        // exact multiple: 400 listings fit in two pages
        let (requests, truncated) = run_plan(400, 200, 10);
        assert_eq!(requests, 2);
        assert!(!truncated);
    }

    #[test]
    fn cap_bounds_requests_to_eleven() {
        // 5000 listings would need 25 pages; the cap stops at 1 + 10
        let (requests, truncated) = run_plan(5000, 200, 10);
        assert_eq!(requests, 11);
        assert!(truncated);
    }

    #[test]
    fn largest_uncapped_inventory_is_eleven_pages() {
        // 2200 listings: first page plus exactly 10 continuation pages
        let (requests, truncated) = run_plan(2200, 200, 10);
        assert_eq!(requests, 11);
        assert!(!truncated);
    }

    #[test]
    fn zero_listing_inventory_is_done_immediately() {
        assert_eq!(plan_next_page(0, 0, 0, 200, 10), NextPage::Done);
    }

    #[test]
    fn cap_is_configurable() {
        let (requests, truncated) = run_plan(5000, 200, 3);
        assert_eq!(requests, 4);
        assert!(truncated);
    }
}
