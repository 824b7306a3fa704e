use crate::client::VendorClient;
use crate::config::{Config, SelectorConfig};
use crate::error::Result;
use crate::types::{Event, EventSource};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{error, info, warn};

/// Event ids live in hrefs shaped like "/event/106532965/...".
static EVENT_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/event/(\d+)/").unwrap());

/// Discovers events by scraping the vendor's venue page.
///
/// There is no public endpoint for a venue's event list, so this source
/// leans on the page markup. Discovery is best-effort: transport failures
/// and unparsable anchors degrade to fewer (or zero) events instead of
/// erroring. A loaded-but-empty page is logged as probable selector
/// breakage, distinct from a transport failure.
pub struct VenuePageSource {
    client: VendorClient,
    venue_url: String,
    selectors: SelectorConfig,
}

impl VenuePageSource {
    pub fn new(client: VendorClient, config: &Config) -> Self {
        Self {
            client,
            venue_url: config.stubhub.venue_url.clone(),
            selectors: config.selectors.clone(),
        }
    }
}

#[async_trait::async_trait]
impl EventSource for VenuePageSource {
    fn source_name(&self) -> &'static str {
        "stubhub_venue_page"
    }

    async fn discover_events(&self) -> Result<Vec<Event>> {
        info!("Scraping events from {}", self.venue_url);

        let response = match self.client.get(&self.venue_url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to fetch venue page: {}", e);
                return Ok(Vec::new());
            }
        };

        if !response.status().is_success() {
            error!(
                "Venue page request failed with status {}",
                response.status()
            );
            return Ok(Vec::new());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read venue page body: {}", e);
                return Ok(Vec::new());
            }
        };

        let events = parse_venue_page(&body, &self.selectors);
        if events.is_empty() {
            warn!("Venue page loaded but no event anchors matched; the markup or the configured selectors may be stale");
        } else {
            info!("Found {} events", events.len());
        }
        counter!("stubhub_events_discovered_total").increment(events.len() as u64);

        Ok(events)
    }
}

/// Extract events from venue page markup.
///
/// Anchors without an `/event/<id>/` href are skipped silently; anchors
/// missing the name or date element are dropped whole with a warning, so
/// partial events never reach the orchestrator.
pub fn parse_venue_page(html: &str, selectors: &SelectorConfig) -> Vec<Event> {
    let anchor_selector = match Selector::parse(&selectors.event_anchor) {
        Ok(selector) => selector,
        Err(e) => {
            error!(
                "Invalid event anchor selector '{}': {:?}",
                selectors.event_anchor, e
            );
            return Vec::new();
        }
    };
    let name_selector = match Selector::parse(&selectors.event_name) {
        Ok(selector) => selector,
        Err(e) => {
            error!("Invalid event name selector '{}': {:?}", selectors.event_name, e);
            return Vec::new();
        }
    };
    let date_selector = match Selector::parse(&selectors.event_date) {
        Ok(selector) => selector,
        Err(e) => {
            error!("Invalid event date selector '{}': {:?}", selectors.event_date, e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut events = Vec::new();

    for anchor in document.select(&anchor_selector) {
        let href = match anchor.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        let event_id = match EVENT_ID_RE.captures(href) {
            Some(caps) => caps[1].to_string(),
            None => continue,
        };

        match (
            element_text(&anchor, &name_selector),
            element_text(&anchor, &date_selector),
        ) {
            (Some(event_name), Some(event_date)) => events.push(Event {
                event_id,
                event_name,
                event_date,
            }),
            _ => {
                warn!(event_id = %event_id, "Skipping event anchor with missing name or date");
            }
        }
    }

    events
}

fn element_text(anchor: &ElementRef, selector: &Selector) -> Option<String> {
    anchor
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_selectors() -> SelectorConfig {
        SelectorConfig {
            event_anchor: "a.event-link".to_string(),
            event_name: "p.event-name".to_string(),
            event_date: "p.event-date".to_string(),
        }
    }

    #[test]
    fn extracts_event_from_matching_anchor() {
        let html = r#"
            <html><body>
              <a class="event-link" href="/event/98765/band-x-tickets">
                <p class="event-name">Band X</p>
                <p class="event-date">Jan 1</p>
              </a>
            </body></html>
        "#;

        let events = parse_venue_page(html, &test_selectors());

        assert_eq!(
            events,
            vec![Event {
                event_id: "98765".to_string(),
                event_name: "Band X".to_string(),
                event_date: "Jan 1".to_string(),
            }]
        );
    }

    #[test]
    fn anchor_with_unparsable_href_yields_no_event() {
        let html = r#"
            <html><body>
              <a class="event-link" href="/venue/98765/">
                <p class="event-name">Band X</p>
                <p class="event-date">Jan 1</p>
              </a>
            </body></html>
        "#;

        assert!(parse_venue_page(html, &test_selectors()).is_empty());
    }

    #[test]
    fn anchor_missing_name_or_date_is_dropped_whole() {
        let html = r#"
            <html><body>
              <a class="event-link" href="/event/111/a">
                <p class="event-date">Jan 1</p>
              </a>
              <a class="event-link" href="/event/222/b">
                <p class="event-name">Band Y</p>
              </a>
              <a class="event-link" href="/event/333/c">
                <p class="event-name">Band Z</p>
                <p class="event-date">Feb 2</p>
              </a>
            </body></html>
        "#;

        let events = parse_venue_page(html, &test_selectors());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, "333");
    }

    #[test]
    fn non_matching_anchors_are_ignored() {
        let html = r#"
            <html><body>
              <a class="nav-link" href="/event/444/d">
                <p class="event-name">Nav Band</p>
                <p class="event-date">Mar 3</p>
              </a>
            </body></html>
        "#;

        assert!(parse_venue_page(html, &test_selectors()).is_empty());
    }

    #[test]
    fn whitespace_around_name_and_date_is_trimmed() {
        let html = r#"
            <html><body>
              <a class="event-link" href="/event/555/e">
                <p class="event-name">  Band W  </p>
                <p class="event-date">
                    Apr 4
                </p>
              </a>
            </body></html>
        "#;

        let events = parse_venue_page(html, &test_selectors());
        assert_eq!(events[0].event_name, "Band W");
        assert_eq!(events[0].event_date, "Apr 4");
    }
}
