/// Defaults for the vendor API and the worker pool. Everything here can be
/// overridden through `config.toml`.

// Inventory search pagination
pub const ROWS_PER_PAGE: u64 = 200;
pub const MAX_EXTRA_PAGES: u32 = 10;

// Worker pool and network
pub const WORKER_COUNT: usize = 5;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// API paths relative to the configured base URL
pub const LOGIN_PATH: &str = "/login";
pub const INVENTORY_SEARCH_PATH: &str = "/search/inventory/v2";

// CSS class signatures of the vendor's current venue-page markup.
// Overridable in config.toml; the page yields zero events when these go stale.
pub const EVENT_ANCHOR_SELECTOR: &str = "a.sc-1x2zy2i-2.cYRIRc.sc-97oil8-1.hZTepn";
pub const EVENT_NAME_SELECTOR: &str = "p.event-name-class";
pub const EVENT_DATE_SELECTOR: &str = "p.event-date-class";
