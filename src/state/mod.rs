//! State module for tracking per-URL crawl progress
//!
//! Every URL claimed by a crawl moves through the same small state machine:
//!
//! ```text
//! Unclaimed -> Downloading -> { Fetched | Errored }
//! Fetched -> { Extracting | Done }
//! Extracting -> { Errored | Done }
//! Errored -> Done
//! ```
//!
//! Leaf pages (no remaining depth) go straight from `Fetched` to `Done`.

mod page_state;

pub use page_state::PageState;
