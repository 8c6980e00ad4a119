//! Extraction of typed records from parsed event and venue pages.
//!
//! Everything in here operates on an already-parsed [`scraper::Html`]
//! document; fetching is the caller's job. Load-bearing markup (the event
//! title, the date/venue marker) aborts extraction for that one page only;
//! optional markup degrades to `None` or an empty collection.

pub mod event;
pub mod listing;
pub mod venue;

use scraper::{Html, Selector};

/// Reads the page's illustration reference from `picture > source[srcset]`.
/// Any structural absence yields `None` rather than failing the record.
pub(crate) fn image_url(document: &Html, base_url: &str) -> Option<String> {
    let source_selector = Selector::parse("picture source").unwrap();
    let srcset = document
        .select(&source_selector)
        .next()?
        .value()
        .attr("srcset")?;
    Some(format!("{base_url}{srcset}"))
}
