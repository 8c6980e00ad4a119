use crate::domain::{ComposerRow, EventRecord, TicketObservation};
use crate::error::{Result, ScraperError};
use crate::fields;
use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Cursor carried through the program-item scan. The site marks no explicit
/// grouping, so pieces attach to whichever composer header last parsed
/// successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProgramCursor {
    Idle,
    CollectingFor(String),
}

/// Extracts one event page into an [`EventRecord`].
///
/// The event title and the "Date and Venue" marker are load-bearing: if
/// either is missing or malformed, this event is unusable and the error
/// propagates (the caller skips the event and carries on with the rest of
/// the run). Every other field degrades to an empty or absent value.
pub fn extract_event(
    document: &Html,
    url: &str,
    base_url: &str,
    festival_year: i32,
) -> Result<EventRecord> {
    let title = event_title(document)?;
    let (starting_time, venue_name) = date_and_venue(document, festival_year)?;
    let (composers, pieces) = composers_and_pieces(document, &title);
    let performers = performers(document);
    let tickets = tickets(document);

    Ok(EventRecord {
        title,
        starting_time,
        venue_name,
        url: url.to_string(),
        img_url: super::image_url(document, base_url),
        venue_url: venue_url(document, base_url),
        composers,
        pieces,
        performers,
        tickets,
    })
}

fn event_title(document: &Html) -> Result<String> {
    let h1_selector = Selector::parse("h1").unwrap();
    document
        .select(&h1_selector)
        .next()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .ok_or_else(|| ScraperError::MissingStructure("event title (h1)".into()))
}

/// Locates the bolded "Date and Venue" marker and splits the text that
/// follows it into (date, time, venue) on the site's three-part pipe layout.
fn date_and_venue(document: &Html, festival_year: i32) -> Result<(NaiveDateTime, String)> {
    let strong_selector = Selector::parse("strong").unwrap();
    let marker = document
        .select(&strong_selector)
        .find(|el| el.text().collect::<String>().trim() == "Date and Venue")
        .ok_or_else(|| ScraperError::MissingStructure("'Date and Venue' marker".into()))?;

    let line = marker
        .next_siblings()
        .filter_map(|node| {
            if let Some(el) = ElementRef::wrap(node) {
                Some(el.text().collect::<String>())
            } else {
                node.value().as_text().map(|t| t.text.to_string())
            }
        })
        .filter(|text| !text.trim().is_empty())
        .last()
        .ok_or_else(|| {
            ScraperError::MissingStructure("text following 'Date and Venue' marker".into())
        })?;

    // Collapse the markup's internal whitespace before splitting
    let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
    let parts: Vec<&str> = line.split(" | ").collect();
    if parts.len() != 3 {
        return Err(ScraperError::Unparseable {
            field: "date and venue line",
            text: line,
        });
    }

    let starting_time = fields::event_datetime(parts[0], parts[1], festival_year)?;
    Ok((starting_time, parts[2].to_string()))
}

/// Single pass over the flat program-item sibling list.
///
/// Each container may open with a bolded header. A header that repeats the
/// event title is an annotation and leaves the cursor untouched; any other
/// header is a composer candidate, decided by whether the text immediately
/// after it parses as birth/death years. While the cursor holds a composer,
/// every emphasized element in the container is one of their pieces,
/// including containers with no header at all, which are plain continuation
/// rows.
fn composers_and_pieces(
    document: &Html,
    event_title: &str,
) -> (Vec<ComposerRow>, Vec<(String, String)>) {
    let item_selector = Selector::parse("div.program-item").unwrap();
    let strong_selector = Selector::parse("strong").unwrap();
    let em_selector = Selector::parse("em").unwrap();

    // Non-musical events have no program items at all; that is a valid page.
    let Some(first_item) = document.select(&item_selector).next() else {
        return (Vec::new(), Vec::new());
    };
    let Some(container) = first_item.parent().and_then(ElementRef::wrap) else {
        return (Vec::new(), Vec::new());
    };

    let mut composers = Vec::new();
    let mut pieces = Vec::new();
    let mut cursor = ProgramCursor::Idle;

    for item in container.children().filter_map(ElementRef::wrap) {
        // Spacer rows carry no program content
        if item.value().classes().any(|class| class == "negative-margin") {
            continue;
        }

        if let Some(header) = item.select(&strong_selector).next() {
            let header_text = header.text().collect::<String>().trim().to_string();
            if header_text != event_title {
                let years_text = header
                    .next_sibling()
                    .and_then(|node| {
                        if let Some(el) = ElementRef::wrap(node) {
                            Some(el.text().collect::<String>())
                        } else {
                            node.value().as_text().map(|t| t.text.to_string())
                        }
                    })
                    .unwrap_or_default();

                match fields::composer_years(&fields::clean_name(&years_text)) {
                    Some((birth_year, death_year)) => {
                        composers.push(ComposerRow {
                            name: header_text.clone(),
                            birth_year,
                            death_year,
                        });
                        cursor = ProgramCursor::CollectingFor(header_text);
                    }
                    None => {
                        debug!("Header '{}' is not a composer entry", header_text);
                        cursor = ProgramCursor::Idle;
                    }
                }
            }
        }

        if let ProgramCursor::CollectingFor(composer_name) = &cursor {
            for piece in item.select(&em_selector) {
                pieces.push((composer_name.clone(), piece.text().collect::<String>()));
            }
        }
    }

    (composers, pieces)
}

fn performers(document: &Html) -> Vec<String> {
    let list_selector = Selector::parse("ul.performers-list").unwrap();
    let strong_selector = Selector::parse("strong").unwrap();

    match document.select(&list_selector).next() {
        Some(list) => list
            .select(&strong_selector)
            .map(|entry| fields::clean_name(&entry.text().collect::<String>()))
            .collect(),
        None => Vec::new(),
    }
}

/// Ticket state policy, first match wins: past events are not tracked, free
/// entry is a single zero-price observation, otherwise each child of the
/// prices container contributes observations.
fn tickets(document: &Html) -> Vec<TicketObservation> {
    let past_selector = Selector::parse("span.status.past-event").unwrap();
    if document.select(&past_selector).next().is_some() {
        debug!("Past event; not tracking prices");
        return Vec::new();
    }

    let free_selector = Selector::parse("span.status.free-entry").unwrap();
    if document.select(&free_selector).next().is_some() {
        return vec![TicketObservation {
            price: 0,
            available: true,
        }];
    }

    let prices_selector = Selector::parse("div.prices").unwrap();
    let Some(prices) = document.select(&prices_selector).next() else {
        return Vec::new();
    };

    let mut observations = Vec::new();
    for child in prices.children() {
        if let Some(el) = ElementRef::wrap(child) {
            // Recognized element classes are a closed set: only `striked`
            // (sold out). Anything else is surfaced and skipped.
            if el.value().classes().any(|class| class == "striked") {
                let text = el.text().collect::<String>();
                match text.trim().parse::<i64>() {
                    Ok(price) => observations.push(TicketObservation {
                        price,
                        available: false,
                    }),
                    Err(_) => warn!("Unparseable sold-out price: '{}'", text.trim()),
                }
            } else {
                warn!(
                    "Unknown price element: '{}'",
                    el.text().collect::<String>().trim()
                );
            }
        } else if let Some(text) = child.value().as_text() {
            observations.extend(fields::extract_prices(&text.text).into_iter().map(
                |price| TicketObservation {
                    price,
                    available: true,
                },
            ));
        }
    }
    observations
}

fn venue_url(document: &Html, base_url: &str) -> Option<String> {
    let link_selector = Selector::parse("section#venue a").unwrap();
    let href = document
        .select(&link_selector)
        .next()?
        .value()
        .attr("href")?;
    Some(format!("{base_url}{href}"))
}
