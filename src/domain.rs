use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `events` table. `title` is the natural key; dependent rows
/// reference events by (title, starting_time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub title: String,
    pub starting_time: NaiveDateTime,
    pub venue_name: String,
    pub url: String,
    pub img_url: Option<String>,
}

/// One row of the `venues` table, deduplicated by full-tuple equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueRow {
    pub name: String,
    /// Absent when the event page carried no link to the venue's own page.
    pub url: Option<String>,
    pub img_url: Option<String>,
    pub gmaps_url: Option<String>,
}

/// One row of the `composers` table, deduplicated by full-tuple equality.
/// A missing death year means the composer is still active or unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComposerRow {
    pub name: String,
    pub birth_year: i32,
    pub death_year: Option<i32>,
}

/// One (composer, work) pairing observed within one event. Repeats across
/// events are meaningful and are not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRow {
    pub composer_name: String,
    pub title: String,
    pub event_title: String,
    pub event_starting_time: NaiveDateTime,
}

/// One performer-to-event association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRow {
    pub artist_name: String,
    pub event_title: String,
    pub event_starting_time: NaiveDateTime,
}

/// A single run's snapshot of one price tier for one event, as extracted from
/// the page. Consumed by the reconciler and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketObservation {
    pub price: i64,
    pub available: bool,
}

/// Natural key of a persisted ticket row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketKey {
    pub event_title: String,
    pub event_starting_time: NaiveDateTime,
    pub price: i64,
}

/// The persisted, historized ticket row. The only entity with cross-run
/// state; mutated exclusively by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub event_title: String,
    pub event_starting_time: NaiveDateTime,
    pub price: i64,
    pub available: bool,
    /// Earliest run that ever observed this (event, price) combination.
    pub first_check: DateTime<Utc>,
    /// Most recent run that observed it, available or not.
    pub last_check: DateTime<Utc>,
    /// Earliest run at which the price was seen sold out. Never cleared.
    pub first_sold_out_check: Option<DateTime<Utc>>,
}

impl TicketRecord {
    pub fn key(&self) -> TicketKey {
        TicketKey {
            event_title: self.event_title.clone(),
            event_starting_time: self.event_starting_time,
            price: self.price,
        }
    }
}

/// A ticket observation joined to its event key, ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedTicket {
    pub event_title: String,
    pub event_starting_time: NaiveDateTime,
    pub observation: TicketObservation,
}

impl ObservedTicket {
    pub fn key(&self) -> TicketKey {
        TicketKey {
            event_title: self.event_title.clone(),
            event_starting_time: self.event_starting_time,
            price: self.observation.price,
        }
    }
}

/// Everything extracted from a single event page, before collation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub starting_time: NaiveDateTime,
    pub venue_name: String,
    pub url: String,
    pub img_url: Option<String>,
    /// Link to the venue's own page, when the event page carries one.
    pub venue_url: Option<String>,
    pub composers: Vec<ComposerRow>,
    /// (composer name, piece title) pairs in program order.
    pub pieces: Vec<(String, String)>,
    pub performers: Vec<String>,
    pub tickets: Vec<TicketObservation>,
}

/// Auxiliary attributes read from a venue's own page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueDetails {
    pub img_url: Option<String>,
    pub gmaps_url: Option<String>,
}
