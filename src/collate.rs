//! Collation of per-event extraction results into flat collections, one per
//! target entity, ready for storage.

use crate::domain::{
    BookingRow, ComposerRow, EventRecord, EventRow, ObservedTicket, PieceRow, TicketObservation,
    VenueDetails, VenueRow,
};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tracing::warn;

/// One ingestion run's worth of rows across all entities.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct Snapshot {
    pub events: Vec<EventRow>,
    pub venues: Vec<VenueRow>,
    pub composers: Vec<ComposerRow>,
    pub pieces: Vec<PieceRow>,
    pub bookings: Vec<BookingRow>,
    pub tickets: Vec<ObservedTicket>,
}

/// Flattens the extracted records into a [`Snapshot`].
///
/// Venues and composers get exact-tuple deduplication; events, pieces,
/// bookings and tickets do not; their repeats are either impossible by
/// construction or meaningful.
pub fn collate(records: Vec<(EventRecord, VenueDetails)>) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for (record, venue_details) in records {
        snapshot.venues.push(VenueRow {
            name: record.venue_name.clone(),
            url: record.venue_url.clone(),
            img_url: venue_details.img_url,
            gmaps_url: venue_details.gmaps_url,
        });

        for composer in record.composers {
            snapshot.composers.push(composer);
        }
        for (composer_name, title) in record.pieces {
            snapshot.pieces.push(PieceRow {
                composer_name,
                title,
                event_title: record.title.clone(),
                event_starting_time: record.starting_time,
            });
        }
        for artist_name in record.performers {
            snapshot.bookings.push(BookingRow {
                artist_name,
                event_title: record.title.clone(),
                event_starting_time: record.starting_time,
            });
        }
        for TicketObservation { price, available } in record.tickets {
            snapshot.tickets.push(ObservedTicket {
                event_title: record.title.clone(),
                event_starting_time: record.starting_time,
                observation: TicketObservation { price, available },
            });
        }

        snapshot.events.push(EventRow {
            title: record.title,
            starting_time: record.starting_time,
            venue_name: record.venue_name,
            url: record.url,
            img_url: record.img_url,
        });
    }

    snapshot.venues = dedup_exact(snapshot.venues);
    snapshot.composers = dedup_exact(snapshot.composers);
    flag_conflicting_composer_years(&snapshot.composers);

    snapshot
}

/// Order-preserving exact-duplicate elimination. This is not a key-based
/// merge: tuples differing in any attribute both survive.
fn dedup_exact<T: Eq + Hash + Clone>(rows: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

/// The source sometimes records the same composer name with different
/// birth/death years across events. Both tuples are kept as-is, but the
/// conflict is worth surfacing.
fn flag_conflicting_composer_years(composers: &[ComposerRow]) {
    let mut tuples_per_name: HashMap<&str, usize> = HashMap::new();
    for composer in composers {
        *tuples_per_name.entry(composer.name.as_str()).or_default() += 1;
    }
    for (name, count) in tuples_per_name {
        if count > 1 {
            warn!(
                "Composer '{}' recorded with {} conflicting year tuples",
                name, count
            );
        }
    }
}
