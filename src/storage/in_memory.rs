use super::Storage;
use crate::domain::{
    BookingRow, ComposerRow, EventRow, PieceRow, TicketKey, TicketRecord, VenueRow,
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// In-memory storage implementation for development/testing.
#[derive(Default)]
pub struct InMemoryStorage {
    events: Mutex<Vec<EventRow>>,
    venues: Mutex<Vec<VenueRow>>,
    composers: Mutex<Vec<ComposerRow>>,
    pieces: Mutex<Vec<PieceRow>>,
    bookings: Mutex<Vec<BookingRow>>,
    tickets: Mutex<HashMap<TicketKey, TicketRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.lock().unwrap().len()
    }
}

fn insert_if_absent<T: PartialEq + Clone>(table: &Mutex<Vec<T>>, rows: &[T]) -> usize {
    let mut table = table.lock().unwrap();
    let mut inserted = 0;
    for row in rows {
        if !table.contains(row) {
            table.push(row.clone());
            inserted += 1;
        }
    }
    inserted
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_events(&self, rows: &[EventRow]) -> Result<usize> {
        let inserted = insert_if_absent(&self.events, rows);
        debug!("Inserted {} of {} event rows", inserted, rows.len());
        Ok(inserted)
    }

    async fn insert_venues(&self, rows: &[VenueRow]) -> Result<usize> {
        Ok(insert_if_absent(&self.venues, rows))
    }

    async fn insert_composers(&self, rows: &[ComposerRow]) -> Result<usize> {
        Ok(insert_if_absent(&self.composers, rows))
    }

    async fn insert_pieces(&self, rows: &[PieceRow]) -> Result<usize> {
        Ok(insert_if_absent(&self.pieces, rows))
    }

    async fn insert_bookings(&self, rows: &[BookingRow]) -> Result<usize> {
        Ok(insert_if_absent(&self.bookings, rows))
    }

    async fn lookup_ticket(&self, key: &TicketKey) -> Result<Option<TicketRecord>> {
        Ok(self.tickets.lock().unwrap().get(key).cloned())
    }

    async fn replace_ticket(&self, record: &TicketRecord) -> Result<()> {
        // Single map entry swap under one lock: atomic by construction
        self.tickets
            .lock()
            .unwrap()
            .insert(record.key(), record.clone());
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.events.lock().unwrap().clear();
        self.venues.lock().unwrap().clear();
        self.composers.lock().unwrap().clear();
        self.pieces.lock().unwrap().clear();
        self.bookings.lock().unwrap().clear();
        self.tickets.lock().unwrap().clear();
        debug!("Cleared all in-memory tables");
        Ok(())
    }
}
