#[cfg(feature = "db")]
pub mod database;
pub mod in_memory;

use crate::domain::{BookingRow, ComposerRow, EventRow, PieceRow, TicketKey, TicketRecord, VenueRow};
use crate::error::Result;
use async_trait::async_trait;

#[cfg(feature = "db")]
pub use database::DatabaseStorage;
pub use in_memory::InMemoryStorage;

/// Storage gateway for one snapshot's rows and the historized ticket table.
///
/// The five non-historized tables take insert-if-absent bulk upserts; rows
/// already present are silently ignored. Tickets are the only entity with
/// cross-run state and go through `lookup_ticket`/`replace_ticket` only.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn insert_events(&self, rows: &[EventRow]) -> Result<usize>;
    async fn insert_venues(&self, rows: &[VenueRow]) -> Result<usize>;
    async fn insert_composers(&self, rows: &[ComposerRow]) -> Result<usize>;
    async fn insert_pieces(&self, rows: &[PieceRow]) -> Result<usize>;
    async fn insert_bookings(&self, rows: &[BookingRow]) -> Result<usize>;

    /// Latest persisted observation for one (event, price) key, if any.
    async fn lookup_ticket(&self, key: &TicketKey) -> Result<Option<TicketRecord>>;

    /// Replaces the row for `record`'s key. The delete of the prior row and
    /// the insert of the replacement must apply as one atomic unit; a partial
    /// application would reset the key's history on the next run.
    async fn replace_ticket(&self, record: &TicketRecord) -> Result<()>;

    /// Drops all persisted data and recreates the schema.
    async fn reset(&self) -> Result<()>;
}
