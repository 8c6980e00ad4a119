//! Ticket-state reconciliation: merging a fresh observation with the prior
//! persisted row to preserve first_check / last_check / first_sold_out_check
//! on a store with no native history support.

use crate::domain::{ObservedTicket, TicketRecord};
use crate::error::Result;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Computes the replacement row for one (event, price) key.
///
/// - `first_check` is set on first observation and never changes.
/// - `first_sold_out_check` is set when the key is first seen unavailable
///   (immediately, if never seen before) and is never cleared, even if the
///   ticket becomes available again.
/// - `last_check` always advances to `now`.
pub fn reconcile(
    prior: Option<&TicketRecord>,
    observed: &ObservedTicket,
    now: DateTime<Utc>,
) -> TicketRecord {
    let available = observed.observation.available;
    let (first_check, first_sold_out_check) = match prior {
        None => (now, (!available).then_some(now)),
        Some(prior) => {
            let first_sold_out_check = if !available {
                // Keep the earliest sighting if one was already recorded
                prior.first_sold_out_check.or(Some(now))
            } else {
                prior.first_sold_out_check
            };
            (prior.first_check, first_sold_out_check)
        }
    };

    TicketRecord {
        event_title: observed.event_title.clone(),
        event_starting_time: observed.event_starting_time,
        price: observed.observation.price,
        available,
        first_check,
        last_check: now,
        first_sold_out_check,
    }
}

/// Runs one reconciliation pass over all observed tickets.
///
/// `now` is frozen for the whole pass so that repeated identical observations
/// within one run are idempotent and `last_check` does not drift per row.
/// Keys are processed serially; each key's delete+insert commits
/// independently through [`Storage::replace_ticket`], so an aborted run
/// leaves no partially-applied key.
pub async fn reconcile_pass(
    storage: &dyn Storage,
    tickets: &[ObservedTicket],
    now: DateTime<Utc>,
) -> Result<usize> {
    for observed in tickets {
        let key = observed.key();
        let prior = storage.lookup_ticket(&key).await?;
        let record = reconcile(prior.as_ref(), observed, now);
        debug!(
            "Reconciled ticket {} @ {} price {}: available={}",
            record.event_title, record.event_starting_time, record.price, record.available
        );
        storage.replace_ticket(&record).await?;
    }
    Ok(tickets.len())
}
