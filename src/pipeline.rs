use crate::collate::{self, Snapshot};
use crate::config::Config;
use crate::domain::{EventRecord, VenueDetails};
use crate::error::Result;
use crate::extract;
use crate::fetch::PageFetcher;
use crate::reconcile;
use crate::storage::Storage;
use chrono::Utc;
use scraper::Html;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Result of a complete ingestion run.
#[derive(Debug, serde::Serialize)]
pub struct PipelineResult {
    pub discovered_events: usize,
    pub extracted_events: usize,
    pub venues: usize,
    pub composers: usize,
    pub pieces: usize,
    pub bookings: usize,
    pub tickets_reconciled: usize,
    pub errors: Vec<String>,
    pub snapshot_file: Option<String>,
}

pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    storage: Arc<dyn Storage>,
    config: Config,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, storage: Arc<dyn Storage>, config: Config) -> Self {
        Self {
            fetcher,
            storage,
            config,
        }
    }

    /// Runs one ingestion pass: discovery, per-event extraction, collation,
    /// bulk inserts and the ticket reconciliation pass. With `dry_run` the
    /// collated snapshot is written to disk and the store is left untouched.
    pub async fn run(&self, dry_run: bool) -> Result<PipelineResult> {
        let program_url = self.config.program_url();
        info!("📡 Fetching program listing from {}", program_url);
        println!("📡 Fetching program listing from {program_url}...");

        let listing_body = self.fetcher.fetch(&program_url).await?;
        let event_urls = {
            let document = Html::parse_document(&listing_body);
            extract::listing::event_urls(&document, &self.config.base_url)
        };
        info!("✅ Discovered {} events", event_urls.len());
        println!("✅ Discovered {} events", event_urls.len());

        let (records, errors) = self.extract_all(&event_urls).await;

        let snapshot = collate::collate(records);
        info!(
            "🔧 Collated {} events, {} venues, {} composers, {} pieces, {} bookings, {} ticket observations",
            snapshot.events.len(),
            snapshot.venues.len(),
            snapshot.composers.len(),
            snapshot.pieces.len(),
            snapshot.bookings.len(),
            snapshot.tickets.len()
        );

        let mut result = PipelineResult {
            discovered_events: event_urls.len(),
            extracted_events: snapshot.events.len(),
            venues: snapshot.venues.len(),
            composers: snapshot.composers.len(),
            pieces: snapshot.pieces.len(),
            bookings: snapshot.bookings.len(),
            tickets_reconciled: 0,
            errors,
            snapshot_file: None,
        };

        if dry_run {
            let snapshot_file = self.write_snapshot(&snapshot)?;
            info!("💾 Wrote snapshot to {}", snapshot_file);
            println!("💾 Wrote snapshot to {snapshot_file}");
            result.snapshot_file = Some(snapshot_file);
            return Ok(result);
        }

        self.storage.insert_events(&snapshot.events).await?;
        self.storage.insert_venues(&snapshot.venues).await?;
        self.storage.insert_composers(&snapshot.composers).await?;
        self.storage.insert_pieces(&snapshot.pieces).await?;
        self.storage.insert_bookings(&snapshot.bookings).await?;
        info!("💾 Saved snapshot rows to storage");

        // One frozen timestamp for the whole reconciliation pass, so repeated
        // observations within this run cannot drift last_check per row
        let now = Utc::now();
        result.tickets_reconciled =
            reconcile::reconcile_pass(self.storage.as_ref(), &snapshot.tickets, now).await?;
        info!("🎫 Reconciled {} ticket observations", result.tickets_reconciled);

        Ok(result)
    }

    /// Extracts all event pages with a bounded number of concurrent fetches.
    /// Workers share nothing; results are merged here. A failed event is
    /// reported and skipped, the rest of the run continues.
    async fn extract_all(
        &self,
        event_urls: &[String],
    ) -> (Vec<(EventRecord, VenueDetails)>, Vec<String>) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches));
        let mut handles = Vec::with_capacity(event_urls.len());

        for url in event_urls {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let base_url = self.config.base_url.clone();
            let festival_year = self.config.festival_year;
            let url = url.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let outcome = extract_one(fetcher, &url, &base_url, festival_year).await;
                (url, outcome)
            }));
        }

        let mut records = Vec::new();
        let mut errors = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((_, Ok(pair))) => {
                    info!("Parsed event: {}", pair.0.title);
                    println!("   Parsed event: {}", pair.0.title);
                    records.push(pair);
                }
                Ok((url, Err(e))) => {
                    error!("Extraction failed for {}: {}", url, e);
                    errors.push(format!("{url}: {e}"));
                }
                Err(e) => {
                    error!("Extraction task panicked: {}", e);
                    errors.push(format!("extraction task failed: {e}"));
                }
            }
        }
        (records, errors)
    }

    /// Writes the collated snapshot as NDJSON under the output directory.
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<String> {
        fs::create_dir_all(&self.config.output_dir)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("snapshot_{timestamp}.ndjson");
        let filepath = Path::new(&self.config.output_dir).join(&filename);
        let mut out = fs::File::create(&filepath)?;

        write_rows(&mut out, "event", &snapshot.events)?;
        write_rows(&mut out, "venue", &snapshot.venues)?;
        write_rows(&mut out, "composer", &snapshot.composers)?;
        write_rows(&mut out, "piece", &snapshot.pieces)?;
        write_rows(&mut out, "booking", &snapshot.bookings)?;
        write_rows(&mut out, "ticket_observation", &snapshot.tickets)?;

        Ok(filepath.to_string_lossy().to_string())
    }
}

fn write_rows<T: serde::Serialize>(
    out: &mut fs::File,
    entity: &str,
    rows: &[T],
) -> Result<()> {
    for row in rows {
        let line = json!({ "entity": entity, "row": row });
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Fetches and extracts one event page plus its venue page. The parsed
/// documents stay local so the worker future remains Send.
async fn extract_one(
    fetcher: Arc<dyn PageFetcher>,
    url: &str,
    base_url: &str,
    festival_year: i32,
) -> Result<(EventRecord, VenueDetails)> {
    let body = fetcher.fetch(url).await?;
    let record = {
        let document = Html::parse_document(&body);
        extract::event::extract_event(&document, url, base_url, festival_year)
    }?;

    let details = match &record.venue_url {
        Some(venue_url) => {
            let venue_body = fetcher.fetch(venue_url).await?;
            {
                let document = Html::parse_document(&venue_body);
                extract::venue::extract_venue_details(&document, base_url)
            }
        }
        None => {
            warn!("Event '{}' has no venue link", record.title);
            VenueDetails::default()
        }
    };

    Ok((record, details))
}
