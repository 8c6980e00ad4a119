use super::Storage;
use crate::domain::{
    BookingRow, ComposerRow, EventRow, PieceRow, TicketKey, TicketRecord, VenueRow,
};
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::{Builder, Connection, Database};
use std::env;
use tracing::info;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Turso/libSQL-backed storage gateway.
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    /// Connects to Turso using `LIBSQL_URL` and `LIBSQL_AUTH_TOKEN`.
    pub async fn connect() -> Result<Self> {
        let url = env::var("LIBSQL_URL").map_err(|_| ScraperError::Database {
            message: "LIBSQL_URL environment variable not set".to_string(),
        })?;

        let auth_token = env::var("LIBSQL_AUTH_TOKEN").map_err(|_| ScraperError::Database {
            message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
        })?;

        info!("Connecting to database at {}", url);

        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| ScraperError::Database {
                message: format!("Failed to connect to database: {e}"),
            })?;

        let storage = Self { db };
        storage.run_migrations().await?;
        Ok(storage)
    }

    async fn get_connection(&self) -> Result<Connection> {
        self.db.connect().map_err(|e| ScraperError::Database {
            message: format!("Failed to get database connection: {e}"),
        })
    }

    async fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection().await?;
        let migration_sql = include_str!("../../migrations/001_create_tables.sql");

        conn.execute_batch(migration_sql)
            .await
            .map_err(|e| ScraperError::Database {
                message: format!("Failed to run migrations: {e}"),
            })?;

        Ok(())
    }
}

fn encode_naive(ts: NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

fn decode_naive(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|e| ScraperError::Database {
        message: format!("Malformed timestamp '{text}' in database: {e}"),
    })
}

fn decode_utc(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ScraperError::Database {
            message: format!("Malformed check timestamp '{text}' in database: {e}"),
        })
}

fn db_err(context: &str) -> impl Fn(libsql::Error) -> ScraperError + '_ {
    move |e| ScraperError::Database {
        message: format!("{context}: {e}"),
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn insert_events(&self, rows: &[EventRow]) -> Result<usize> {
        let conn = self.get_connection().await?;
        for row in rows {
            conn.execute(
                "INSERT OR IGNORE INTO events (event_title, starting_time, venue_name, url, img_url) VALUES (?, ?, ?, ?, ?)",
                libsql::params![
                    row.title.as_str(),
                    encode_naive(row.starting_time),
                    row.venue_name.as_str(),
                    row.url.as_str(),
                    row.img_url.clone()
                ],
            )
            .await
            .map_err(db_err("Failed to insert event"))?;
        }
        Ok(rows.len())
    }

    async fn insert_venues(&self, rows: &[VenueRow]) -> Result<usize> {
        let conn = self.get_connection().await?;
        for row in rows {
            conn.execute(
                "INSERT OR IGNORE INTO venues (venue_name, venue_url, img_url, gmaps_url) VALUES (?, ?, ?, ?)",
                libsql::params![
                    row.name.as_str(),
                    row.url.clone(),
                    row.img_url.clone(),
                    row.gmaps_url.clone()
                ],
            )
            .await
            .map_err(db_err("Failed to insert venue"))?;
        }
        Ok(rows.len())
    }

    async fn insert_composers(&self, rows: &[ComposerRow]) -> Result<usize> {
        let conn = self.get_connection().await?;
        for row in rows {
            conn.execute(
                "INSERT OR IGNORE INTO composers (composer_name, dob, dod) VALUES (?, ?, ?)",
                libsql::params![
                    row.name.as_str(),
                    row.birth_year as i64,
                    row.death_year.map(|y| y as i64)
                ],
            )
            .await
            .map_err(db_err("Failed to insert composer"))?;
        }
        Ok(rows.len())
    }

    async fn insert_pieces(&self, rows: &[PieceRow]) -> Result<usize> {
        let conn = self.get_connection().await?;
        for row in rows {
            conn.execute(
                "INSERT OR IGNORE INTO pieces (composer_name, title, event_title, event_starting_time) VALUES (?, ?, ?, ?)",
                libsql::params![
                    row.composer_name.as_str(),
                    row.title.as_str(),
                    row.event_title.as_str(),
                    encode_naive(row.event_starting_time)
                ],
            )
            .await
            .map_err(db_err("Failed to insert piece"))?;
        }
        Ok(rows.len())
    }

    async fn insert_bookings(&self, rows: &[BookingRow]) -> Result<usize> {
        let conn = self.get_connection().await?;
        for row in rows {
            conn.execute(
                "INSERT OR IGNORE INTO bookings (artist_name, event_title, event_starting_time) VALUES (?, ?, ?)",
                libsql::params![
                    row.artist_name.as_str(),
                    row.event_title.as_str(),
                    encode_naive(row.event_starting_time)
                ],
            )
            .await
            .map_err(db_err("Failed to insert booking"))?;
        }
        Ok(rows.len())
    }

    async fn lookup_ticket(&self, key: &TicketKey) -> Result<Option<TicketRecord>> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT event_title, event_starting_time, price, available, first_check, last_check, first_sold_out_check \
                 FROM tickets WHERE event_title = ? AND event_starting_time = ? AND price = ?",
                libsql::params![
                    key.event_title.as_str(),
                    encode_naive(key.event_starting_time),
                    key.price
                ],
            )
            .await
            .map_err(db_err("Failed to query ticket"))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(db_err("Failed to read ticket row"))?
        else {
            return Ok(None);
        };

        let event_title: String = row.get(0).map_err(db_err("Failed to get event_title"))?;
        let starting_time: String = row
            .get(1)
            .map_err(db_err("Failed to get event_starting_time"))?;
        let price: i64 = row.get(2).map_err(db_err("Failed to get price"))?;
        let available: i64 = row.get(3).map_err(db_err("Failed to get available"))?;
        let first_check: String = row.get(4).map_err(db_err("Failed to get first_check"))?;
        let last_check: String = row.get(5).map_err(db_err("Failed to get last_check"))?;
        let first_sold_out_check: Option<String> = row.get(6).ok();

        Ok(Some(TicketRecord {
            event_title,
            event_starting_time: decode_naive(&starting_time)?,
            price,
            available: available != 0,
            first_check: decode_utc(&first_check)?,
            last_check: decode_utc(&last_check)?,
            first_sold_out_check: first_sold_out_check
                .map(|text| decode_utc(&text))
                .transpose()?,
        }))
    }

    async fn replace_ticket(&self, record: &TicketRecord) -> Result<()> {
        let conn = self.get_connection().await?;

        // Delete of the stale row and insert of the replacement share one
        // transaction: a crash between them would make the key look
        // never-observed on the next run and reset first_check.
        let tx = conn
            .transaction()
            .await
            .map_err(db_err("Failed to open ticket transaction"))?;

        tx.execute(
            "DELETE FROM tickets WHERE event_title = ? AND event_starting_time = ? AND price = ?",
            libsql::params![
                record.event_title.as_str(),
                encode_naive(record.event_starting_time),
                record.price
            ],
        )
        .await
        .map_err(db_err("Failed to delete prior ticket row"))?;

        tx.execute(
            "INSERT INTO tickets (event_title, event_starting_time, price, available, first_check, last_check, first_sold_out_check) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                record.event_title.as_str(),
                encode_naive(record.event_starting_time),
                record.price,
                record.available as i64,
                record.first_check.to_rfc3339(),
                record.last_check.to_rfc3339(),
                record.first_sold_out_check.map(|ts| ts.to_rfc3339())
            ],
        )
        .await
        .map_err(db_err("Failed to insert ticket row"))?;

        tx.commit().await.map_err(|e| ScraperError::TicketHistory {
            message: format!(
                "delete+insert for '{}' @ {} price {} did not commit atomically: {e}",
                record.event_title, record.event_starting_time, record.price
            ),
        })
    }

    async fn reset(&self) -> Result<()> {
        let conn = self.get_connection().await?;
        for table in ["tickets", "bookings", "pieces", "composers", "venues", "events"] {
            conn.execute(&format!("DROP TABLE IF EXISTS {table}"), ())
                .await
                .map_err(db_err("Failed to drop table"))?;
        }
        self.run_migrations().await?;
        info!("Reset database schema");
        Ok(())
    }
}
