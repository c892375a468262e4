//! Typed access to the local `series` table.
//!
//! This module provides a high-level API over the SQLite database for the
//! user's tracked series, keyed by the remote service id.

use crate::db::Database;
use crate::models::{SeriesModel, SeriesType, UserSeriesStatus};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

/// Local series store
pub struct SeriesStore {
    db: Database,
}

impl SeriesStore {
    /// Create a new store over the given database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a series, replacing the stored fields when the id already exists
    pub fn upsert(&mut self, series: &SeriesModel) -> Result<()> {
        let conn = self.db.conn_mut();

        conn.execute(
            "INSERT INTO series (
                id, series_type, slug, title, synopsis, poster_url,
                user_status, progress, total_length, rating,
                start_date, end_date, added_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(id) DO UPDATE SET
                series_type = excluded.series_type,
                slug = excluded.slug,
                title = excluded.title,
                synopsis = excluded.synopsis,
                poster_url = excluded.poster_url,
                user_status = excluded.user_status,
                progress = excluded.progress,
                total_length = excluded.total_length,
                rating = excluded.rating,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                updated_at = excluded.updated_at",
            params![
                series.id,
                series.series_type.to_string(),
                series.slug,
                series.title,
                series.synopsis,
                series.poster_url,
                series.user_status.to_string(),
                series.progress,
                series.total_length,
                series.rating,
                series.start_date,
                series.end_date,
                series.added_at,
                series.updated_at,
            ],
        )
        .context("Failed to upsert series")?;

        info!(id = series.id, title = %series.title, "Stored series in local library");
        Ok(())
    }

    /// Remove a series; returns whether a row was deleted
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .db
            .conn_mut()
            .execute("DELETE FROM series WHERE id = ?1", params![id])
            .context("Failed to delete series")?;

        if deleted > 0 {
            debug!(id = id, "Deleted series from local library");
        }
        Ok(deleted > 0)
    }

    /// Fetch a single series by id
    pub fn get(&self, id: i64) -> Result<Option<SeriesModel>> {
        self.db
            .conn()
            .query_row(
                "SELECT * FROM series WHERE id = ?1",
                params![id],
                row_to_series,
            )
            .optional()
            .context("Failed to query series")
    }

    /// Fetch every tracked series, ordered by title
    pub fn all(&self) -> Result<Vec<SeriesModel>> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare("SELECT * FROM series ORDER BY title ASC, id ASC")?;
        let series = stmt
            .query_map([], row_to_series)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(series)
    }

    /// Check whether a series id is present
    pub fn contains(&self, id: i64) -> Result<bool> {
        let count: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM series WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Number of tracked series
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .conn()
            .query_row("SELECT COUNT(*) FROM series", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Helper: Convert a database row to a SeriesModel
fn row_to_series(row: &rusqlite::Row) -> rusqlite::Result<SeriesModel> {
    Ok(SeriesModel {
        id: row.get(0)?,
        series_type: row
            .get::<_, String>(1)?
            .parse()
            .unwrap_or(SeriesType::Unknown),
        slug: row.get(2)?,
        title: row.get(3)?,
        synopsis: row.get(4)?,
        poster_url: row.get(5)?,
        user_status: row
            .get::<_, String>(6)?
            .parse()
            .unwrap_or(UserSeriesStatus::Planned),
        progress: row.get::<_, i64>(7)? as u32,
        total_length: row.get::<_, Option<i64>>(8)?.map(|x| x as u32),
        rating: row.get::<_, Option<i64>>(9)?.map(|x| x as u16),
        start_date: row.get(10)?,
        end_date: row.get(11)?,
        added_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}
