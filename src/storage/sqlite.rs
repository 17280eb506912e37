use crate::model::{MonthKey, MonthlyAverage, PricePoint, PriceSeries, StorageError};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::debug;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database (`:memory:` is accepted) and creates the tables.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS prices (
                instrument TEXT NOT NULL,
                date TEXT NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (instrument, date)
            );

            CREATE TABLE IF NOT EXISTS monthly_averages (
                instrument TEXT NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                average REAL NOT NULL,
                observations INTEGER NOT NULL,
                PRIMARY KEY (instrument, year, month)
            );
            "
        )?;

        Ok(Self { conn })
    }

    /// Inserts or replaces every observation of `series` for `instrument`.
    pub fn save_series(&mut self, instrument: &str, series: &PriceSeries) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO prices (instrument, date, value) VALUES (?1, ?2, ?3)",
            )?;
            for point in series.points() {
                stmt.execute(params![instrument, point.date, point.value])?;
            }
        }
        tx.commit()?;
        debug!("Stored {} prices for {}", series.len(), instrument);
        Ok(())
    }

    /// Loads the stored series in date order, `None` when nothing is stored.
    pub fn load_series(&self, instrument: &str) -> Result<Option<PriceSeries>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, value FROM prices WHERE instrument = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![instrument], |row| {
            Ok(PricePoint {
                date: row.get::<_, NaiveDate>(0)?,
                value: row.get(1)?,
            })
        })?;

        let mut points = Vec::new();
        for point in rows {
            points.push(point?);
        }
        if points.is_empty() {
            return Ok(None);
        }

        PriceSeries::new(points)
            .map(Some)
            .map_err(|e| StorageError::InvalidDate(e.to_string()))
    }

    pub fn save_monthly(
        &mut self,
        instrument: &str,
        monthly: &[MonthlyAverage],
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM monthly_averages WHERE instrument = ?1",
            params![instrument],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO monthly_averages (instrument, year, month, average, observations)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for entry in monthly {
                stmt.execute(params![
                    instrument,
                    entry.month.year,
                    entry.month.month,
                    entry.average,
                    entry.observations as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_monthly(&self, instrument: &str) -> Result<Vec<MonthlyAverage>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT year, month, average, observations FROM monthly_averages
             WHERE instrument = ?1 ORDER BY year ASC, month ASC",
        )?;
        let rows = stmt.query_map(params![instrument], |row| {
            let observations: i64 = row.get(3)?;
            Ok(MonthlyAverage {
                month: MonthKey {
                    year: row.get(0)?,
                    month: row.get(1)?,
                },
                average: row.get(2)?,
                observations: observations as usize,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Removes everything stored for `instrument`.
    pub fn delete_instrument(&self, instrument: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM prices WHERE instrument = ?1", params![instrument])?;
        self.conn.execute(
            "DELETE FROM monthly_averages WHERE instrument = ?1",
            params![instrument],
        )?;
        Ok(())
    }
}
