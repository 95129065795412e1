//! Append-only trip point persistence.
//!
//! Each geolocation sample taken while tracking is stored once, keyed by its
//! capture time. Points are never updated or pruned here.

use crate::cache::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// A persisted location sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TripPoint {
    /// Capture time in milliseconds since the Unix epoch; unique.
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl TripPoint {
    /// A point stamped with the current time.
    pub fn now(latitude: f64, longitude: f64, accuracy: Option<f64>) -> Self {
        Self { timestamp: chrono::Utc::now().timestamp_millis(), latitude, longitude, accuracy }
    }
}

impl CacheDb {
    /// Append a trip point.
    ///
    /// Returns false, leaving the stored point untouched, if a point with the
    /// same timestamp already exists.
    pub async fn record_trip_point(&self, point: &TripPoint) -> Result<bool, Error> {
        let point = point.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO trips (timestamp, latitude, longitude, accuracy)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![point.timestamp, point.latitude, point.longitude, point.accuracy],
                )?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// The most recent `limit` trip points, newest first.
    pub async fn recent_trip_points(&self, limit: usize) -> Result<Vec<TripPoint>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<TripPoint>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT timestamp, latitude, longitude, accuracy
                     FROM trips ORDER BY timestamp DESC LIMIT ?1",
                )?;
                let points = stmt
                    .query_map(params![limit], |row| {
                        Ok(TripPoint {
                            timestamp: row.get(0)?,
                            latitude: row.get(1)?,
                            longitude: row.get(2)?,
                            accuracy: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(points)
            })
            .await
            .map_err(Error::from)
    }

    /// Total number of stored trip points.
    pub async fn trip_point_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
