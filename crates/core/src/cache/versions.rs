//! Record of the last activated version.
//!
//! A version that fails to install never takes over; the stores named here
//! keep answering until a later version activates.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Store names owned by an activated version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActiveVersion {
    pub static_store: String,
    pub tile_store: String,
    pub data_store: String,
    pub activated_at: String,
}

impl ActiveVersion {
    /// Stamp the given store names with the current time.
    pub fn new(static_store: impl Into<String>, tile_store: impl Into<String>, data_store: impl Into<String>) -> Self {
        Self {
            static_store: static_store.into(),
            tile_store: tile_store.into(),
            data_store: data_store.into(),
            activated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl CacheDb {
    /// Replace the recorded active version.
    pub async fn record_active_version(&self, version: &ActiveVersion) -> Result<(), Error> {
        let version = version.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO active_version (id, static_store, tile_store, data_store, activated_at)
                     VALUES (1, ?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET
                        static_store = excluded.static_store,
                        tile_store = excluded.tile_store,
                        data_store = excluded.data_store,
                        activated_at = excluded.activated_at",
                    params![version.static_store, version.tile_store, version.data_store, version.activated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// The last version that activated against this database, if any.
    pub async fn active_version(&self) -> Result<Option<ActiveVersion>, Error> {
        self.conn
            .call(|conn| -> Result<Option<ActiveVersion>, Error> {
                let result = conn.query_row(
                    "SELECT static_store, tile_store, data_store, activated_at FROM active_version WHERE id = 1",
                    [],
                    |row| {
                        Ok(ActiveVersion {
                            static_store: row.get(0)?,
                            tile_store: row.get(1)?,
                            data_store: row.get(2)?,
                            activated_at: row.get(3)?,
                        })
                    },
                );
                match result {
                    Ok(version) => Ok(Some(version)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_version_on_fresh_db() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.active_version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_replaces_previous() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.record_active_version(&ActiveVersion::new("smartnav-2050-v1", "smartnav-tiles-v1", "smartnav-data-v1"))
            .await
            .unwrap();
        db.record_active_version(&ActiveVersion::new("smartnav-2050-v2", "smartnav-tiles-v1", "smartnav-data-v1"))
            .await
            .unwrap();

        let version = db.active_version().await.unwrap().unwrap();
        assert_eq!(version.static_store, "smartnav-2050-v2");
        assert_eq!(version.tile_store, "smartnav-tiles-v1");
    }
}
