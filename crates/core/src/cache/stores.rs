//! Named cache store operations.
//!
//! A store is a named bucket of captured responses keyed by [`CacheKey`].
//! Opening a store creates it if absent; deleting it drops every entry.

use super::connection::CacheDb;
use super::hash::CacheKey;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A captured response held in a cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub key: CacheKey,
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl CachedEntry {
    /// Capture a response under `key`, stamped with the current time.
    pub fn new(key: CacheKey, status_code: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { key, status_code, headers, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }
}

/// Name and size of a cache store.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

/// Handle to one named store inside a [`CacheDb`].
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    name: String,
}

impl CacheDb {
    /// Open a named store, creating it if it does not exist yet.
    pub async fn open_store(&self, name: &str) -> Result<CacheStore, Error> {
        let owned = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_store(conn, &owned)?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(CacheStore { db: self.clone(), name: name.to_string() })
    }

    /// List the names of every existing store, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Summaries of every store with entry counts.
    pub async fn store_summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, s.created_at, COUNT(e.key_hash)
                     FROM cache_stores s
                     LEFT JOIN cache_entries e ON e.store = s.name
                     GROUP BY s.name
                     ORDER BY s.created_at ASC, s.name ASC",
                )?;
                let summaries = stmt
                    .query_map([], |row| {
                        Ok(StoreSummary {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a named store and all of its entries.
    ///
    /// Returns false if no store with that name existed.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Find `key` in the named store without creating it.
    ///
    /// A store that does not exist simply has no entries.
    pub async fn lookup_in(&self, store: &str, key: &CacheKey) -> Result<Option<CachedEntry>, Error> {
        let key = key.clone();
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let result = conn.query_row(
                    "SELECT status_code, headers_json, body, stored_at
                     FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                    params![store, key.hash],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get(2)?, row.get(3)?)),
                );
                decode_row(key, result)
            })
            .await
            .map_err(Error::from)
    }

    /// Drop the entry table so every later store read and write fails.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn break_entry_table(&self) -> Result<(), Error> {
        self.conn
            .call(|conn| -> Result<(), Error> {
                conn.execute_batch("DROP TABLE cache_entries")?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up `key` across every store, oldest store first.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn lookup_any(&self, key: &CacheKey) -> Result<Option<CachedEntry>, Error> {
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let result = conn.query_row(
                    "SELECT e.status_code, e.headers_json, e.body, e.stored_at
                     FROM cache_entries e JOIN cache_stores s ON s.name = e.store
                     WHERE e.key_hash = ?1
                     ORDER BY s.created_at ASC, s.name ASC LIMIT 1",
                    params![key.hash],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get(2)?, row.get(3)?)),
                );
                decode_row(key, result)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheStore {
    /// Find the entry stored under `key`, if any.
    pub async fn lookup(&self, key: &CacheKey) -> Result<Option<CachedEntry>, Error> {
        self.db.lookup_in(&self.name, key).await
    }

    /// Insert or overwrite a single entry.
    pub async fn put(&self, entry: &CachedEntry) -> Result<(), Error> {
        self.put_all(std::slice::from_ref(entry)).await
    }

    /// Insert or overwrite several entries in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_all(&self, entries: &[CachedEntry]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|e| {
                let headers_json =
                    serde_json::to_string(&e.headers).map_err(|err| Error::CorruptEntry(err.to_string()))?;
                Ok((e.clone(), headers_json))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let store = self.name.clone();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &store)?;
                for (entry, headers_json) in &rows {
                    tx.execute(
                        "INSERT INTO cache_entries (
                            store, key_hash, method, url, status_code, headers_json, body, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                        ON CONFLICT(store, key_hash) DO UPDATE SET
                            method = excluded.method,
                            url = excluded.url,
                            status_code = excluded.status_code,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                        params![
                            &store,
                            &entry.key.hash,
                            &entry.key.method,
                            &entry.key.url,
                            entry.status_code as i64,
                            headers_json,
                            &entry.body,
                            &entry.stored_at,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// URLs of every entry in this store, sorted.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn urls(&self) -> Result<Vec<String>, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE store = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![store], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in this store.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn len(&self) -> Result<u64, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE store = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether this store holds no entries.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}

fn ensure_store(conn: &rusqlite::Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

type EntryRow = (i64, String, Vec<u8>, String);

fn decode_row(key: CacheKey, result: rusqlite::Result<EntryRow>) -> Result<Option<CachedEntry>, Error> {
    match result {
        Ok((status_code, headers_json, body, stored_at)) => {
            let headers: Vec<(String, String)> =
                serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            let status_code =
                u16::try_from(status_code).map_err(|_| Error::CorruptEntry(format!("status {status_code}")))?;
            Ok(Some(CachedEntry { key, status_code, headers, body, stored_at }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
