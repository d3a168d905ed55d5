use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

use crate::{
    error::Result,
    storage::kv::{KeyValueStore, StoredEntry},
};

/// SQLite-backed store for case records.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                owner TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            )",
            [],
        )?;

        // Create index for faster per-applicant listings
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_owner ON records(namespace, owner)",
            [],
        )?;

        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn decode((key, owner, payload): (String, String, String)) -> Result<StoredEntry> {
        Ok(StoredEntry {
            key,
            owner,
            payload: serde_json::from_str(&payload)?,
        })
    }
}

impl KeyValueStore for Database {
    fn put(&self, namespace: &str, entry: StoredEntry) -> Result<()> {
        // ON CONFLICT keeps the original rowid, so listings keep their order
        self.conn.execute(
            "INSERT INTO records (namespace, key, owner, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(namespace, key) DO UPDATE SET
                owner = excluded.owner,
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![
                namespace,
                entry.key,
                entry.owner,
                serde_json::to_string(&entry.payload)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Result<Option<StoredEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT key, owner, payload FROM records WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                Self::row_to_entry,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM records WHERE namespace = ?1 AND key = ?2",
            params![namespace, key],
        )?;
        Ok(removed > 0)
    }

    fn scan(&self, namespace: &str, owner: Option<&str>) -> Result<Vec<StoredEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, owner, payload FROM records
             WHERE namespace = ?1 AND (?2 IS NULL OR owner = ?2)
             ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map(params![namespace, owner], Self::row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    fn stats(&self) -> Result<BTreeMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT namespace, COUNT(*) FROM records GROUP BY namespace")?;

        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)))?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

        Ok(counts)
    }
}
