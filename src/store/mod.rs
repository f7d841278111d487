//! Schemaless document store over a single SQLite table.
//!
//! Every record is a JSON object stored in the `documents` table under a
//! `(collection, id)` key. Readers get whole documents back; writers go
//! through merge patches or field increments so concurrent updates do not
//! clobber each other. Every successful write publishes the collection
//! name on a broadcast channel for the live event feeds.

pub mod collections;
mod migrations;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Wall-clock timestamp in the format used across all stored records.
pub fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Clone)]
pub struct DocStore {
    conn: Arc<Mutex<Connection>>,
    changes_tx: broadcast::Sender<String>,
}

impl DocStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
            .context("failed to set database pragmas")?;
        migrations::run_migrations(&conn)?;

        let (changes_tx, _) = broadcast::channel(256);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            changes_tx,
        })
    }

    /// Subscribe to collection change notifications. Each message is the
    /// name of a collection that had a write committed.
    pub fn watch(&self) -> broadcast::Receiver<String> {
        self.changes_tx.subscribe()
    }

    fn notify(&self, collection: &str) {
        // Nobody listening is fine.
        let _ = self.changes_tx.send(collection.to_string());
    }

    /// Insert a record, assigning `id` and `created_at` if the record does
    /// not already carry them. Returns the document id.
    pub fn create<T: Serialize>(&self, collection: &str, record: &T) -> anyhow::Result<String> {
        let body = serde_json::to_value(record).context("failed to serialize record")?;
        let Value::Object(mut fields) = body else {
            anyhow::bail!("document must serialize to a JSON object");
        };

        let id = match fields.get("id").and_then(Value::as_str) {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        fields.insert("id".into(), Value::String(id.clone()));

        let created_at = match fields.get("created_at").and_then(Value::as_str) {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => now_stamp(),
        };
        fields.insert("created_at".into(), Value::String(created_at.clone()));

        let body_text = serde_json::to_string(&Value::Object(fields))
            .context("failed to serialize record")?;
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO documents (collection, id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![collection, id, body_text, created_at],
            )?;
        }
        self.notify(collection);
        Ok(id)
    }

    /// All documents in a collection, oldest first.
    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> anyhow::Result<Vec<T>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT body FROM documents WHERE collection = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(decode(collection, &row?)?);
        }
        Ok(records)
    }

    pub fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> anyhow::Result<Option<T>> {
        let conn = self.conn.lock().unwrap();
        match fetch_body(&conn, collection, id)? {
            Some(body) => Ok(Some(decode(collection, &body)?)),
            None => Ok(None),
        }
    }

    /// First document whose top-level `field` equals the given string,
    /// oldest first. Collections are not indexed on body fields, so this
    /// scans; our collections stay small enough for that.
    pub fn get_one_by<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> anyhow::Result<Option<T>> {
        let path = format!("$.{field}");
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT body FROM documents
             WHERE collection = ?1 AND json_extract(body, ?2) = ?3
             ORDER BY created_at ASC, id ASC LIMIT 1",
            params![collection, path, value],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(body) => Ok(Some(decode(collection, &body)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Merge `patch` into the stored document (RFC 7386 semantics: object
    /// fields are merged, `null` removes a field). Returns false when the
    /// document does not exist.
    pub fn update(&self, collection: &str, id: &str, patch: &Value) -> anyhow::Result<bool> {
        let updated = {
            let conn = self.conn.lock().unwrap();
            apply_patch(&conn, collection, id, patch)?
        };
        if updated {
            self.notify(collection);
        }
        Ok(updated)
    }

    /// Add `delta` to a numeric top-level field in a single statement.
    /// A missing field counts as zero.
    pub fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: f64,
    ) -> anyhow::Result<bool> {
        let updated = {
            let conn = self.conn.lock().unwrap();
            apply_increment(&conn, collection, id, field, delta)?
        };
        if updated {
            self.notify(collection);
        }
        Ok(updated)
    }

    pub fn delete(&self, collection: &str, id: &str) -> anyhow::Result<bool> {
        let deleted = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )? > 0
        };
        if deleted {
            self.notify(collection);
        }
        Ok(deleted)
    }

    /// Run several reads and writes in one SQLite transaction. The closure
    /// result decides the outcome: `Ok` commits, `Err` rolls back. Change
    /// notifications go out only after a successful commit.
    ///
    /// The connection lock is held for the whole batch, so the closure must
    /// do all store access through the handle it is given.
    pub fn batch<R, E, F>(&self, f: F) -> Result<R, E>
    where
        E: From<anyhow::Error>,
        F: FnOnce(&mut StoreBatch<'_>) -> Result<R, E>,
    {
        let (result, changed) = {
            let mut conn = self.conn.lock().unwrap();
            let txn = conn
                .transaction()
                .map_err(|e| anyhow::Error::from(e).context("failed to begin transaction"))?;
            let mut batch = StoreBatch {
                txn,
                changed: Vec::new(),
            };

            let result = f(&mut batch)?;

            let StoreBatch { txn, changed } = batch;
            txn.commit()
                .map_err(|e| anyhow::Error::from(e).context("failed to commit transaction"))?;
            (result, changed)
        };

        for collection in changed {
            let _ = self.changes_tx.send(collection);
        }
        Ok(result)
    }
}

/// Handle over an open transaction, passed to [`DocStore::batch`] closures.
pub struct StoreBatch<'a> {
    txn: rusqlite::Transaction<'a>,
    changed: Vec<String>,
}

impl StoreBatch<'_> {
    pub fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> anyhow::Result<Option<T>> {
        match fetch_body(&self.txn, collection, id)? {
            Some(body) => Ok(Some(decode(collection, &body)?)),
            None => Ok(None),
        }
    }

    pub fn update(&mut self, collection: &str, id: &str, patch: &Value) -> anyhow::Result<bool> {
        let updated = apply_patch(&self.txn, collection, id, patch)?;
        if updated {
            self.mark_changed(collection);
        }
        Ok(updated)
    }

    pub fn increment(
        &mut self,
        collection: &str,
        id: &str,
        field: &str,
        delta: f64,
    ) -> anyhow::Result<bool> {
        let updated = apply_increment(&self.txn, collection, id, field, delta)?;
        if updated {
            self.mark_changed(collection);
        }
        Ok(updated)
    }

    fn mark_changed(&mut self, collection: &str) {
        if !self.changed.iter().any(|c| c == collection) {
            self.changed.push(collection.to_string());
        }
    }
}

fn fetch_body(conn: &Connection, collection: &str, id: &str) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection, id],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(body) => Ok(Some(body)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn apply_patch(conn: &Connection, collection: &str, id: &str, patch: &Value) -> anyhow::Result<bool> {
    let patch_text = serde_json::to_string(patch).context("failed to serialize patch")?;
    let count = conn.execute(
        "UPDATE documents SET body = json_patch(body, ?3) WHERE collection = ?1 AND id = ?2",
        params![collection, id, patch_text],
    )?;
    Ok(count > 0)
}

fn apply_increment(
    conn: &Connection,
    collection: &str,
    id: &str,
    field: &str,
    delta: f64,
) -> anyhow::Result<bool> {
    let path = format!("$.{field}");
    let count = conn.execute(
        "UPDATE documents
         SET body = json_set(body, ?3, COALESCE(json_extract(body, ?3), 0) + ?4)
         WHERE collection = ?1 AND id = ?2",
        params![collection, id, path, delta],
    )?;
    Ok(count > 0)
}

fn decode<T: DeserializeOwned>(collection: &str, body: &str) -> anyhow::Result<T> {
    serde_json::from_str(body).with_context(|| format!("malformed document in {collection}"))
}
