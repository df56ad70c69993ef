use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::debug;

use crate::error::StoreError;

/// Handle to the on-disk agenda database. Built once at startup and passed by
/// reference to every record-store call; each call opens its own short-lived
/// connection through [`Store::connect`].
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Create the data directory if needed and make sure the schema exists.
    /// Safe to call on an existing database: tables are only created when
    /// absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };

        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = store.connect()?;
        ensure_schema(&conn)?;
        debug!(path = %store.path.display(), "schema ready");

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection with foreign-key enforcement switched on.
    /// SQLite leaves the pragma off by default and it only applies to the
    /// connection that sets it.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(conn)
    }
}

fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS doctors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            specialty TEXT,
            phone TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            code TEXT,
            phone TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            doctor_id INTEGER NOT NULL,
            patient_id INTEGER NOT NULL,
            scheduled_at TEXT NOT NULL,
            reason TEXT,
            FOREIGN KEY(doctor_id) REFERENCES doctors(id) ON DELETE CASCADE,
            FOREIGN KEY(patient_id) REFERENCES patients(id) ON DELETE CASCADE
        )",
        [],
    )?;

    Ok(())
}
