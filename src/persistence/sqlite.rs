use super::{InventoryStore, PersistenceResult, Positioned};
use crate::Inventory;
use crate::resource::{Machinery, Personnel};
use crate::usage::UsageEntry;
use rusqlite::{Connection, Transaction, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use tracing::info;

pub struct SqliteInventoryStore {
    connection: Mutex<Connection>,
}

impl SqliteInventoryStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS machinery (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                machinery_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS personnel (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                personnel_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS usage_log (
                position INTEGER PRIMARY KEY,
                entry_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    /// Replaces the table's rows. Each row is `(position, id, record)`.
    fn replace_rows<'a, T, I>(
        tx: &Transaction,
        table: &str,
        json_column: &str,
        rows: I,
    ) -> PersistenceResult<()>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = (usize, Option<&'a str>, &'a T)>,
    {
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        for (position, id, row) in rows {
            let json = serde_json::to_string(row)?;
            match id {
                Some(id) => tx.execute(
                    &format!("INSERT INTO {table} (position, id, {json_column}) VALUES (?1, ?2, ?3)"),
                    params![position as i64, id, json],
                )?,
                None => tx.execute(
                    &format!("INSERT INTO {table} (position, {json_column}) VALUES (?1, ?2)"),
                    params![position as i64, json],
                )?,
            };
        }
        Ok(())
    }

    fn read_rows<T: DeserializeOwned>(
        conn: &Connection,
        table: &str,
        json_column: &str,
    ) -> PersistenceResult<Vec<Positioned<T>>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT position, {json_column} FROM {table} ORDER BY position ASC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut values = Vec::new();
        for row in rows {
            let (position, json) = row?;
            values.push(Positioned {
                position: usize::try_from(position).ok(),
                record: serde_json::from_str(&json)?,
            });
        }
        Ok(values)
    }
}

impl InventoryStore for SqliteInventoryStore {
    fn save_inventory(&self, inventory: &Inventory) -> PersistenceResult<()> {
        super::validate_inventory(inventory)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        let resources = move || inventory.resources().iter().enumerate();
        Self::replace_rows(
            &tx,
            "machinery",
            "machinery_json",
            resources().filter_map(|(position, r)| {
                r.as_machinery().map(|m| (position, Some(m.id.as_str()), m))
            }),
        )?;
        Self::replace_rows(
            &tx,
            "personnel",
            "personnel_json",
            resources().filter_map(|(position, r)| {
                r.as_personnel().map(|p| (position, Some(p.id.as_str()), p))
            }),
        )?;
        Self::replace_rows(
            &tx,
            "usage_log",
            "entry_json",
            inventory
                .usage_log()
                .iter()
                .enumerate()
                .map(|(position, entry)| (position, None, entry)),
        )?;
        tx.commit()?;
        info!(resources = inventory.len(), "saved inventory to sqlite");
        Ok(())
    }

    fn load_inventory(&self) -> PersistenceResult<Option<Inventory>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let machinery: Vec<Positioned<Machinery>> =
            Self::read_rows(&conn, "machinery", "machinery_json")?;
        let personnel: Vec<Positioned<Personnel>> =
            Self::read_rows(&conn, "personnel", "personnel_json")?;
        if machinery.is_empty() && personnel.is_empty() {
            return Ok(None);
        }
        let usage_log: Vec<UsageEntry> = Self::read_rows(&conn, "usage_log", "entry_json")?
            .into_iter()
            .map(|row: Positioned<UsageEntry>| row.record)
            .collect();

        let resources = super::merge_positioned(machinery, personnel);
        Ok(Some(Inventory::from_resources(resources, usage_log)?))
    }
}
