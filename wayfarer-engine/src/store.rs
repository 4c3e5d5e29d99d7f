//! Storage backends for the game document collections.
//!
//! Two implementations of [`GameStore`]: an in-memory map store for
//! tests and single-process demos, and a SQLite store for durability.
//! Both store whole documents as JSON; SQLite additionally denormalizes
//! the columns the ongoing-adventure lookup needs.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use parking_lot::RwLock;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;
use wayfarer_core::types::{
    Adventure, AdventureId, AdventureStatus, CharacterId, CharacterSheet, WorldId, WorldRecord,
};

use crate::error::{EngineError, Result};
use crate::ports::GameStore;

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Map-backed store. Cheap clones of whole documents on every read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    characters: HashMap<CharacterId, CharacterSheet>,
    worlds: HashMap<WorldId, WorldRecord>,
    adventures: HashMap<AdventureId, Adventure>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn character(&self, id: CharacterId) -> Result<Option<CharacterSheet>> {
        Ok(self.inner.read().characters.get(&id).cloned())
    }

    fn put_character(&self, sheet: &CharacterSheet) -> Result<()> {
        self.inner.write().characters.insert(sheet.id, sheet.clone());
        Ok(())
    }

    fn world(&self, id: WorldId) -> Result<Option<WorldRecord>> {
        Ok(self.inner.read().worlds.get(&id).cloned())
    }

    fn put_world(&self, world: &WorldRecord) -> Result<()> {
        self.inner.write().worlds.insert(world.id, world.clone());
        Ok(())
    }

    fn adventure(&self, id: AdventureId) -> Result<Option<Adventure>> {
        Ok(self.inner.read().adventures.get(&id).cloned())
    }

    fn put_adventure(&self, adventure: &Adventure) -> Result<()> {
        self.inner
            .write()
            .adventures
            .insert(adventure.id, adventure.clone());
        Ok(())
    }

    fn delete_adventure(&self, id: AdventureId) -> Result<()> {
        self.inner.write().adventures.remove(&id);
        Ok(())
    }

    fn ongoing_adventures_for(&self, character: CharacterId) -> Result<Vec<Adventure>> {
        Ok(self
            .inner
            .read()
            .adventures
            .values()
            .filter(|a| a.character_id == character && a.status == AdventureStatus::Ongoing)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// SQLite store
// ---------------------------------------------------------------------------

/// SQLite-backed store. Documents are JSON blobs; the adventures table
/// denormalizes `character_id` and `status` so the ongoing-adventure
/// lookup is a plain indexed query.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and migrate) a store at the given path.
    ///
    /// # Errors
    /// Returns a database error if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open an in-memory store, for tests.
    ///
    /// # Errors
    /// Returns a database error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS characters (
                 id         TEXT PRIMARY KEY,
                 data       BLOB NOT NULL,
                 updated_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS worlds (
                 id         TEXT PRIMARY KEY,
                 data       BLOB NOT NULL,
                 updated_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS adventures (
                 id           TEXT PRIMARY KEY,
                 character_id TEXT NOT NULL,
                 status       TEXT NOT NULL,
                 data         BLOB NOT NULL,
                 updated_at   TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_adventures_character_status
                 ON adventures (character_id, status);",
        )?;
        debug!("sqlite store ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EngineError::Storage("sqlite connection lock poisoned".to_string()))
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| EngineError::Storage(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(blob: &[u8]) -> Result<T> {
    serde_json::from_slice(blob).map_err(|e| EngineError::Storage(e.to_string()))
}

fn status_label(status: AdventureStatus) -> &'static str {
    match status {
        AdventureStatus::Ongoing => "ongoing",
        AdventureStatus::Finished => "finished",
        AdventureStatus::Fled => "fled",
    }
}

impl GameStore for SqliteStore {
    fn character(&self, id: CharacterId) -> Result<Option<CharacterSheet>> {
        let conn = self.lock()?;
        let blob: Option<Vec<u8>> = conn
            .query_row(
                "SELECT data FROM characters WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        blob.map(|b| decode(&b)).transpose()
    }

    fn put_character(&self, sheet: &CharacterSheet) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO characters (id, data, updated_at)
             VALUES (?1, ?2, datetime('now'))",
            params![sheet.id.to_string(), encode(sheet)?],
        )?;
        Ok(())
    }

    fn world(&self, id: WorldId) -> Result<Option<WorldRecord>> {
        let conn = self.lock()?;
        let blob: Option<Vec<u8>> = conn
            .query_row(
                "SELECT data FROM worlds WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        blob.map(|b| decode(&b)).transpose()
    }

    fn put_world(&self, world: &WorldRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO worlds (id, data, updated_at)
             VALUES (?1, ?2, datetime('now'))",
            params![world.id.to_string(), encode(world)?],
        )?;
        Ok(())
    }

    fn adventure(&self, id: AdventureId) -> Result<Option<Adventure>> {
        let conn = self.lock()?;
        let blob: Option<Vec<u8>> = conn
            .query_row(
                "SELECT data FROM adventures WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        blob.map(|b| decode(&b)).transpose()
    }

    fn put_adventure(&self, adventure: &Adventure) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO adventures (id, character_id, status, data, updated_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'))",
            params![
                adventure.id.to_string(),
                adventure.character_id.to_string(),
                status_label(adventure.status),
                encode(adventure)?,
            ],
        )?;
        Ok(())
    }

    fn delete_adventure(&self, id: AdventureId) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM adventures WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }

    fn ongoing_adventures_for(&self, character: CharacterId) -> Result<Vec<Adventure>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT data FROM adventures
             WHERE character_id = ?1 AND status = 'ongoing'",
        )?;
        let rows = stmt.query_map(params![character.to_string()], |row| {
            row.get::<_, Vec<u8>>(0)
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(decode(&row?)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use wayfarer_core::graph::{StoryGraph, StoryNode};
    use wayfarer_core::types::{CharacterState, UserId};

    fn blank_adventure(character: CharacterId) -> Adventure {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "start".to_string(),
            StoryNode::Ending {
                situation: "Placeholder.".into(),
                outcome: "Placeholder.".into(),
            },
        );
        Adventure {
            id: AdventureId::new(),
            owner_uid: UserId("u1".into()),
            character_id: character,
            world_id: WorldId::new(),
            site_name: "Site".into(),
            status: AdventureStatus::Ongoing,
            character_state: CharacterState::fresh(vec![]),
            history: vec![],
            story_graph: StoryGraph {
                start_node: "start".into(),
                nodes,
            },
            current_node_key: "start".into(),
            combat_state: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn check_round_trip(store: &impl GameStore) {
        let character = CharacterId::new();
        let adventure = blank_adventure(character);
        store.put_adventure(&adventure).unwrap();

        let loaded = store.adventure(adventure.id).unwrap().unwrap();
        assert_eq!(loaded.id, adventure.id);
        assert_eq!(loaded.site_name, "Site");

        let ongoing = store.ongoing_adventures_for(character).unwrap();
        assert_eq!(ongoing.len(), 1);

        let mut finished = adventure.clone();
        finished.status = AdventureStatus::Finished;
        store.put_adventure(&finished).unwrap();
        assert!(store.ongoing_adventures_for(character).unwrap().is_empty());

        store.delete_adventure(adventure.id).unwrap();
        assert!(store.adventure(adventure.id).unwrap().is_none());
        // deleting again is a no-op
        store.delete_adventure(adventure.id).unwrap();
    }

    #[test]
    fn memory_store_round_trip() {
        check_round_trip(&MemoryStore::new());
    }

    #[test]
    fn sqlite_store_round_trip() {
        check_round_trip(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wayfarer.db");
        let character = CharacterId::new();
        let adventure = blank_adventure(character);
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put_adventure(&adventure).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.adventure(adventure.id).unwrap().unwrap();
        assert_eq!(loaded.character_id, character);
    }

    #[test]
    fn status_column_tracks_document_status() {
        let store = SqliteStore::open_in_memory().unwrap();
        let character = CharacterId::new();
        let mut adventure = blank_adventure(character);
        store.put_adventure(&adventure).unwrap();
        assert_eq!(store.ongoing_adventures_for(character).unwrap().len(), 1);

        adventure.status = AdventureStatus::Fled;
        store.put_adventure(&adventure).unwrap();
        assert!(store.ongoing_adventures_for(character).unwrap().is_empty());
    }
}
