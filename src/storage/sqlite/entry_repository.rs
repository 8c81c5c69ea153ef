use tracing::debug;

use crate::errors::FeederResult;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::EntryRepository;

pub struct SqliteEntryRepository {
    storage: SqliteStorage,
}

impl SqliteEntryRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl EntryRepository for SqliteEntryRepository {
    fn append(&self, title: &str, link: &str, published: &str) -> FeederResult<i64> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO saved_entries (title, link, published) VALUES (?1, ?2, ?3)",
            (title, link, published),
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, link, "saved entry");
        Ok(id)
    }
}
