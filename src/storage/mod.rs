pub mod traits;
pub mod sqlite;

pub use traits::EntryRepository;
pub use sqlite::{SqliteStorage, SqliteEntryRepository};

#[cfg(test)]
pub use traits::MockEntryRepository;
