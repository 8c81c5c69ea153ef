mod connection;
mod entry_repository;

pub use connection::SqliteStorage;
pub use entry_repository::SqliteEntryRepository;
