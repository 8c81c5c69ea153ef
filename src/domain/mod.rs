pub mod entry;
pub mod entry_list;
pub mod retention;

pub use entry::{Entry, EntryId, RawItem};
pub use entry_list::{EntryList, ListedEntry};
pub use retention::RetentionWindow;
