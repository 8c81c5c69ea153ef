use std::collections::{HashMap, HashSet};

use super::{Entry, EntryId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub id: EntryId,
    pub entry: Entry,
}

/// The entry sequence currently on display, each row carrying a stable id.
#[derive(Debug, Clone, Default)]
pub struct EntryList {
    rows: Vec<ListedEntry>,
}

impl EntryList {
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut seen: HashMap<(String, String, String, String), u32> = HashMap::new();

        let rows = entries
            .into_iter()
            .map(|entry| {
                let key = (
                    entry.title.clone(),
                    entry.link.clone(),
                    entry.published_for_store(),
                    entry.source_feed.clone(),
                );
                let ordinal = seen.entry(key).or_insert(0);
                let id = EntryId::generate(&entry, *ordinal);
                *ordinal += 1;
                ListedEntry { id, entry }
            })
            .collect();

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListedEntry> {
        self.rows.iter()
    }

    pub fn get(&self, position: usize) -> Option<&ListedEntry> {
        self.rows.get(position)
    }

    pub fn position(&self, id: &EntryId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.position(id).is_some()
    }

    /// Drop every row whose id is in `ids`, keeping the others in order.
    pub fn remove(&mut self, ids: &[EntryId]) -> usize {
        let doomed: HashSet<&EntryId> = ids.iter().collect();
        let before = self.rows.len();
        self.rows.retain(|row| !doomed.contains(&row.id));
        before - self.rows.len()
    }
}
