//! Selection tracking and the two export formats.
//!
//! Plain-text export writes entries in the order they were selected.
//! Markdown export writes them in list order (ascending position),
//! whatever order they were selected in.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::info;

use crate::domain::{Entry, EntryId, EntryList};
use crate::errors::{FeederError, FeederResult};
use crate::storage::EntryRepository;

/// An entry picked by the user, with its position in the list at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEntry {
    pub position: usize,
    pub entry: Entry,
}

/// Insertion-ordered set of selected entry ids.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<EntryId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `id` is selected after the call.
    pub fn toggle(&mut self, id: EntryId) -> bool {
        match self.ids.iter().position(|selected| selected == &id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id);
                true
            }
        }
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Forget ids that no longer name a row of `list`.
    pub fn retain_existing(&mut self, list: &EntryList) {
        self.ids.retain(|id| list.contains(id));
    }

    /// Selected entries in selection order; ids missing from `list` are skipped.
    pub fn resolve(&self, list: &EntryList) -> Vec<SelectedEntry> {
        self.ids
            .iter()
            .filter_map(|id| {
                let position = list.position(id)?;
                let row = list.get(position)?;
                Some(SelectedEntry {
                    position,
                    entry: row.entry.clone(),
                })
            })
            .collect()
    }
}

pub fn write_plain_text<W: Write>(selected: &[SelectedEntry], out: &mut W) -> std::io::Result<()> {
    for item in selected {
        write!(out, "{}\n{}\n\n", item.entry.title, item.entry.link)?;
    }
    Ok(())
}

pub fn write_markdown<W: Write>(selected: &[SelectedEntry], out: &mut W) -> std::io::Result<()> {
    let mut ordered: Vec<&SelectedEntry> = selected.iter().collect();
    ordered.sort_by_key(|item| item.position);

    for item in ordered {
        writeln!(
            out,
            "- [{}]({}) - {}",
            item.entry.title,
            item.entry.link,
            item.entry.published_for_display()
        )?;
    }
    Ok(())
}

pub fn export_plain_text(selected: &[SelectedEntry], path: &Path) -> FeederResult<()> {
    write_file(path, |out| write_plain_text(selected, out))?;
    info!(path = %path.display(), count = selected.len(), "exported plain text");
    Ok(())
}

pub fn export_markdown(selected: &[SelectedEntry], path: &Path) -> FeederResult<()> {
    write_file(path, |out| write_markdown(selected, out))?;
    info!(path = %path.display(), count = selected.len(), "exported markdown");
    Ok(())
}

/// Forward each selected entry to the entry store, in selection order.
pub fn persist_selected<R: EntryRepository + ?Sized>(
    selected: &[SelectedEntry],
    repository: &R,
) -> FeederResult<usize> {
    for item in selected {
        repository.append(
            &item.entry.title,
            &item.entry.link,
            &item.entry.published_for_store(),
        )?;
    }
    Ok(selected.len())
}

/// `export_<YYYYMMDD>_<HHMMSS>.<extension>`
pub fn default_export_filename(now: DateTime<Local>, extension: &str) -> String {
    format!("{}.{}", now.format("export_%Y%m%d_%H%M%S"), extension)
}

fn write_file<F>(path: &Path, body: F) -> FeederResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let wrap = |source: std::io::Error| FeederError::Export {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    body(&mut out).map_err(wrap)?;
    out.flush().map_err(wrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockEntryRepository;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn list() -> EntryList {
        EntryList::new(vec![
            Entry::new(
                "Zero",
                "https://example.com/0",
                Utc.with_ymd_and_hms(2024, 1, 3, 10, 30, 15).unwrap(),
                "feedA",
            ),
            Entry::new(
                "One",
                "https://example.com/1",
                Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
                "feedA",
            ),
            Entry::new(
                "Two",
                "https://example.com/2",
                Utc.with_ymd_and_hms(2024, 1, 1, 8, 5, 0).unwrap(),
                "feedB",
            ),
        ])
    }

    fn select(list: &EntryList, positions: &[usize]) -> Selection {
        let mut selection = Selection::new();
        for &p in positions {
            selection.toggle(list.get(p).unwrap().id.clone());
        }
        selection
    }

    #[test]
    fn test_toggle_flips_membership() {
        let list = list();
        let id = list.get(1).unwrap().id.clone();
        let mut selection = Selection::new();

        assert!(selection.toggle(id.clone()));
        assert!(selection.contains(&id));
        assert!(!selection.toggle(id.clone()));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_resolve_keeps_selection_order() {
        let list = list();
        let selection = select(&list, &[2, 0]);

        let resolved = selection.resolve(&list);
        let positions: Vec<_> = resolved.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![2, 0]);
    }

    #[test]
    fn test_retain_existing_drops_removed_rows() {
        let mut list = list();
        let mut selection = select(&list, &[0, 2]);
        let removed = list.get(0).unwrap().id.clone();

        list.remove(&[removed]);
        selection.retain_existing(&list);

        assert_eq!(selection.len(), 1);
        let resolved = selection.resolve(&list);
        assert_eq!(resolved[0].entry.title, "Two");
        assert_eq!(resolved[0].position, 1);
    }

    #[test]
    fn test_plain_text_in_selection_order() {
        let list = list();
        let selected = select(&list, &[2, 0]).resolve(&list);

        let mut out = Vec::new();
        write_plain_text(&selected, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Two\nhttps://example.com/2\n\nZero\nhttps://example.com/0\n\n"
        );
    }

    #[test]
    fn test_plain_text_parses_back_to_title_and_link() {
        let list = list();
        let selected = select(&list, &[1, 2, 0]).resolve(&list);

        let mut out = Vec::new();
        write_plain_text(&selected, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let parsed: Vec<(&str, &str)> = text
            .split_terminator("\n\n")
            .map(|block| block.split_once('\n').unwrap())
            .collect();
        let expected: Vec<(&str, &str)> = selected
            .iter()
            .map(|s| (s.entry.title.as_str(), s.entry.link.as_str()))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_markdown_sorted_by_position() {
        let list = list();
        let selected = select(&list, &[2, 0]).resolve(&list);

        let mut out = Vec::new();
        write_markdown(&selected, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "- [Zero](https://example.com/0) - 2024-01-03 10:30\n\
             - [Two](https://example.com/2) - 2024-01-01 08:05\n"
        );
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.md");
        let list = list();
        let selected = select(&list, &[1]).resolve(&list);

        export_markdown(&selected, &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "- [One](https://example.com/1) - 2024-01-02 09:00\n"
        );
    }

    #[test]
    fn test_export_to_unwritable_path_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let list = list();
        let selected = select(&list, &[0]).resolve(&list);

        let result = export_plain_text(&selected, &path);
        assert!(matches!(result, Err(FeederError::Export { .. })));
    }

    #[test]
    fn test_persist_selected_appends_each_entry() {
        let list = list();
        let selected = select(&list, &[2, 0]).resolve(&list);

        let mut repo = MockEntryRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_append()
            .withf(|title, link, published| {
                title == "Two" && link == "https://example.com/2" && published == "2024-01-01 08:05:00"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(1));
        repo.expect_append()
            .withf(|title, link, published| {
                title == "Zero" && link == "https://example.com/0" && published == "2024-01-03 10:30:15"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(2));

        assert_eq!(persist_selected(&selected, &repo).unwrap(), 2);
    }

    #[test]
    fn test_persist_selected_stops_on_error() {
        let list = list();
        let selected = select(&list, &[0, 1]).resolve(&list);

        let mut repo = MockEntryRepository::new();
        repo.expect_append()
            .times(1)
            .returning(|_, _, _| Err(FeederError::Database(rusqlite::Error::InvalidQuery)));

        assert!(persist_selected(&selected, &repo).is_err());
    }

    #[test]
    fn test_default_export_filename() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(default_export_filename(now, "md"), "export_20240309_140507.md");
    }
}
