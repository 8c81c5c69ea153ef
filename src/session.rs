//! State owned by the interactive thread.
//!
//! [`Session`] holds the settings, the entry list on display and the
//! current selection. Everything that mutates them goes through here, on
//! one thread; refresh workers only hand over finished reports.

use std::path::Path;

use tracing::info;

use crate::config::{Settings, SettingsDraft, SettingsStore};
use crate::domain::{EntryId, EntryList, ListedEntry};
use crate::errors::{FeederError, FeederResult};
use crate::services::export;
use crate::services::{AggregationReport, FetchFailure, SelectedEntry, Selection};
use crate::storage::EntryRepository;

pub struct Session<R: EntryRepository> {
    settings: Settings,
    settings_store: SettingsStore,
    entries: EntryList,
    selection: Selection,
    repository: R,
}

impl<R: EntryRepository> Session<R> {
    pub fn new(settings_store: SettingsStore, settings: Settings, repository: R) -> Self {
        Self {
            settings,
            settings_store,
            entries: EntryList::default(),
            selection: Selection::new(),
            repository,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the entry list wholesale with a fresh report. Clears the
    /// selection and hands back the feeds that failed.
    pub fn install(&mut self, report: AggregationReport) -> Vec<FetchFailure> {
        self.entries = EntryList::new(report.entries);
        self.selection.clear();
        report.failures
    }

    pub fn toggle(&mut self, id: EntryId) -> FeederResult<bool> {
        if !self.entries.contains(&id) {
            return Err(FeederError::EntryNotFound(id.to_string()));
        }
        Ok(self.selection.toggle(id))
    }

    pub fn toggle_at(&mut self, position: usize) -> FeederResult<bool> {
        let id = self.row(position)?.id.clone();
        self.toggle(id)
    }

    pub fn is_selected(&self, position: usize) -> bool {
        self.entries
            .get(position)
            .is_some_and(|row| self.selection.contains(&row.id))
    }

    /// Selected entries in selection order.
    pub fn selected(&self) -> Vec<SelectedEntry> {
        self.selection.resolve(&self.entries)
    }

    /// Remove the selected rows from view. The entry store is not touched.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.entries.remove(self.selection.ids());
        self.selection.clear();
        removed
    }

    pub fn save_selected(&self) -> FeederResult<usize> {
        let saved = export::persist_selected(&self.selected(), &self.repository)?;
        info!(saved, "saved selected entries");
        Ok(saved)
    }

    pub fn export_plain_text(&self, path: &Path) -> FeederResult<usize> {
        let selected = self.selected();
        export::export_plain_text(&selected, path)?;
        Ok(selected.len())
    }

    pub fn export_markdown(&self, path: &Path) -> FeederResult<usize> {
        let selected = self.selected();
        export::export_markdown(&selected, path)?;
        Ok(selected.len())
    }

    pub fn draft(&self) -> SettingsDraft {
        SettingsDraft::from_settings(&self.settings)
    }

    /// Validate and persist `draft`. On failure the current settings stay in effect.
    pub fn update_settings(&mut self, draft: &SettingsDraft) -> FeederResult<()> {
        self.settings_store.apply(&mut self.settings, draft)
    }

    pub fn open_link(&self, position: usize) -> FeederResult<()> {
        let row = self.row(position)?;
        open::that(&row.entry.link)?;
        Ok(())
    }

    fn row(&self, position: usize) -> FeederResult<&ListedEntry> {
        self.entries
            .get(position)
            .ok_or_else(|| FeederError::EntryNotFound(format!("row {}", position + 1)))
    }
}
