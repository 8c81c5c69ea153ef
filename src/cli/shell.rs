//! Line commands understood by the interactive reader.
//!
//! Row numbers are 1-based on input and 0-based once parsed.

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::SettingsDraft;
use crate::errors::{FeederError, FeederResult};

pub const HELP: &str = "\
Commands:
  list                      show the current entries
  refresh                   fetch all feeds now
  toggle <n>...             select/unselect rows
  delete                    remove selected rows from the list
  save                      save selected rows to the database
  export txt|md [path]      export selected rows
  open <n>                  open a row's link in the browser
  settings                  show settings
  set <field> <value>       days, font_size, refresh_interval, dark_mode
  feed add <url>            add a feed
  feed remove <n>           remove the n-th feed
  help                      show this help
  quit                      exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PlainText,
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::Markdown => "md",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = FeederError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::PlainText),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            _ => Err(FeederError::InvalidInput(format!("Unknown export format: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Days,
    FontSize,
    RefreshInterval,
    DarkMode,
}

impl SettingField {
    /// Write `value` into the matching draft field; numbers are checked later by validation.
    pub fn apply(&self, draft: &mut SettingsDraft, value: &str) -> FeederResult<()> {
        match self {
            SettingField::Days => draft.days = value.to_string(),
            SettingField::FontSize => draft.font_size = value.to_string(),
            SettingField::RefreshInterval => draft.refresh_interval = value.to_string(),
            SettingField::DarkMode => draft.dark_mode = parse_bool(value)?,
        }
        Ok(())
    }
}

impl FromStr for SettingField {
    type Err = FeederError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "days" => Ok(SettingField::Days),
            "font_size" => Ok(SettingField::FontSize),
            "refresh_interval" | "interval" => Ok(SettingField::RefreshInterval),
            "dark_mode" => Ok(SettingField::DarkMode),
            _ => Err(FeederError::InvalidInput(format!("Unknown setting: {}", s))),
        }
    }
}

fn parse_bool(value: &str) -> FeederResult<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(FeederError::InvalidInput(format!(
            "Expected on/off for dark_mode, got '{}'",
            value
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Refresh,
    Toggle(Vec<usize>),
    Delete,
    Save,
    Export {
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    Open(usize),
    Settings,
    Set {
        field: SettingField,
        value: String,
    },
    AddFeed(String),
    RemoveFeed(usize),
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = FeederError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // The export path is the rest of the line and may contain spaces.
        let (head, rest) = split_word(line);
        if head == "export" {
            let (format, path) = split_word(rest);
            if !format.is_empty() {
                return Ok(ShellCommand::Export {
                    format: format.parse()?,
                    path: (!path.is_empty()).then(|| PathBuf::from(path)),
                });
            }
        }

        let words: Vec<&str> = line.split_whitespace().collect();

        let command = match words.as_slice() {
            ["list" | "ls"] => ShellCommand::List,
            ["refresh" | "r"] => ShellCommand::Refresh,
            ["toggle" | "t", rows @ ..] if !rows.is_empty() => ShellCommand::Toggle(
                rows.iter()
                    .map(|row| parse_row(row))
                    .collect::<FeederResult<_>>()?,
            ),
            ["delete"] => ShellCommand::Delete,
            ["save"] => ShellCommand::Save,
            ["open" | "o", row] => ShellCommand::Open(parse_row(row)?),
            ["settings"] => ShellCommand::Settings,
            ["set", field, value] => ShellCommand::Set {
                field: field.parse()?,
                value: value.to_string(),
            },
            ["feed", "add", url] => ShellCommand::AddFeed(url.to_string()),
            ["feed", "remove", row] => ShellCommand::RemoveFeed(parse_row(row)?),
            ["help" | "?"] => ShellCommand::Help,
            ["quit" | "exit" | "q"] => ShellCommand::Quit,
            _ => {
                return Err(FeederError::InvalidInput(format!(
                    "Unknown command: '{}' (type 'help')",
                    line.trim()
                )))
            }
        };

        Ok(command)
    }
}

/// First whitespace-separated word and the trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn parse_row(raw: &str) -> FeederResult<usize> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(FeederError::InvalidInput(format!("Invalid row number: {}", raw))),
    }
}
