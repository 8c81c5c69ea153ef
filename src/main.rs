use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedshelf::cli::shell::HELP;
use feedshelf::cli::{Cli, Commands, ExportFormat, ShellCommand};
use feedshelf::config::{Config, Settings, SettingsStore};
use feedshelf::domain::RetentionWindow;
use feedshelf::errors::FeederResult;
use feedshelf::scheduler::{RefreshScheduler, TriggerOutcome};
use feedshelf::services::export::default_export_filename;
use feedshelf::services::{AggregationReport, Aggregator, FetchFailure};
use feedshelf::session::Session;
use feedshelf::sources::RssAtomSource;
use feedshelf::storage::{EntryRepository, SqliteEntryRepository, SqliteStorage};

/// Everything the interactive loop reacts to.
enum AppEvent {
    Refreshed(AggregationReport),
    Input(String),
    InputClosed,
}

impl From<AggregationReport> for AppEvent {
    fn from(report: AggregationReport) -> Self {
        AppEvent::Refreshed(report)
    }
}

enum Flow {
    Continue,
    Quit,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("loading configuration")?;

    let settings_store = SettingsStore::new(&config.settings_path);
    let settings = settings_store
        .load()
        .with_context(|| format!("loading settings from {}", config.settings_path.display()))?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Settings => cmd_settings(&settings)?,
        Commands::Fetch => cmd_fetch(&config, &settings)?,
        Commands::Run => cmd_run(&config, settings_store, settings)?,
    }

    Ok(())
}

fn aggregator(config: &Config) -> anyhow::Result<Aggregator> {
    let source = RssAtomSource::new(config.fetch_timeout).context("building HTTP client")?;
    Ok(Aggregator::new(Arc::new(source)))
}

fn cmd_settings(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

fn cmd_fetch(config: &Config, settings: &Settings) -> anyhow::Result<()> {
    let now = Utc::now();
    let window = RetentionWindow::new(now, settings.days);
    let report = aggregator(config)?.aggregate(&settings.feeds, window, now);

    print_failures(&report.failures);

    if report.entries.is_empty() {
        println!("No entries in the last {} days.", settings.days);
        return Ok(());
    }

    for (i, entry) in report.entries.iter().enumerate() {
        println!("{:>4}. {}", i + 1, entry.display_line());
        println!("      {}", entry.link);
    }

    Ok(())
}

fn cmd_run(config: &Config, settings_store: SettingsStore, settings: Settings) -> anyhow::Result<()> {
    let storage = SqliteStorage::new(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    let repo = SqliteEntryRepository::new(storage);
    let mut session = Session::new(settings_store, settings, repo);

    let (tx, rx) = mpsc::channel::<AppEvent>();
    spawn_input_reader(tx.clone());

    let mut scheduler = RefreshScheduler::new(aggregator(config)?, tx);
    scheduler.trigger(session.settings());
    println!("Refreshing feeds... (type 'help' for commands)");

    loop {
        let received = match scheduler.wake_after(Instant::now()) {
            Some(wait) => rx.recv_timeout(wait),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let event = match received {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                scheduler.poll(session.settings(), Instant::now());
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match event {
            AppEvent::Refreshed(report) => {
                scheduler.complete(session.settings(), Instant::now());
                let failures = session.install(report);
                print_failures(&failures);
                print_entries(&session);
            }
            AppEvent::Input(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Flow::Quit = handle_line(&line, &mut session, &mut scheduler) {
                    break;
                }
            }
            AppEvent::InputClosed => break,
        }
    }

    scheduler.shutdown();
    Ok(())
}

/// Read stdin on a helper thread so the interactive loop only ever waits on one channel.
fn spawn_input_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(AppEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

fn handle_line<R: EntryRepository>(
    line: &str,
    session: &mut Session<R>,
    scheduler: &mut RefreshScheduler<AppEvent>,
) -> Flow {
    let command = match line.parse::<ShellCommand>() {
        Ok(command) => command,
        Err(e) => {
            println!("{}", e);
            return Flow::Continue;
        }
    };

    if let ShellCommand::Quit = command {
        return Flow::Quit;
    }

    if let Err(e) = execute(command, session, scheduler) {
        println!("Error: {}", e);
    }
    let _ = io::stdout().flush();

    Flow::Continue
}

fn execute<R: EntryRepository>(
    command: ShellCommand,
    session: &mut Session<R>,
    scheduler: &mut RefreshScheduler<AppEvent>,
) -> FeederResult<()> {
    match command {
        ShellCommand::List => print_entries(session),
        ShellCommand::Refresh => refresh(session, scheduler),
        ShellCommand::Toggle(rows) => {
            for row in rows {
                let selected = session.toggle_at(row)?;
                println!("{} row {}", if selected { "Selected" } else { "Unselected" }, row + 1);
            }
        }
        ShellCommand::Delete => {
            let removed = session.delete_selected();
            println!("Removed {} entries from the list.", removed);
        }
        ShellCommand::Save => {
            let saved = session.save_selected()?;
            println!("Saved {} entries to database.", saved);
        }
        ShellCommand::Export { format, path } => {
            let path = path.unwrap_or_else(|| {
                PathBuf::from(default_export_filename(Local::now(), format.extension()))
            });
            let count = match format {
                ExportFormat::PlainText => session.export_plain_text(&path)?,
                ExportFormat::Markdown => session.export_markdown(&path)?,
            };
            println!("Exported {} entries to {}.", count, path.display());
        }
        ShellCommand::Open(row) => session.open_link(row)?,
        ShellCommand::Settings => {
            let settings = session.settings();
            println!("Feeds:");
            for (i, feed) in settings.feeds.iter().enumerate() {
                println!("  {}. {}", i + 1, feed);
            }
            println!("Days to keep:      {}", settings.days);
            println!("Font size:         {}", settings.font_size);
            println!("Refresh interval:  {} min", settings.refresh_interval);
            println!("Dark mode:         {}", if settings.dark_mode { "on" } else { "off" });
        }
        ShellCommand::Set { field, value } => {
            let mut draft = session.draft();
            field.apply(&mut draft, &value)?;
            session.update_settings(&draft)?;
            println!("Settings saved.");
            refresh(session, scheduler);
        }
        ShellCommand::AddFeed(url) => {
            let mut draft = session.draft();
            draft.feeds.push(url.clone());
            session.update_settings(&draft)?;
            println!("Added feed: {}", url);
            refresh(session, scheduler);
        }
        ShellCommand::RemoveFeed(index) => {
            let mut draft = session.draft();
            if index >= draft.feeds.len() {
                println!("No feed number {}.", index + 1);
                return Ok(());
            }
            let removed = draft.feeds.remove(index);
            session.update_settings(&draft)?;
            println!("Removed feed: {}", removed);
            refresh(session, scheduler);
        }
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => {}
    }

    Ok(())
}

fn refresh<R: EntryRepository>(session: &Session<R>, scheduler: &mut RefreshScheduler<AppEvent>) {
    match scheduler.trigger(session.settings()) {
        TriggerOutcome::Started => println!("Refreshing feeds..."),
        TriggerOutcome::AlreadyRunning => println!("A refresh is already in progress."),
        TriggerOutcome::ShutDown => {}
    }
}

fn print_entries<R: EntryRepository>(session: &Session<R>) {
    let entries = session.entries();
    if entries.is_empty() {
        println!("No entries.");
        return;
    }

    for (i, row) in entries.iter().enumerate() {
        let mark = if session.is_selected(i) { "x" } else { " " };
        println!("[{}] {:>4}. {}", mark, i + 1, row.entry.display_line());
    }
}

fn print_failures(failures: &[FetchFailure]) {
    for failure in failures {
        println!("Failed to load feed: {}\n  {}", failure.url, failure.message);
    }
}
