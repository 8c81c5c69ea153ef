use std::fs;
use std::path::Path;

use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

fn feedshelf_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("feedshelf").unwrap();
    cmd.env("FEEDSHELF_SETTINGS_PATH", dir.join("rss_settings.json"))
        .env("FEEDSHELF_DB_PATH", dir.join("rss_entries.db"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_feed(dir: &Path) -> String {
    let recent = (Utc::now() - Duration::days(1)).to_rfc2822();
    let old = (Utc::now() - Duration::days(400)).to_rfc2822();
    let rss = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Local Feed</title>
    <link>https://example.com/</link>
    <description>fixture</description>
    <item>
      <title>Fresh Post</title>
      <link>https://example.com/fresh</link>
      <pubDate>{}</pubDate>
    </item>
    <item>
      <title>Ancient Post</title>
      <link>https://example.com/ancient</link>
      <pubDate>{}</pubDate>
    </item>
  </channel>
</rss>"#,
        recent, old
    );
    let path = dir.join("local.xml");
    fs::write(&path, rss).unwrap();
    path.to_str().unwrap().to_string()
}

fn write_settings(dir: &Path, feeds: &[&str]) {
    let settings = serde_json::json!({
        "feeds": feeds,
        "days": 30,
        "font_size": 12,
        "dark_mode": false,
        "refresh_interval": 30,
    });
    fs::write(dir.join("rss_settings.json"), settings.to_string()).unwrap();
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    feedshelf_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("settings"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_settings_creates_defaults() {
    let dir = TempDir::new().unwrap();

    feedshelf_cmd(dir.path())
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://feeds.bbci.co.uk/news/rss.xml"))
        .stdout(predicate::str::contains("\"refresh_interval\": 30"));

    assert!(dir.path().join("rss_settings.json").exists());
}

#[test]
fn test_malformed_settings_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("rss_settings.json"), "{ broken").unwrap();

    feedshelf_cmd(dir.path())
        .arg("settings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed"));

    assert_eq!(
        fs::read_to_string(dir.path().join("rss_settings.json")).unwrap(),
        "{ broken"
    );
}

#[test]
fn test_zero_refresh_interval_is_fatal() {
    let dir = TempDir::new().unwrap();
    let raw = r#"{"feeds": [], "days": 7, "font_size": 12, "dark_mode": false, "refresh_interval": 0}"#;
    fs::write(dir.path().join("rss_settings.json"), raw).unwrap();

    feedshelf_cmd(dir.path())
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refresh interval must be a whole number"));
}

#[test]
fn test_bad_timeout_env_is_rejected() {
    let dir = TempDir::new().unwrap();
    feedshelf_cmd(dir.path())
        .arg("settings")
        .env("FEEDSHELF_FETCH_TIMEOUT_SECS", "never")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FEEDSHELF_FETCH_TIMEOUT_SECS"));
}

#[test]
fn test_fetch_filters_by_retention_and_reports_failures() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(dir.path());
    write_settings(dir.path(), &["/nonexistent/feed.xml", feed.as_str()]);

    feedshelf_cmd(dir.path())
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to load feed: /nonexistent/feed.xml"))
        .stdout(predicate::str::contains("Fresh Post"))
        .stdout(predicate::str::contains("https://example.com/fresh"))
        .stdout(predicate::str::contains("Ancient Post").not());
}

#[test]
fn test_fetch_with_no_entries() {
    let dir = TempDir::new().unwrap();
    write_settings(dir.path(), &[]);

    feedshelf_cmd(dir.path())
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries in the last 30 days."));
}

mod interactive {
    use super::*;

    #[test]
    fn test_run_quits_cleanly() {
        let dir = TempDir::new().unwrap();
        let feed = write_feed(dir.path());
        write_settings(dir.path(), &[feed.as_str()]);

        feedshelf_cmd(dir.path())
            .arg("run")
            .write_stdin("quit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Refreshing feeds..."));

        assert!(dir.path().join("rss_entries.db").exists());
    }

    #[test]
    fn test_invalid_setting_is_reported_and_not_saved() {
        let dir = TempDir::new().unwrap();
        let feed = write_feed(dir.path());
        write_settings(dir.path(), &[feed.as_str()]);
        let before = fs::read_to_string(dir.path().join("rss_settings.json")).unwrap();

        feedshelf_cmd(dir.path())
            .write_stdin("set days abc\nquit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Days must be a whole number"));

        assert_eq!(
            fs::read_to_string(dir.path().join("rss_settings.json")).unwrap(),
            before
        );
    }

    #[test]
    fn test_unknown_command_is_reported() {
        let dir = TempDir::new().unwrap();
        write_settings(dir.path(), &[]);

        feedshelf_cmd(dir.path())
            .write_stdin("frobnicate\nquit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Unknown command"));
    }

    #[test]
    fn test_end_of_input_exits() {
        let dir = TempDir::new().unwrap();
        write_settings(dir.path(), &[]);

        feedshelf_cmd(dir.path())
            .write_stdin("")
            .assert()
            .success();
    }
}
