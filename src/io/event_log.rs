use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::io::kv_store::atomic_write;

/// Size past which old entries are trimmed on the next append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Header written at the top of a new log.
const FILE_HEADER: &str = "\
<!-- repodock event log
     Failures that were absorbed instead of shown: saves that did not
     reach disk, unreadable snapshots, editor launches that fell through.
     View with: dock log
     Prune old entries: dock log prune -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    /// A save did not reach storage
    Persist,
    /// A stored snapshot could not be read
    Load,
    /// A launch strategy failed and the next one was tried
    Launch,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Persist => write!(f, "persist"),
            EventCategory::Load => write!(f, "load"),
            EventCategory::Launch => write!(f, "launch"),
        }
    }
}

impl EventCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "persist" => Some(EventCategory::Persist),
            "load" => Some(EventCategory::Load),
            "launch" => Some(EventCategory::Launch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventEntry {
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl EventEntry {
    pub fn new(category: EventCategory, description: impl Into<String>) -> Self {
        EventEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push_str("\n---\n");
        out
    }

    /// Serialize for `dock log --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }

    pub fn to_display_markdown(&self) -> String {
        self.to_markdown()
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Handle to the event log file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        EventLog {
            path: Some(path.into()),
        }
    }

    /// A log that only warns on stderr
    pub fn stderr() -> Self {
        EventLog { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an entry. Never fails; problems go to stderr.
    pub fn record(&self, entry: EventEntry) {
        let Some(path) = &self.path else {
            eprintln!("warning: {}: {}", entry.category, entry.description);
            return;
        };
        if let Err(e) = append_entry(path, &entry) {
            eprintln!("warning: could not write to event log: {}", e);
        }
    }
}

/// Default log location inside the config directory
pub fn event_log_path(config_dir: &Path) -> PathBuf {
    config_dir.join("events.log")
}

fn append_entry(path: &Path, entry: &EventEntry) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Ok(meta) = fs::metadata(path)
        && meta.len() > MAX_LOG_SIZE
    {
        let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
        if let Ok(content) = fs::read_to_string(path) {
            let trimmed = prune_entries_before(&content, &cutoff);
            if trimmed.len() < content.len() {
                atomic_write(path, trimmed.as_bytes())?;
            }
        }
    }

    let needs_header = fs::metadata(path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read entries, most recent first.
pub fn read_entries(
    path: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<EventEntry> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);

    if let Some(since_dt) = since {
        entries.retain(|e| e.timestamp >= since_dt);
    }

    // Parsed oldest-first
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }

    entries.reverse();
    entries
}

fn parse_entries(content: &str) -> Vec<EventEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        while let Some(&line) = lines.peek() {
            if !in_code_block && (line == "---" || line.starts_with("## ")) {
                if line == "---" {
                    lines.next();
                }
                break;
            }
            lines.next();

            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }

            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }

            let trimmed = line.trim();
            if let Some((key, value)) = trimmed.split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(EventEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse `<timestamp> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, EventCategory, String)> {
    let (timestamp_str, rest) = header.split_once(' ')?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);

    let rest = rest.strip_prefix('[')?;
    let (category_str, description) = rest.split_once("] ")?;
    let category = EventCategory::parse_category(category_str)?;

    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Remove entries older than `before` (default: 30 days ago), or all of them.
/// Returns the number of entries removed.
pub fn prune(path: &Path, before: Option<DateTime<Utc>>, all: bool) -> io::Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let content = fs::read_to_string(path)?;
    let original_count = parse_entries(&content).len();

    if all {
        atomic_write(path, FILE_HEADER.as_bytes())?;
        return Ok(original_count);
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let trimmed = prune_entries_before(&content, &cutoff);
    let new_count = parse_entries(&trimmed).len();
    atomic_write(path, trimmed.as_bytes())?;
    Ok(original_count - new_count)
}

/// Drop entries stamped before `cutoff`, keeping the file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current_entry = String::new();
    let mut current_timestamp: Option<DateTime<Utc>> = None;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }

        if let Some(stripped) = line.strip_prefix("## ") {
            if let Some(ts) = current_timestamp
                && ts >= *cutoff
            {
                result.push_str(&current_entry);
            }
            current_entry.clear();
            current_timestamp = parse_entry_header(stripped).map(|(ts, _, _)| ts);
        }
        current_entry.push_str(line);
        current_entry.push('\n');
    }

    if let Some(ts) = current_timestamp
        && ts >= *cutoff
    {
        result.push_str(&current_entry);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use insta::assert_snapshot;
    use tempfile::TempDir;

    fn launch_entry(desc: &str) -> EventEntry {
        EventEntry::new(EventCategory::Launch, desc)
            .field("Repository", "api")
            .field("Path", "/srv/api")
    }

    fn log_in(tmp: &TempDir) -> EventLog {
        EventLog::at(event_log_path(&tmp.path().join("repodock")))
    }

    #[test]
    fn entry_formatting() {
        let mut entry = launch_entry("could not open with Zed").body("No such file or directory");
        entry.timestamp = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        assert_snapshot!(entry.to_markdown(), @r"
        ## 2026-10-18T09:30:00Z [launch] could not open with Zed

        Repository: api
        Path: /srv/api

        ```text
        No such file or directory
        ```

        ---
        ");
    }

    #[test]
    fn record_and_read_most_recent_first() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        log.record(launch_entry("first").body("line one\nline two"));
        log.record(EventEntry::new(EventCategory::Persist, "second"));

        let entries = read_entries(log.path().unwrap(), None, None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "second");
        assert_eq!(entries[0].category, EventCategory::Persist);
        assert_eq!(entries[1].description, "first");
        assert_eq!(entries[1].body, "line one\nline two");
        assert_eq!(
            entries[1].fields,
            vec![
                ("Repository".to_string(), "api".to_string()),
                ("Path".to_string(), "/srv/api".to_string()),
            ]
        );
    }

    #[test]
    fn read_with_limit_and_since() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        for i in 0..5 {
            let mut entry = launch_entry(&format!("entry{}", i));
            entry.timestamp = Utc.with_ymd_and_hms(2026, 1, 1 + i, 0, 0, 0).unwrap();
            log.record(entry);
        }
        let path = log.path().unwrap();

        let limited = read_entries(path, Some(2), None);
        let names: Vec<&str> = limited.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(names, vec!["entry4", "entry3"]);

        let since = Utc.with_ymd_and_hms(2026, 1, 4, 0, 0, 0).unwrap();
        assert_eq!(read_entries(path, None, Some(since)).len(), 2);
    }

    #[test]
    fn missing_log_reads_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_entries(&tmp.path().join("nope.log"), None, None).is_empty());
        assert_eq!(prune(&tmp.path().join("nope.log"), None, true).unwrap(), 0);
    }

    #[test]
    fn prune_all_keeps_header() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        log.record(launch_entry("a"));
        log.record(launch_entry("b"));
        let path = log.path().unwrap();

        assert_eq!(prune(path, None, true).unwrap(), 2);
        assert!(read_entries(path, None, None).is_empty());
        assert_eq!(fs::read_to_string(path).unwrap(), FILE_HEADER);
    }

    #[test]
    fn prune_before_cutoff() {
        let tmp = TempDir::new().unwrap();
        let log = log_in(&tmp);
        let mut old = launch_entry("old");
        old.timestamp = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        log.record(old);
        log.record(launch_entry("fresh"));
        let path = log.path().unwrap();

        assert_eq!(prune(path, None, false).unwrap(), 1);
        let left = read_entries(path, None, None);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].description, "fresh");
    }

    #[test]
    fn json_shape() {
        let value = launch_entry("x").to_json();
        assert_eq!(value["category"], "launch");
        assert_eq!(value["fields"]["Repository"], "api");
    }
}
