//! Bounded, append-only log streams.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// Tag carried by every log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Event,
    State,
    Visual,
    VisualBug,
    Performance,
    Objects,
    Lighting,
    LightingBug,
    Renderer,
    Historical,
    Collision,
    Summary,
    Error,
    MazeDebug,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Event => "EVENT",
            Category::State => "STATE",
            Category::Visual => "VISUAL",
            Category::VisualBug => "VISUAL BUG",
            Category::Performance => "PERFORMANCE",
            Category::Objects => "OBJECTS",
            Category::Lighting => "LIGHTING",
            Category::LightingBug => "LIGHTING BUG",
            Category::Renderer => "RENDERER",
            Category::Historical => "HISTORICAL",
            Category::Collision => "COLLISION",
            Category::Summary => "SUMMARY",
            Category::Error => "ERROR",
            Category::MazeDebug => "MAZE_DEBUG",
        }
    }

    /// Categories that always indicate a detected problem.
    pub fn is_anomaly(self) -> bool {
        matches!(self, Category::VisualBug | Category::LightingBug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Position in the stream's push order, starting at 1.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub message: String,
}

/// Renders as `[2024-05-01T12:00:00.000Z] [CATEGORY] message`.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.category,
            self.message
        )
    }
}

/// A named ring buffer of entries plus a one-time baseline snapshot.
///
/// Pushing beyond `capacity` evicts the oldest entry; order is always push order.
/// A capacity of zero behaves as one.
#[derive(Debug, Clone)]
pub struct LogStream {
    name: &'static str,
    capacity: usize,
    entries: VecDeque<LogEntry>,
    pushed: u64,
    baseline: Option<Vec<LogEntry>>,
}

impl LogStream {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
            pushed: 0,
            baseline: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total entries ever pushed, evicted ones included.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Appends an entry stamped with the current time.
    pub fn push(&mut self, category: Category, message: impl Into<String>) -> &LogEntry {
        self.push_at(Utc::now(), category, message)
    }

    pub fn push_at(
        &mut self,
        timestamp: DateTime<Utc>,
        category: Category,
        message: impl Into<String>,
    ) -> &LogEntry {
        while self.entries.len() >= self.capacity.max(1) {
            self.entries.pop_front();
        }
        self.pushed += 1;
        self.entries.push_back(LogEntry {
            seq: self.pushed,
            timestamp,
            category,
            message: message.into(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// The most recent `n` entries, oldest first.
    pub fn last(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// Entries in `start..end`, clamped to the stream length.
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = &LogEntry> {
        let end = end.min(self.entries.len());
        let start = start.min(end);
        self.entries.range(start..end)
    }

    pub fn count(&self, category: Category) -> usize {
        self.entries.iter().filter(|e| e.category == category).count()
    }

    /// Captures the last `window` entries as the baseline, once.
    ///
    /// Returns `true` when this call captured it.
    pub fn capture_baseline(&mut self, window: usize) -> bool {
        if self.baseline.is_some() {
            return false;
        }
        self.baseline = Some(self.last(window).cloned().collect());
        true
    }

    pub fn baseline(&self) -> Option<&[LogEntry]> {
        self.baseline.as_deref()
    }

    /// Newline-joined text of the whole stream.
    pub fn to_text(&self) -> String {
        join_lines(self.entries.iter())
    }
}

/// Joins entries into one newline-separated text blob.
pub fn join_lines<'a>(entries: impl Iterator<Item = &'a LogEntry>) -> String {
    entries
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
