//! Export protocol for the log streams.
//!
//! Each action produces one newline-joined text blob. The detailed stream is exported
//! in three contiguous index ranges of `ceil(len / 3)` entries; the summary stream is
//! always exported whole, and the secondary stream by depth from the newest end.

use std::fmt;
use std::str::FromStr;

use tracing::info;

use super::log_stream::join_lines;
use super::{Category, DiagnosticsEngine};

/// One third of the detailed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailedPart {
    First,
    Second,
    Third,
}

impl DetailedPart {
    /// 1-based part number.
    pub fn number(self) -> usize {
        match self {
            DetailedPart::First => 1,
            DetailedPart::Second => 2,
            DetailedPart::Third => 3,
        }
    }
}

/// The four named export actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportAction {
    Summary,
    Detailed(DetailedPart),
}

impl fmt::Display for ExportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportAction::Summary => f.write_str("summary"),
            ExportAction::Detailed(part) => write!(f, "detailed-{}", part.number()),
        }
    }
}

impl FromStr for ExportAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(ExportAction::Summary),
            "detailed-1" => Ok(ExportAction::Detailed(DetailedPart::First)),
            "detailed-2" => Ok(ExportAction::Detailed(DetailedPart::Second)),
            "detailed-3" => Ok(ExportAction::Detailed(DetailedPart::Third)),
            other => Err(format!("unknown export action: {other}")),
        }
    }
}

/// How much of the secondary stream to export, counted from the newest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDepth {
    OneThird,
    TwoThirds,
    Full,
}

impl ExportDepth {
    pub fn fraction(self) -> f32 {
        match self {
            ExportDepth::OneThird => 0.33,
            ExportDepth::TwoThirds => 0.66,
            ExportDepth::Full => 1.0,
        }
    }
}

impl DiagnosticsEngine {
    pub fn export(&mut self, action: ExportAction) -> String {
        match action {
            ExportAction::Summary => self.export_summary(),
            ExportAction::Detailed(part) => self.export_detailed(part),
        }
    }

    /// The whole summary stream.
    pub fn export_summary(&self) -> String {
        let text = self.summary.to_text();
        info!(entries = self.summary.len(), "summary log exported");
        text
    }

    /// One third of the detailed stream.
    ///
    /// Exporting the third part appends a session summary entry to the detailed
    /// stream after the text has been produced, so it shows up in later exports.
    pub fn export_detailed(&mut self, part: DetailedPart) -> String {
        let len = self.detailed.len();
        let third = len.div_ceil(3);
        let start = (part.number() - 1) * third;
        let end = part.number() * third;
        let text = join_lines(self.detailed.range(start, end));
        info!(part = part.number(), start, end = end.min(len), "detailed log exported");

        if part == DetailedPart::Third {
            let summary = format!(
                "Session Summary: {} entries, Visual Bugs: {}, Performance Warnings: {}, Collisions: {}",
                len,
                self.detailed.count(Category::VisualBug),
                self.detailed.count(Category::Performance),
                self.detailed.count(Category::Collision),
            );
            self.log(Category::Summary, summary);
        }
        text
    }

    /// The newest `floor(len * fraction)` entries of the secondary stream.
    pub fn export_secondary(&self, depth: ExportDepth) -> String {
        let len = self.secondary.len();
        let count = (len as f32 * depth.fraction()).floor() as usize;
        info!(count, depth = depth.fraction(), "secondary log exported");
        join_lines(self.secondary.last(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagnosticsConfig;

    /// Engine whose detailed stream holds the init entry plus `n - 1` numbered entries.
    fn engine_with(n: usize) -> DiagnosticsEngine {
        let mut engine = DiagnosticsEngine::new(DiagnosticsConfig::default());
        for i in 1..n {
            engine.log(Category::State, format!("entry {i}"));
        }
        engine
    }

    /// Tests that the three parts cover the stream exactly once, in order.
    #[test]
    fn test_detailed_thirds_partition() {
        let mut engine = engine_with(10);
        let first = engine.export(ExportAction::Detailed(DetailedPart::First));
        let second = engine.export(ExportAction::Detailed(DetailedPart::Second));
        let third = engine.export(ExportAction::Detailed(DetailedPart::Third));

        assert_eq!(first.lines().count(), 4);
        assert_eq!(second.lines().count(), 4);
        assert_eq!(third.lines().count(), 2);
        assert!(first.lines().next().unwrap().ends_with("Diagnostics initialized"));
        assert!(third.lines().last().unwrap().ends_with("entry 9"));
    }

    /// Tests that exporting part three appends the session summary afterwards.
    #[test]
    fn test_third_part_appends_summary() {
        let mut engine = engine_with(3);
        engine.log(Category::VisualBug, "Floor missing");
        engine.log(Category::Collision, "Collision prevented with exit");

        let text = engine.export_detailed(DetailedPart::Third);
        assert!(!text.contains("Session Summary"));
        let last = engine.detailed().iter().last().unwrap();
        assert_eq!(last.category, Category::Summary);
        assert_eq!(
            last.message,
            "Session Summary: 5 entries, Visual Bugs: 1, Performance Warnings: 0, Collisions: 1"
        );
    }

    /// Tests that the summary export is the full stream.
    #[test]
    fn test_summary_export_is_full_stream() {
        let mut engine = engine_with(1);
        engine.log_event("Window resized");
        let text = engine.export(ExportAction::Summary);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().last().unwrap().ends_with("[EVENT] Window resized"));
    }

    /// Tests secondary depth exports, including an empty result when the count rounds
    /// down to zero.
    #[test]
    fn test_secondary_depths() {
        let mut engine = engine_with(1);
        for i in 0..10 {
            engine.log_secondary(Category::MazeDebug, format!("line {i}"));
        }
        let third = engine.export_secondary(ExportDepth::OneThird);
        assert_eq!(third.lines().count(), 3);
        assert!(third.lines().next().unwrap().ends_with("line 7"));
        assert_eq!(engine.export_secondary(ExportDepth::TwoThirds).lines().count(), 6);
        assert_eq!(engine.export_secondary(ExportDepth::Full).lines().count(), 10);

        let mut sparse = engine_with(1);
        sparse.log_secondary(Category::MazeDebug, "only");
        assert_eq!(sparse.export_secondary(ExportDepth::OneThird), "");
    }

    /// Tests export action names round-trip through their text form.
    #[test]
    fn test_action_names() {
        assert_eq!(
            "detailed-2".parse::<ExportAction>(),
            Ok(ExportAction::Detailed(DetailedPart::Second))
        );
        assert_eq!(ExportAction::Summary.to_string(), "summary");
        assert!("detailed-4".parse::<ExportAction>().is_err());
    }
}
