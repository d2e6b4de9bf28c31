use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The query algorithms that report statistics.
///
/// `Display` yields the short names used for export files and headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    LinearScan,
    GridKnn,
    NaiveJoin,
    PbsmJoin,
    Skyline,
}

impl Algorithm {
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::LinearScan => "Linear Scan",
            Algorithm::GridKnn => "k-NN",
            Algorithm::NaiveJoin => "Naive",
            Algorithm::PbsmJoin => "PBSM",
            Algorithm::Skyline => "Skyline",
        }
    }

    pub const fn is_join(self) -> bool {
        matches!(self, Algorithm::NaiveJoin | Algorithm::PbsmJoin)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters collected while a query runs.
///
/// Purely observational: nothing in here feeds back into results. The
/// `Display` impl renders the human-readable statistics string handed to the
/// presentation layer, listing only the counters the algorithm maintains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStats {
    pub algorithm: Algorithm,
    /// Number of results returned
    pub results: usize,
    /// Distance computations or pairwise intersection tests
    pub comparisons: u64,
    /// Grid cells examined
    pub cells_visited: u64,
    /// Grid cells skipped as a whole (skyline)
    pub cells_pruned: u64,
    /// Ring expansions performed (grid k-NN)
    pub rings: u64,
    /// Intersecting pairs found before duplicate elimination (PBSM)
    pub candidate_pairs: u64,
    /// Pairs rediscovered in a non-owner cell and dropped (PBSM)
    pub duplicates_suppressed: u64,
    /// Candidates discarded without a dominance comparison (skyline)
    pub candidates_pruned: u64,
    /// Candidates checked against the running skyline (skyline)
    pub candidates_compared: u64,
    /// Individual dominance tests performed (skyline)
    pub dominance_tests: u64,
    pub elapsed: Duration,
    /// Warning-class conditions, e.g. fewer results than requested
    pub notes: Vec<String>,
}

impl QueryStats {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            results: 0,
            comparisons: 0,
            cells_visited: 0,
            cells_pruned: 0,
            rings: 0,
            candidate_pairs: 0,
            duplicates_suppressed: 0,
            candidates_pruned: 0,
            candidates_compared: 0,
            dominance_tests: 0,
            elapsed: Duration::ZERO,
            notes: Vec::new(),
        }
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }

    fn counters(&self) -> Vec<(&'static str, u64)> {
        match self.algorithm {
            Algorithm::LinearScan => vec![("comparisons", self.comparisons)],
            Algorithm::GridKnn => vec![
                ("cells visited", self.cells_visited),
                ("rings expanded", self.rings),
                ("comparisons", self.comparisons),
            ],
            Algorithm::NaiveJoin => vec![("comparisons", self.comparisons)],
            Algorithm::PbsmJoin => vec![
                ("cells processed", self.cells_visited),
                ("local comparisons", self.comparisons),
                ("candidate pairs", self.candidate_pairs),
                ("duplicates suppressed", self.duplicates_suppressed),
            ],
            Algorithm::Skyline => vec![
                ("cells visited", self.cells_visited),
                ("cells pruned", self.cells_pruned),
                ("candidates pruned", self.candidates_pruned),
                ("candidates compared", self.candidates_compared),
                ("dominance tests", self.dominance_tests),
            ],
        }
    }
}

impl fmt::Display for QueryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} statistics:", self.algorithm)?;
        let results_label = if self.algorithm.is_join() {
            "pairs found"
        } else {
            "results"
        };
        writeln!(f, "  {}: {}", results_label, self.results)?;
        for (name, value) in self.counters() {
            writeln!(f, "  {}: {}", name, value)?;
        }
        write!(f, "  elapsed: {:.3} ms", self.elapsed.as_secs_f64() * 1000.0)?;
        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_names() {
        assert_eq!(Algorithm::LinearScan.to_string(), "Linear Scan");
        assert_eq!(Algorithm::GridKnn.to_string(), "k-NN");
        assert_eq!(Algorithm::NaiveJoin.to_string(), "Naive");
        assert_eq!(Algorithm::PbsmJoin.to_string(), "PBSM");
        assert_eq!(Algorithm::Skyline.to_string(), "Skyline");
        assert!(Algorithm::PbsmJoin.is_join());
        assert!(!Algorithm::Skyline.is_join());
    }

    #[test]
    fn test_display_lists_algorithm_counters() {
        let mut stats = QueryStats::new(Algorithm::PbsmJoin);
        stats.results = 3;
        stats.comparisons = 12;
        stats.cells_visited = 100;
        stats.candidate_pairs = 4;
        stats.duplicates_suppressed = 1;

        let text = stats.to_string();
        assert!(text.starts_with("PBSM statistics:"));
        assert!(text.contains("pairs found: 3"));
        assert!(text.contains("local comparisons: 12"));
        assert!(text.contains("duplicates suppressed: 1"));
        assert!(!text.contains("dominance tests"));
    }

    #[test]
    fn test_display_notes() {
        let mut stats = QueryStats::new(Algorithm::LinearScan);
        assert!(!stats.has_notes());
        stats.add_note("only 2 of 5 requested neighbors available");

        let text = stats.to_string();
        assert!(stats.has_notes());
        assert!(text.ends_with("note: only 2 of 5 requested neighbors available"));
    }
}
