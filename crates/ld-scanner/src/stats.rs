//! Load statistics for bulk loads and drains.
//!
//! [`LoadStats`] counts what happened to each candidate file during one pass
//! over the locale directories (or one drain of pending changes). It is
//! returned by the detector and printed by the CLI.
//!
//! # Examples
//!
//! ```
//! use ld_scanner::{LoadOutcome, LoadStats};
//!
//! let mut stats = LoadStats::default();
//! stats.record(LoadOutcome::Loaded);
//! stats.record(LoadOutcome::Skipped);
//!
//! assert_eq!(stats.candidates, 2);
//! assert_eq!(stats.loaded, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::index::LoadOutcome;

/// Counters for one load pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadStats {
    /// Number of locale directories walked.
    pub dirs: u64,
    /// Number of candidate files considered.
    pub candidates: u64,
    /// Files parsed and indexed.
    pub loaded: u64,
    /// Files that did not match the path pattern or had no parser.
    pub skipped: u64,
    /// Files that failed to read or parse.
    pub failed: u64,
    /// Previously indexed files dropped after a failure.
    pub removed: u64,
}

impl LoadStats {
    /// Counts one single-file load.
    pub fn record(&mut self, outcome: LoadOutcome) {
        self.candidates += 1;
        match outcome {
            LoadOutcome::Loaded => self.loaded += 1,
            LoadOutcome::Skipped => self.skipped += 1,
            LoadOutcome::Failed { removed } => {
                self.failed += 1;
                if removed {
                    self.removed += 1;
                }
            }
        }
    }

    /// Adds another pass's counters to this one.
    pub fn absorb(&mut self, other: Self) {
        self.dirs += other.dirs;
        self.candidates += other.candidates;
        self.loaded += other.loaded;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.removed += other.removed;
    }

    /// Returns `true` if the pass changed the index.
    #[inline]
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.loaded > 0 || self.removed > 0
    }

    /// Returns the share of locale files (loaded or failed) that parsed, as
    /// a percentage. Returns 100.0 when there were none.
    ///
    /// # Examples
    ///
    /// ```
    /// use ld_scanner::LoadStats;
    ///
    /// let stats = LoadStats { loaded: 19, failed: 1, ..Default::default() };
    /// assert!((stats.success_rate() - 95.0).abs() < 0.1);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Acceptable for statistics display
    pub fn success_rate(&self) -> f64 {
        let attempted = self.loaded + self.failed;
        if attempted == 0 {
            return 100.0;
        }

        (self.loaded as f64 / attempted as f64) * 100.0
    }
}
