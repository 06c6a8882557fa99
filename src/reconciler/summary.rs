use std::fmt;

/// What happened to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    HomeUpdated,
    ComparisonAppended,
    ComparisonUpdated,
    Unchanged,
}

/// Per-run counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub created: usize,
    pub home_updated: usize,
    pub comparison_appended: usize,
    pub comparison_updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub dropped: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::HomeUpdated => self.home_updated += 1,
            Outcome::ComparisonAppended => self.comparison_appended += 1,
            Outcome::ComparisonUpdated => self.comparison_updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.created
            + self.home_updated
            + self.comparison_appended
            + self.comparison_updated
            + self.unchanged
            + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed: {} created, {} updated, {} compared, {} comparison updates, {} unchanged, {} failed, {} dropped",
            self.processed(),
            self.created,
            self.home_updated,
            self.comparison_appended,
            self.comparison_updated,
            self.unchanged,
            self.failed,
            self.dropped,
        )
    }
}
