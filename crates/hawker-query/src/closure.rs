use chrono::{Datelike, Duration, NaiveDate};
use hawker_types::{CleaningWindow, Snapshot};

/// Inclusive date range a closure query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryWindow {
    /// Window covering a single day.
    pub fn day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// [today, today + 1 week].
    pub fn this_week(today: NaiveDate) -> Self {
        Self::weeks(today, 0, 1)
    }

    /// [today + 1 week, today + 2 weeks].
    pub fn next_week(today: NaiveDate) -> Self {
        Self::weeks(today, 1, 2)
    }

    fn weeks(today: NaiveDate, start_week: i64, end_week: i64) -> Self {
        Self {
            start: today + Duration::weeks(start_week),
            end: today + Duration::weeks(end_week),
        }
    }
}

/// Calendar quarter of a date, 1..=4.
pub fn quarter_of(day: NaiveDate) -> u32 {
    (day.month() - 1) / 3 + 1
}

/// A venue under cleaning, with the window it is closed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningEntry {
    pub name: String,
    pub window: CleaningWindow,
}

/// A permanently closed venue and its status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedEntry {
    pub name: String,
    pub status: String,
}

/// Closure state of every venue for one query window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosureReport {
    pub cleaning: Vec<CleaningEntry>,
    pub closed: Vec<ClosedEntry>,
}

impl ClosureReport {
    pub fn is_empty(&self) -> bool {
        self.cleaning.is_empty() && self.closed.is_empty()
    }

    pub fn cleaning_for(&self, name: &str) -> Option<&CleaningEntry> {
        self.cleaning.iter().find(|entry| entry.name == name)
    }

    pub fn closed_for(&self, name: &str) -> Option<&ClosedEntry> {
        self.closed.iter().find(|entry| entry.name == name)
    }
}

/// Evaluates which venues are closed for cleaning within a query window and
/// which are permanently closed.
pub struct ClosureEvaluator;

impl ClosureEvaluator {
    /// Test every venue's four quarterly windows against the query window
    /// and union the overlaps. A venue overlapping in more than one quarter
    /// is reported once, with its earliest overlapping window. Permanent
    /// closure is independent of any date logic.
    pub fn evaluate(snapshot: &Snapshot, window: QueryWindow) -> ClosureReport {
        let mut report = ClosureReport::default();

        for venue in snapshot.venues() {
            let overlapping = venue
                .cleaning
                .iter()
                .filter(|cleaning| cleaning.overlaps(window.start, window.end))
                .min_by_key(|cleaning| cleaning.start);

            if let Some(&cleaning) = overlapping {
                report.cleaning.push(CleaningEntry {
                    name: venue.name.clone(),
                    window: cleaning,
                });
            }

            if venue.not_existing() {
                report.closed.push(ClosedEntry {
                    name: venue.name.clone(),
                    status: venue.status.clone(),
                });
            }
        }

        log::debug!(
            "Closure report for {}..{}: {} cleaning, {} closed",
            window.start,
            window.end,
            report.cleaning.len(),
            report.closed.len()
        );

        report
    }
}
