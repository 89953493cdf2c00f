use crate::error::{QueryError, Result};
use hawker_types::{Snapshot, TOP_K};

/// A venue name scored against the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    pub name: String,
    pub score: u32,
}

/// Symmetric, substring-tolerant similarity in 0..=100: the shorter string
/// slides over same-length windows of the longer one and the best window
/// similarity wins. Case-sensitive, matching the query as typed.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let short_chars: Vec<char> = shorter.chars().collect();
    let long_chars: Vec<char> = longer.chars().collect();

    if short_chars.is_empty() {
        return if long_chars.is_empty() { 100 } else { 0 };
    }

    let mut best = 0.0_f64;
    for start in 0..=(long_chars.len() - short_chars.len()) {
        let window: String = long_chars[start..start + short_chars.len()].iter().collect();
        let similarity = strsim::normalized_levenshtein(shorter, &window);
        if similarity > best {
            best = similarity;
            if best >= 1.0 {
                break;
            }
        }
    }

    (best * 100.0).round() as u32
}

/// Fuzzy name search over the venue table.
pub struct NameMatcher {
    limit: usize,
}

impl NameMatcher {
    pub fn new() -> Self {
        Self { limit: TOP_K }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    /// Score every venue name against the query and return the top matches,
    /// descending by score with venue name ascending as the tie-break.
    pub fn search(&self, snapshot: &Snapshot, query: &str) -> Result<Vec<NameMatch>> {
        if query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let mut scored: Vec<NameMatch> = snapshot
            .venues()
            .iter()
            .map(|venue| NameMatch {
                name: venue.name.clone(),
                score: partial_ratio(&venue.name, query),
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        scored.truncate(self.limit);

        log::debug!("Name search '{}': {} matches returned", query, scored.len());

        Ok(scored)
    }
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hawker_types::{CleaningWindow, Venue};
    use pretty_assertions::assert_eq;

    fn venue(name: &str) -> Venue {
        let day = NaiveDate::from_ymd_opt(1990, 1, 14).expect("valid date");
        Venue {
            name: name.to_string(),
            address: String::new(),
            description: String::new(),
            photo_url: String::new(),
            map_url: String::new(),
            status: "Existing".to_string(),
            latitude: 1.3,
            longitude: 103.8,
            cleaning: [CleaningWindow::new(day, day); 4],
        }
    }

    fn snapshot(names: &[&str]) -> Snapshot {
        Snapshot::new(names.iter().map(|name| venue(name)).collect(), Vec::new())
    }

    #[test]
    fn exact_substring_scores_full_marks() {
        assert_eq!(partial_ratio("bedok", "Bedok Food Centre"), 100);
        assert_eq!(partial_ratio("Bedok Food Centre", "Bedok"), 100);
    }

    #[test]
    fn ratio_is_symmetric() {
        let left = partial_ratio("west coast drive", "West Coast Drive Blk 502");
        let right = partial_ratio("West Coast Drive Blk 502", "west coast drive");
        assert_eq!(left, right);
    }

    #[test]
    fn empty_strings_do_not_panic() {
        assert_eq!(partial_ratio("", ""), 100);
        assert_eq!(partial_ratio("", "Bedok"), 0);
    }

    #[test]
    fn best_substring_match_ranks_first() {
        let snapshot = snapshot(&[
            "Adam Road Food Centre",
            "Bedok Food Centre",
            "Zion Riverside Food Centre",
        ]);

        let matches = NameMatcher::new()
            .search(&snapshot, "Bedok")
            .expect("search");

        assert_eq!(matches[0].name, "Bedok Food Centre");
        assert_eq!(matches[0].score, 100);
    }

    #[test]
    fn ranking_is_deterministic_under_rerun() {
        let snapshot = snapshot(&[
            "Commonwealth Crescent Market",
            "Bedok Food Centre",
            "Adam Road Food Centre",
            "Zion Riverside Food Centre",
        ]);
        let matcher = NameMatcher::new();

        let first = matcher.search(&snapshot, "food centre").expect("search");
        let second = matcher.search(&snapshot, "food centre").expect("search");

        assert_eq!(first, second);
    }

    #[test]
    fn ties_break_by_name_ascending() {
        // Identical names except for a prefix letter; both score the same
        // against a query that is a substring of each.
        let snapshot = snapshot(&["B Food Court", "A Food Court"]);

        let matches = NameMatcher::new()
            .search(&snapshot, "Food Court")
            .expect("search");

        assert_eq!(matches[0].name, "A Food Court");
        assert_eq!(matches[1].name, "B Food Court");
        assert_eq!(matches[0].score, matches[1].score);
    }

    #[test]
    fn results_truncate_to_limit() {
        let names: Vec<String> = (0..25).map(|i| format!("Centre {i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let snapshot = snapshot(&refs);

        let matches = NameMatcher::new().search(&snapshot, "Centre").expect("search");

        assert_eq!(matches.len(), TOP_K);
    }

    #[test]
    fn empty_query_is_rejected() {
        let snapshot = snapshot(&["Bedok Food Centre"]);
        let result = NameMatcher::new().search(&snapshot, "   ");
        assert!(matches!(result, Err(QueryError::EmptyQuery)));
    }
}
