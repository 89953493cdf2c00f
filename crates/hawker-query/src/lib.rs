mod closure;
mod error;
mod name_match;
mod proximity;

pub use closure::{
    quarter_of, ClosedEntry, CleaningEntry, ClosureEvaluator, ClosureReport, QueryWindow,
};
pub use error::{QueryError, Result};
pub use name_match::{partial_ratio, NameMatch, NameMatcher};
pub use proximity::{distance_km, ProximityMatch, ProximityRanker};
