//! Entry lifetime calculation

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Lifetime for an entry whose incident ends at `end`
///
/// Unknown end → `default_ttl`. An end already passed → `min_ttl`. A future
/// end keeps its remaining time, capped at `default_ttl`.
pub fn calculate_ttl(
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    min_ttl: Duration,
    default_ttl: Duration,
) -> Duration {
    let Some(end) = end else {
        return default_ttl;
    };

    match (end - now).to_std() {
        Ok(remaining) if !remaining.is_zero() => remaining.min(default_ttl),
        _ => min_ttl,
    }
}
