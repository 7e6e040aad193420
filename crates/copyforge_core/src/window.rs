//! Usage-window arithmetic.
//!
//! A principal's usage window is anchored at a fixed instant and recurs with
//! a fixed length. Window boundaries are a deterministic function of wall
//! clock and anchor, never of request arrival order, so rollover can be
//! recomputed concurrently and always lands on the same result.

use chrono::{DateTime, Duration, Utc};

/// Convert a configured window length in days to a duration.
pub fn window_from_days(days: u32) -> Duration {
    Duration::days(i64::from(days))
}

/// Advance a window anchor past all fully elapsed windows.
///
/// Returns the anchor unchanged while the current window is still open.
/// Otherwise the anchor moves forward by every whole window length that has
/// elapsed, so a principal returning after months of inactivity lands at the
/// start of the window containing `now`, not one window past the stale
/// anchor.
///
/// The computation is idempotent: re-running it with the same `now` yields
/// the same anchor.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use copyforge_core::advance_anchor;
///
/// let anchor = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
/// let advanced = advance_anchor(anchor, Duration::days(30), now);
/// assert_eq!(advanced, anchor + Duration::days(60));
/// ```
pub fn advance_anchor(
    anchor: DateTime<Utc>,
    window: Duration,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if window <= Duration::zero() {
        return anchor;
    }
    let elapsed = now.signed_duration_since(anchor);
    if elapsed < window {
        return anchor;
    }
    let periods = elapsed.num_seconds().div_euclid(window.num_seconds());
    anchor + Duration::seconds(periods * window.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn anchor_unchanged_within_open_window() {
        let anchor = at(2025, 6, 1);
        assert_eq!(
            advance_anchor(anchor, Duration::days(30), at(2025, 6, 20)),
            anchor
        );
    }

    #[test]
    fn anchor_advances_by_whole_windows_only() {
        let anchor = at(2025, 1, 1);
        // 74 days elapsed with a 30-day window: two whole windows.
        let advanced = advance_anchor(anchor, Duration::days(30), at(2025, 3, 16));
        assert_eq!(advanced, anchor + Duration::days(60));
    }

    #[test]
    fn advancing_twice_is_idempotent() {
        let anchor = at(2025, 1, 1);
        let now = at(2025, 5, 9);
        let once = advance_anchor(anchor, Duration::days(30), now);
        let twice = advance_anchor(once, Duration::days(30), now);
        assert_eq!(once, twice);
    }

    #[test]
    fn future_anchor_is_left_alone() {
        let anchor = at(2025, 12, 1);
        assert_eq!(
            advance_anchor(anchor, Duration::days(30), at(2025, 6, 1)),
            anchor
        );
    }
}
