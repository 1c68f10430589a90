//! Streak and statistics engine
//!
//! Pure functions over a habit's completion timestamps plus an injected
//! reference instant. No clock access and no I/O, so every computation is
//! deterministic and safe for unlimited parallel invocation.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Length of the trailing window used for the completion rate
pub const RATE_WINDOW_DAYS: i64 = 30;

/// Derived statistics for one habit. Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub habit_id: String,
    pub habit_name: String,
    pub total_completions: usize,
    /// Percentage of the trailing 30-day window with at least one completion
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completion: Option<DateTime<Utc>>,
}

/// A habit's completion history, as supplied by the caller for an overview
#[derive(Debug, Clone)]
pub struct HabitHistory {
    pub habit_id: String,
    pub habit_name: String,
    pub timestamps: Vec<DateTime<Utc>>,
}

/// One cell of a chart timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineCell {
    pub date: NaiveDate,
    pub completed: bool,
}

/// Chart-ready per-day series for a trailing window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub cells: Vec<TimelineCell>,
    pub completed_days: u32,
    pub window_days: u32,
    pub completion_pct: f64,
}

/// Compute statistics for one habit.
///
/// Timestamps may arrive in any order; they are reduced to UTC calendar
/// dates internally. A day with several completions counts once toward
/// streaks and the completion rate.
pub fn compute_stats(
    habit_id: &str,
    habit_name: &str,
    timestamps: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> HabitStats {
    let dates: BTreeSet<NaiveDate> = timestamps.iter().map(DateTime::date_naive).collect();
    let today = now.date_naive();

    HabitStats {
        habit_id: habit_id.to_string(),
        habit_name: habit_name.to_string(),
        total_completions: timestamps.len(),
        completion_rate: completion_rate(&dates, today),
        current_streak: current_streak(&dates, today),
        longest_streak: longest_streak(&dates),
        last_completion: timestamps.iter().max().copied(),
    }
}

/// Compute statistics for a set of habits, preserving input order
pub fn compute_overview(histories: &[HabitHistory], now: DateTime<Utc>) -> Vec<HabitStats> {
    histories
        .iter()
        .map(|h| compute_stats(&h.habit_id, &h.habit_name, &h.timestamps, now))
        .collect()
}

/// Build a per-day completion series for the trailing `days` window ending
/// at `now`'s date. Exactly `days` cells, oldest first.
pub fn completion_timeline(
    timestamps: &[DateTime<Utc>],
    days: u32,
    now: DateTime<Utc>,
) -> Timeline {
    let dates: BTreeSet<NaiveDate> = timestamps.iter().map(DateTime::date_naive).collect();
    let end = now.date_naive();
    let start = end - Duration::days(i64::from(days) - 1);

    let cells: Vec<TimelineCell> = start
        .iter_days()
        .take(days as usize)
        .map(|date| TimelineCell {
            completed: dates.contains(&date),
            date,
        })
        .collect();

    let completed_days = cells.iter().filter(|c| c.completed).count() as u32;
    let completion_pct = if days == 0 {
        0.0
    } else {
        f64::from(completed_days) / f64::from(days) * 100.0
    };

    Timeline {
        cells,
        completed_days,
        window_days: days,
        completion_pct,
    }
}

/// Distinct completion days among the 30 dates ending at `today`, as a
/// percentage of the window length. The denominator is the fixed window,
/// so an empty window is 0, never a division by zero.
fn completion_rate(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> f64 {
    let window_start = today - Duration::days(RATE_WINDOW_DAYS - 1);
    let in_window = dates
        .iter()
        .filter(|d| **d >= window_start && **d <= today)
        .count();

    in_window as f64 / RATE_WINDOW_DAYS as f64 * 100.0
}

/// Walk backward from the most recent completion date. The streak is
/// current only when anchored at today or yesterday; each earlier date
/// must be exactly one day before the previous counted one.
fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut rev = dates.iter().rev();
    let Some(&anchor) = rev.next() else {
        return 0;
    };

    if anchor != today && Some(anchor) != today.pred_opt() {
        return 0;
    }

    let mut streak = 1;
    let mut expected = anchor.pred_opt();
    for &date in rev {
        if Some(date) != expected {
            break;
        }
        streak += 1;
        expected = date.pred_opt();
    }
    streak
}

/// Longest run of exactly-consecutive dates. An isolated date is a run of
/// length 1.
fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(now: DateTime<Utc>, days_ago: i64) -> DateTime<Utc> {
        now - Duration::days(days_ago)
    }

    fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let now = reference_now();
        let stats = compute_stats("h1", "Reading", &[], now);

        assert_eq!(stats.total_completions, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert!(stats.last_completion.is_none());
    }

    #[test]
    fn test_single_completion_today() {
        let now = reference_now();
        let stats = compute_stats("h1", "Reading", &[now], now);

        assert_eq!(stats.total_completions, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.last_completion, Some(now));
    }

    #[test]
    fn test_today_and_yesterday_is_streak_of_two() {
        let now = reference_now();
        let stats = compute_stats("h1", "Reading", &[at(now, 1), now], now);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_grace_window_allows_yesterday_anchor() {
        let now = reference_now();
        let stats = compute_stats("h1", "Reading", &[at(now, 2), at(now, 1)], now);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_two_day_gap_breaks_streak() {
        // Completions three days apart: both isolated, and neither today
        // nor yesterday, so no current streak.
        let now = reference_now();
        let stats = compute_stats("h1", "Reading", &[at(now, 5), at(now, 2)], now);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 1);
    }

    #[test]
    fn test_gap_behind_anchor_stops_current_streak() {
        let now = reference_now();
        let stats = compute_stats(
            "h1",
            "Reading",
            &[at(now, 4), at(now, 3), at(now, 1), now],
            now,
        );
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_ten_consecutive_days_ending_today() {
        let now = reference_now();
        let timestamps: Vec<_> = (0..10).map(|d| at(now, d)).collect();
        let stats = compute_stats("h1", "Reading", &timestamps, now);
        assert_eq!(stats.current_streak, 10);
        assert_eq!(stats.longest_streak, 10);
    }

    #[test]
    fn test_longest_streak_in_the_past() {
        let now = reference_now();
        let timestamps = vec![at(now, 20), at(now, 19), at(now, 18), at(now, 10)];
        let stats = compute_stats("h1", "Reading", &timestamps, now);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn test_rate_fifteen_days_is_fifty_percent() {
        let now = reference_now();
        let timestamps: Vec<_> = (0..15).map(|d| at(now, d)).collect();
        let stats = compute_stats("h1", "Reading", &timestamps, now);
        assert_eq!(stats.completion_rate, 50.0);
    }

    #[test]
    fn test_rate_excludes_timestamps_outside_window() {
        let now = reference_now();
        let timestamps = vec![at(now, 40), at(now, 35), at(now, 3)];
        let stats = compute_stats("h1", "Reading", &timestamps, now);
        assert_eq!(stats.completion_rate, 1.0 / 30.0 * 100.0);
        assert_eq!(stats.total_completions, 3);
    }

    #[test]
    fn test_rate_window_boundary() {
        // Oldest date still inside the window is 29 days back
        let now = reference_now();
        let stats = compute_stats("h1", "Reading", &[at(now, 29), at(now, 30)], now);
        assert_eq!(stats.completion_rate, 1.0 / 30.0 * 100.0);
    }

    #[test]
    fn test_same_day_repeats_count_once() {
        let now = reference_now();
        let timestamps = vec![now, now - Duration::hours(2), now - Duration::hours(5)];
        let stats = compute_stats("h1", "Reading", &timestamps, now);

        assert_eq!(stats.total_completions, 3);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.completion_rate, 1.0 / 30.0 * 100.0);
    }

    #[test]
    fn test_unordered_input_is_sorted_internally() {
        let now = reference_now();
        let ordered: Vec<_> = (0..5).map(|d| at(now, d)).collect();
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 4);
        shuffled.swap(1, 3);

        assert_eq!(
            compute_stats("h1", "Reading", &ordered, now),
            compute_stats("h1", "Reading", &shuffled, now)
        );
    }

    #[test]
    fn test_overview_preserves_input_order() {
        let now = reference_now();
        let histories = vec![
            HabitHistory {
                habit_id: "b".to_string(),
                habit_name: "Writing".to_string(),
                timestamps: vec![now],
            },
            HabitHistory {
                habit_id: "a".to_string(),
                habit_name: "Reading".to_string(),
                timestamps: vec![],
            },
        ];

        let overview = compute_overview(&histories, now);
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].habit_id, "b");
        assert_eq!(overview[1].habit_id, "a");
        assert_eq!(overview[0].current_streak, 1);
        assert_eq!(overview[1].current_streak, 0);
    }

    #[test]
    fn test_timeline_has_exact_window() {
        let now = reference_now();
        let timeline = completion_timeline(&[now, at(now, 2)], 7, now);

        assert_eq!(timeline.cells.len(), 7);
        assert_eq!(timeline.cells[0].date, now.date_naive() - Duration::days(6));
        assert_eq!(timeline.cells[6].date, now.date_naive());
        assert!(timeline.cells[6].completed);
        assert!(timeline.cells[4].completed);
        assert!(!timeline.cells[5].completed);
        assert_eq!(timeline.completed_days, 2);
        assert_eq!(timeline.completion_pct, 2.0 / 7.0 * 100.0);
    }

    #[test]
    fn test_timeline_ignores_out_of_window_days() {
        let now = reference_now();
        let timeline = completion_timeline(&[at(now, 30)], 7, now);
        assert_eq!(timeline.completed_days, 0);
        assert_eq!(timeline.completion_pct, 0.0);
    }
}
