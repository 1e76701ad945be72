// ABOUTME: Session date derivation from program parameters at enrollment time
// ABOUTME: Pure calendar logic: daily schedules, frequency-spaced schedules, week bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Schedule derivation
//!
//! When a user is enrolled in a program, each session template is assigned a
//! concrete calendar date. Programs with a full seven-day weekly frequency get
//! one session per day starting at the enrollment date; lower frequencies are
//! spread evenly inside consecutive 7-day windows anchored at the enrollment
//! date, so a 3-per-week program lands on day offsets 0, 2, and 4 of each week.

use chrono::{Datelike, Days, NaiveDate};

/// One session per day starting at `start`
#[must_use]
pub fn daily_dates(start: NaiveDate, total_sessions: u32) -> Vec<NaiveDate> {
    (0..total_sessions)
        .filter_map(|index| start.checked_add_days(Days::new(u64::from(index))))
        .collect()
}

/// Sessions spread evenly across 7-day windows anchored at `start`
///
/// `frequency_per_week` is clamped to 1..=7; a frequency of 7 degenerates to
/// the daily schedule.
#[must_use]
pub fn spaced_dates(start: NaiveDate, total_sessions: u32, frequency_per_week: u32) -> Vec<NaiveDate> {
    let frequency = frequency_per_week.clamp(1, 7);
    (0..total_sessions)
        .filter_map(|index| {
            let week = index / frequency;
            let slot = index % frequency;
            // Spread slots across the week: slot k of f lands on day k*7/f
            let day_offset = u64::from(week * 7 + slot * 7 / frequency);
            start.checked_add_days(Days::new(day_offset))
        })
        .collect()
}

/// The schedule for a program: daily when the program runs every day,
/// frequency-spaced otherwise
#[must_use]
pub fn dates_for_program(
    start: NaiveDate,
    total_sessions: i64,
    frequency_per_week: i64,
) -> Vec<NaiveDate> {
    let total = u32::try_from(total_sessions.max(0)).unwrap_or(u32::MAX);
    let frequency = u32::try_from(frequency_per_week.clamp(1, 7)).unwrap_or(7);
    if frequency >= 7 {
        daily_dates(start, total)
    } else {
        spaced_dates(start, total, frequency)
    }
}

/// The Monday–Sunday week containing `date`
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_from_monday = u64::from(date.weekday().num_days_from_monday());
    let week_start = date
        .checked_sub_days(Days::new(days_from_monday))
        .unwrap_or(date);
    let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(date);
    (week_start, week_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_dates_are_consecutive() {
        let dates = daily_dates(date(2025, 3, 10), 4);
        assert_eq!(
            dates,
            vec![
                date(2025, 3, 10),
                date(2025, 3, 11),
                date(2025, 3, 12),
                date(2025, 3, 13),
            ]
        );
    }

    #[test]
    fn test_spaced_three_per_week() {
        let dates = spaced_dates(date(2025, 3, 10), 7, 3);
        // Offsets 0, 2, 4 in the first week, then the pattern repeats
        assert_eq!(
            dates,
            vec![
                date(2025, 3, 10),
                date(2025, 3, 12),
                date(2025, 3, 14),
                date(2025, 3, 17),
                date(2025, 3, 19),
                date(2025, 3, 21),
                date(2025, 3, 24),
            ]
        );
    }

    #[test]
    fn test_spaced_seven_matches_daily() {
        let start = date(2025, 6, 1);
        assert_eq!(spaced_dates(start, 10, 7), daily_dates(start, 10));
    }

    #[test]
    fn test_dates_for_program_clamps_frequency() {
        let start = date(2025, 6, 1);
        // Out-of-range frequencies behave like the nearest valid one
        assert_eq!(dates_for_program(start, 5, 0), dates_for_program(start, 5, 1));
        assert_eq!(dates_for_program(start, 5, 12), daily_dates(start, 5));
    }

    #[test]
    fn test_week_bounds_monday_to_sunday() {
        // 2024-11-23 is a Saturday
        let (start, end) = week_bounds(date(2024, 11, 23));
        assert_eq!(start, date(2024, 11, 18));
        assert_eq!(end, date(2024, 11, 24));
        assert_eq!(start.weekday(), Weekday::Mon);
        assert_eq!(end.weekday(), Weekday::Sun);

        // A Monday is its own week start
        let (start, _) = week_bounds(date(2024, 11, 18));
        assert_eq!(start, date(2024, 11, 18));
    }
}
