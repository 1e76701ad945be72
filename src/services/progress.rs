// ABOUTME: Daily and weekly progress aggregation over completion rows
// ABOUTME: Classifies scheduled items as completed or missed and sums calories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Progress aggregation
//!
//! Summaries classify every scheduled item in the window as `completed` or
//! `missed` from its `is_completed` flag — an item is missed because its row
//! says so, not because the row is absent. Calories only count for completed
//! items. The weekly window is always the Monday–Sunday week containing the
//! query date.

use crate::database::{Database, ScheduledMeal, ScheduledSession};
use crate::schedule::week_bounds;
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completion status of a scheduled item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Completed,
    Missed,
}

/// One session in a progress summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: Uuid,
    /// Zero unless the session was completed
    pub calories_burned: f64,
    pub status: ItemStatus,
}

/// One meal in a progress summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: Uuid,
    /// Zero unless the meal was completed
    pub calories: f64,
    pub status: ItemStatus,
}

/// Aggregated progress over a date window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_end_date: Option<NaiveDate>,
    pub completed_sessions_count: usize,
    pub missed_sessions_count: usize,
    pub total_calories_burned: f64,
    pub completed_meals_count: usize,
    pub missed_meals_count: usize,
    pub calories_gained: f64,
    pub sessions: Vec<SessionEntry>,
    pub meals: Vec<MealEntry>,
}

/// Aggregate a single day's progress
///
/// # Errors
///
/// Returns an error if a database query fails
pub async fn daily_progress(
    database: &Database,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<ProgressSummary> {
    let sessions = database
        .scheduled_sessions_between(user_id, date, date)
        .await?;
    let meals = database.scheduled_meals_between(user_id, date, date).await?;

    let mut summary = summarize(&sessions, &meals);
    summary.date = Some(date);
    Ok(summary)
}

/// Aggregate the Monday–Sunday week containing `date`
///
/// # Errors
///
/// Returns an error if a database query fails
pub async fn weekly_progress(
    database: &Database,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<ProgressSummary> {
    let (week_start, week_end) = week_bounds(date);

    let sessions = database
        .scheduled_sessions_between(user_id, week_start, week_end)
        .await?;
    let meals = database
        .scheduled_meals_between(user_id, week_start, week_end)
        .await?;

    let mut summary = summarize(&sessions, &meals);
    summary.week_start_date = Some(week_start);
    summary.week_end_date = Some(week_end);
    Ok(summary)
}

fn summarize(sessions: &[ScheduledSession], meals: &[ScheduledMeal]) -> ProgressSummary {
    let session_entries: Vec<SessionEntry> = sessions
        .iter()
        .map(|s| SessionEntry {
            id: s.session_id,
            calories_burned: if s.is_completed { s.calories_burned } else { 0.0 },
            status: if s.is_completed {
                ItemStatus::Completed
            } else {
                ItemStatus::Missed
            },
        })
        .collect();

    let meal_entries: Vec<MealEntry> = meals
        .iter()
        .map(|m| MealEntry {
            id: m.meal_id,
            calories: if m.is_completed { m.calories } else { 0.0 },
            status: if m.is_completed {
                ItemStatus::Completed
            } else {
                ItemStatus::Missed
            },
        })
        .collect();

    ProgressSummary {
        date: None,
        week_start_date: None,
        week_end_date: None,
        completed_sessions_count: session_entries
            .iter()
            .filter(|s| s.status == ItemStatus::Completed)
            .count(),
        missed_sessions_count: session_entries
            .iter()
            .filter(|s| s.status == ItemStatus::Missed)
            .count(),
        total_calories_burned: session_entries.iter().map(|s| s.calories_burned).sum(),
        completed_meals_count: meal_entries
            .iter()
            .filter(|m| m.status == ItemStatus::Completed)
            .count(),
        missed_meals_count: meal_entries
            .iter()
            .filter(|m| m.status == ItemStatus::Missed)
            .count(),
        calories_gained: meal_entries.iter().map(|m| m.calories).sum(),
        sessions: session_entries,
        meals: meal_entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_counts_and_calories() {
        let sessions = vec![
            ScheduledSession {
                session_id: Uuid::new_v4(),
                calories_burned: 200.5,
                is_completed: true,
            },
            ScheduledSession {
                session_id: Uuid::new_v4(),
                calories_burned: 150.0,
                is_completed: false,
            },
        ];
        let meals = vec![ScheduledMeal {
            meal_id: Uuid::new_v4(),
            calories: 700.0,
            is_completed: true,
        }];

        let summary = summarize(&sessions, &meals);
        assert_eq!(summary.completed_sessions_count, 1);
        assert_eq!(summary.missed_sessions_count, 1);
        // Missed sessions contribute no calories
        assert!((summary.total_calories_burned - 200.5).abs() < f64::EPSILON);
        assert_eq!(summary.completed_meals_count, 1);
        assert_eq!(summary.missed_meals_count, 0);
        assert!((summary.calories_gained - 700.0).abs() < f64::EPSILON);
    }
}
