// ABOUTME: Core data models for the Fitplan fitness tracking API
// ABOUTME: Defines User, Program, Session, Meal, and completion tracking structures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Data Models
//!
//! Domain data structures shared between the database layer, services, and
//! route handlers. All identifiers are UUIDv4; calendar scheduling uses naive
//! dates (the service operates in a single civil timezone, as the original
//! deployment did), while audit timestamps are UTC.

use crate::i18n::{Language, Localized};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Countries the product ships in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Country {
    Uzbekistan,
    Russia,
    Kazakhstan,
    #[default]
    Other,
}

/// Self-reported fitness level, also used for exercise difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FitnessLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Parse from the stored string, defaulting to Beginner
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "Advanced" => Self::Advanced,
            "Intermediate" => Self::Intermediate,
            _ => Self::Beginner,
        }
    }
}

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Snack => "snack",
            Self::Dinner => "dinner",
        }
    }

    /// Parse from the stored string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "snack" => Some(Self::Snack),
            "dinner" => Some(Self::Dinner),
            _ => None,
        }
    }
}

/// Supported payment methods for enrollments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Payme,
    Card,
    Cash,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payme => "payme",
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }

    /// Parse from the stored string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "payme" => Some(Self::Payme),
            "card" => Some(Self::Card),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

/// Per-channel notification opt-ins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub email: bool,
    pub sms: bool,
    pub in_app: bool,
    pub reminder_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            in_app: true,
            reminder_enabled: true,
        }
    }
}

impl NotificationPreferences {
    /// Merge a partial update, keeping unspecified flags
    pub fn merge(&mut self, update: &NotificationPreferencesUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(sms) = update.sms {
            self.sms = sms;
        }
        if let Some(in_app) = update.in_app {
            self.in_app = in_app;
        }
        if let Some(reminder_enabled) = update.reminder_enabled {
            self.reminder_enabled = reminder_enabled;
        }
    }
}

/// Partial notification preference update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPreferencesUpdate {
    pub email: Option<bool>,
    pub sms: Option<bool>,
    pub in_app: Option<bool>,
    pub reminder_enabled: Option<bool>,
}

/// A registered user account
///
/// Accounts start inactive and are activated by one-time code verification.
/// The `goal` must match an active program's goal; verification enrolls the
/// user into that program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Unique login identifier; either an email address or a phone number
    pub email_or_phone: String,
    /// bcrypt hash, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub gender: Gender,
    pub country: Country,
    /// Age in years, validated to 16..=50
    pub age: u32,
    /// Height in centimeters, validated to 140..=220
    pub height_cm: u32,
    /// Weight in kilograms, validated to 30..=200
    pub weight_kg: u32,
    /// Chosen fitness goal; matches a program goal
    pub goal: String,
    pub level: FitnessLevel,
    pub language: Language,
    pub notification_preferences: NotificationPreferences,
    /// Daily reminder time, if the user configured one
    pub reminder_time: Option<NaiveTime>,
    pub is_premium: bool,
    /// Staff users may mutate catalog resources
    pub is_staff: bool,
    /// False until the verification code is confirmed; also cleared on logout
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Create a new inactive user pending verification
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        first_name: String,
        last_name: String,
        email_or_phone: String,
        password_hash: String,
        gender: Gender,
        country: Country,
        age: u32,
        height_cm: u32,
        weight_kg: u32,
        goal: String,
        level: FitnessLevel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email_or_phone,
            password_hash,
            gender,
            country,
            age,
            height_cm,
            weight_kg,
            goal,
            level,
            language: Language::default(),
            notification_preferences: NotificationPreferences::default(),
            reminder_time: None,
            is_premium: false,
            is_staff: false,
            is_active: false,
            date_joined: Utc::now(),
        }
    }
}

/// A workout/meal program template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    /// Sessions per week, 1..=7
    pub frequency_per_week: i64,
    /// Number of sessions in the program
    pub total_sessions: i64,
    pub goal: Localized,
    pub is_active: bool,
}

/// A single workout session template within a program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub program_id: Uuid,
    /// 1-based position within the program, unique per program
    pub session_number: i64,
    /// Calories burned by completing this session
    pub calories_burned: f64,
    /// Expected workout duration in minutes; drives the auto-complete timer
    pub duration_minutes: Option<i64>,
    /// Exercises performed in this session
    pub exercise_ids: Vec<Uuid>,
    /// Meals scheduled alongside this session
    pub meal_ids: Vec<Uuid>,
}

/// An exercise definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: Localized,
    pub description: Localized,
    pub difficulty_level: FitnessLevel,
    pub target_muscle: String,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Grouping for exercises
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutCategory {
    pub id: Uuid,
    pub name: Localized,
    pub description: Localized,
}

/// A meal definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub meal_type: MealType,
    pub food_name: Localized,
    /// Calories gained by eating this meal
    pub calories: f64,
    /// Water content in milliliters
    pub water_content: f64,
    /// Preparation time in minutes
    pub preparation_time: i64,
}

/// A preparation method for a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preparation {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub name: Localized,
    pub description: Localized,
    /// Preparation time in minutes
    pub preparation_time: i64,
}

/// A user's enrollment in a program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgram {
    pub id: Uuid,
    pub user_id: Uuid,
    pub program_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Completed session count; monotonically non-decreasing, capped at the
    /// program's `total_sessions`
    pub progress: i64,
    pub is_active: bool,
    /// Order amount in the smallest currency unit, set by order creation
    pub total_amount: Option<i64>,
    pub is_paid: bool,
    pub payment_method: Option<PaymentMethod>,
}

impl UserProgram {
    /// Completion percentage against a program's session count
    #[must_use]
    pub fn progress_percent(&self, total_sessions: i64) -> f64 {
        if total_sessions <= 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = (self.progress as f64 / total_sessions as f64) * 100.0;
        pct
    }
}

/// Per-user tracking row for a scheduled session
///
/// Exactly one row exists per (user, session), created eagerly at enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub is_completed: bool,
    /// Date the session is scheduled for
    pub session_date: NaiveDate,
    /// Date the user completed the session
    pub completion_date: Option<NaiveDate>,
    /// When the user pressed start, if they did
    pub started_at: Option<DateTime<Utc>>,
    /// Copy of the session's number, stable against template edits
    pub session_number: i64,
}

/// Per-user tracking row for a scheduled meal
///
/// Exactly one row exists per (user, session, meal), created eagerly at
/// enrollment. Meal completion carries no ordering constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub meal_id: Uuid,
    pub is_completed: bool,
    /// Date the meal is scheduled for
    pub meal_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    /// Whether the reminder sweep already picked this meal up
    pub reminder_sent: bool,
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    General,
    Reminder,
}

impl NotificationType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Reminder => "reminder",
        }
    }

    /// Parse from the stored string, defaulting to general
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "reminder" => Self::Reminder,
            _ => Self::General,
        }
    }
}

/// An in-app notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: Localized,
    /// Language the notification was issued in
    pub language: Language,
    pub notification_type: NotificationType,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
    /// Delivery time for reminder notifications
    pub scheduled_time: Option<NaiveTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_is_inactive() {
        let user = User::new(
            "Aziz".into(),
            "Karimov".into(),
            "aziz@example.com".into(),
            "hashed".into(),
            Gender::Male,
            Country::Uzbekistan,
            27,
            178,
            74,
            "Weight Loss".into(),
            FitnessLevel::Beginner,
        );
        assert!(!user.is_active);
        assert!(!user.is_staff);
        assert_eq!(user.language, Language::En);
        assert!(user.notification_preferences.email);
    }

    #[test]
    fn test_progress_percent() {
        let mut enrollment = UserProgram {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            program_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 26).unwrap(),
            progress: 5,
            is_active: true,
            total_amount: None,
            is_paid: false,
            payment_method: None,
        };
        assert!((enrollment.progress_percent(20) - 25.0).abs() < f64::EPSILON);
        enrollment.progress = 0;
        assert!(enrollment.progress_percent(0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_meal_type_round_trip() {
        for meal_type in [
            MealType::Breakfast,
            MealType::Lunch,
            MealType::Snack,
            MealType::Dinner,
        ] {
            assert_eq!(MealType::parse(meal_type.as_str()), Some(meal_type));
        }
        assert_eq!(MealType::parse("brunch"), None);
    }

    #[test]
    fn test_notification_preferences_merge() {
        let mut prefs = NotificationPreferences::default();
        prefs.merge(&NotificationPreferencesUpdate {
            sms: Some(true),
            reminder_enabled: Some(false),
            ..Default::default()
        });
        assert!(prefs.sms);
        assert!(!prefs.reminder_enabled);
        // untouched flags keep their defaults
        assert!(prefs.email);
        assert!(prefs.in_app);
    }
}
