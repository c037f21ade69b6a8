//! The canonical per-user study state

use crate::types::{Goal, QuizResult, Schedule, SyncRecord};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Canonical study state for one user
///
/// Created empty on first launch, hydrated from the local store on every
/// start, and replaced only by the merge engine or the streak calculator.
/// UI code reads copies of it and never writes fields directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySnapshot {
    /// Minutes studied today
    pub daily_time: u32,
    /// Minutes per weekday, Monday first
    pub weekly_stats: [u32; 7],
    /// Minutes per day of month, day 1 first
    pub monthly_stats: [u32; 30],
    /// Consecutive-day study streak
    pub streak: u32,
    pub quiz_results: Vec<QuizResult>,
    pub goals: Vec<Goal>,
    pub upcoming_schedules: Vec<Schedule>,
    pub today_quote: Option<String>,
    /// Wall-clock time of the last completed merge
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl Default for StudySnapshot {
    fn default() -> Self {
        Self {
            daily_time: 0,
            weekly_stats: [0; 7],
            monthly_stats: [0; 30],
            streak: 0,
            quiz_results: Vec::new(),
            goals: Vec::new(),
            upcoming_schedules: Vec::new(),
            today_quote: None,
            last_sync_time: None,
        }
    }
}

impl StudySnapshot {
    /// Adds a study session's minutes to the daily/weekly/monthly tallies
    pub fn log_study_minutes(&mut self, minutes: u32, now: DateTime<Utc>) {
        self.daily_time = self.daily_time.saturating_add(minutes);

        let weekday = now.weekday().num_days_from_monday() as usize;
        self.weekly_stats[weekday] = self.weekly_stats[weekday].saturating_add(minutes);

        // Day 31 shares the last monthly bucket
        let day = (now.day0() as usize).min(self.monthly_stats.len() - 1);
        self.monthly_stats[day] = self.monthly_stats[day].saturating_add(minutes);
    }

    /// Returns true if no collection contains two records with the same id
    pub fn record_ids_unique(&self) -> bool {
        fn unique<T: SyncRecord>(records: &[T]) -> bool {
            let mut seen = HashSet::new();
            records.iter().all(|r| seen.insert(r.id()))
        }
        unique(&self.quiz_results) && unique(&self.goals) && unique(&self.upcoming_schedules)
    }

    /// Total minutes studied this week
    pub fn weekly_total(&self) -> u32 {
        self.weekly_stats.iter().sum()
    }

    /// Total minutes studied this month
    pub fn monthly_total(&self) -> u32 {
        self.monthly_stats.iter().sum()
    }
}
