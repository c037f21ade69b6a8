//! Pure merge of local and remote study state
//!
//! The merge is deterministic and does no I/O. Collections are unioned
//! and deduplicated by record id with last-writer-wins on the ordering
//! field; exact ties go to the remote copy because the server is the
//! tie-break authority. Scalar aggregates take the remote value when the
//! payload carries one and otherwise keep the local value, so a partial
//! response can never erase local data.

use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use studysync_core::{Goal, QuizResult, Schedule, StudySnapshot, SyncRecord};

/// Lenient wire form of the remote snapshot
///
/// Every field is optional: an absent field merges as "keep local", while
/// a present but ill-typed field fails deserialization and is treated as
/// a malformed payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSnapshot {
    pub daily_time: Option<u32>,
    pub weekly_stats: Option<[u32; 7]>,
    pub monthly_stats: Option<[u32; 30]>,
    pub streak: Option<u32>,
    pub quiz_results: Option<Vec<QuizResult>>,
    pub goals: Option<Vec<Goal>>,
    pub upcoming_schedules: Option<Vec<Schedule>>,
    pub today_quote: Option<String>,
}

impl RemoteSnapshot {
    /// Parses a raw API response body
    ///
    /// A payload that does not deserialize is a recoverable merge failure:
    /// the caller keeps its local snapshot unchanged.
    pub fn from_value(value: serde_json::Value) -> SyncResult<Self> {
        serde_json::from_value(value).map_err(|e| SyncError::MergeData(e.to_string()))
    }
}

/// Merges a local and a remote snapshot into the canonical one
///
/// `now` becomes the merged `last_sync_time`; it is injected rather than
/// read from the clock so the merge stays a pure function.
pub fn merge(local: &StudySnapshot, remote: &RemoteSnapshot, now: DateTime<Utc>) -> StudySnapshot {
    StudySnapshot {
        daily_time: remote.daily_time.unwrap_or(local.daily_time),
        weekly_stats: remote.weekly_stats.unwrap_or(local.weekly_stats),
        monthly_stats: remote.monthly_stats.unwrap_or(local.monthly_stats),
        streak: remote.streak.unwrap_or(local.streak),
        quiz_results: merge_records(
            &local.quiz_results,
            remote.quiz_results.as_deref().unwrap_or_default(),
        ),
        goals: merge_records(&local.goals, remote.goals.as_deref().unwrap_or_default()),
        upcoming_schedules: merge_records(
            &local.upcoming_schedules,
            remote.upcoming_schedules.as_deref().unwrap_or_default(),
        ),
        today_quote: remote
            .today_quote
            .clone()
            .or_else(|| local.today_quote.clone()),
        last_sync_time: Some(now),
    }
}

/// Unions two record collections, deduplicating by id
///
/// The record with the greater ordering field wins; on an exact tie the
/// second collection (the remote side) wins. The result is sorted
/// descending by ordering field, with the id as a deterministic
/// tie-breaker.
pub fn merge_records<T>(local: &[T], remote: &[T]) -> Vec<T>
where
    T: SyncRecord + Clone,
{
    let mut by_id: HashMap<String, T> = HashMap::new();

    for record in local {
        match by_id.get(record.id()) {
            Some(current) if current.ordering_key() >= record.ordering_key() => {}
            _ => {
                by_id.insert(record.id().to_string(), record.clone());
            }
        }
    }

    for record in remote {
        match by_id.get(record.id()) {
            Some(current) if current.ordering_key() > record.ordering_key() => {}
            _ => {
                by_id.insert(record.id().to_string(), record.clone());
            }
        }
    }

    let mut merged: Vec<T> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        b.ordering_key()
            .cmp(&a.ordering_key())
            .then_with(|| a.id().cmp(b.id()))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn goal(id: &str, title: &str, updated_at: DateTime<Utc>) -> Goal {
        Goal {
            id: id.to_string(),
            title: title.to_string(),
            completed: false,
            updated_at,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_disjoint_ids_union_both_sides() {
        let local = vec![goal("a", "local", at(1))];
        let remote = vec![goal("b", "remote", at(2))];

        let merged = merge_records(&local, &remote);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_newer_record_wins() {
        let local = vec![goal("a", "stale", at(1))];
        let remote = vec![goal("a", "fresh", at(2))];

        let merged = merge_records(&local, &remote);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "fresh");

        // And symmetrically when the local copy is newer
        let merged = merge_records(&remote, &local);
        assert_eq!(merged[0].title, "fresh");
    }

    #[test]
    fn test_exact_tie_prefers_remote() {
        let local = vec![goal("a", "local copy", at(3))];
        let remote = vec![goal("a", "remote copy", at(3))];

        let merged = merge_records(&local, &remote);
        assert_eq!(merged[0].title, "remote copy");
    }

    #[test]
    fn test_result_sorted_descending() {
        let local = vec![goal("a", "old", at(1)), goal("b", "new", at(5))];
        let remote = vec![goal("c", "middle", at(3))];

        let merged = merge_records(&local, &remote);
        let times: Vec<DateTime<Utc>> = merged.iter().map(|g| g.updated_at).collect();
        assert_eq!(times, vec![at(5), at(3), at(1)]);
    }

    #[test]
    fn test_commutative_on_disjoint_ids() {
        let a = vec![goal("a", "one", at(1)), goal("b", "two", at(4))];
        let b = vec![goal("c", "three", at(2)), goal("d", "four", at(3))];

        assert_eq!(merge_records(&a, &b), merge_records(&b, &a));
    }

    #[test]
    fn test_dedup_invariant_holds() {
        let local = vec![goal("a", "l1", at(1)), goal("b", "l2", at(2))];
        let remote = vec![goal("a", "r1", at(3)), goal("b", "r2", at(1))];

        let merged = merge_records(&local, &remote);
        let ids: HashSet<&str> = merged.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids.len(), merged.len());
    }

    #[test]
    fn test_scalars_take_remote_when_present() {
        let mut local = StudySnapshot::default();
        local.daily_time = 30;
        local.streak = 2;

        let remote = RemoteSnapshot {
            daily_time: Some(45),
            streak: Some(3),
            ..RemoteSnapshot::default()
        };

        let merged = merge(&local, &remote, at(12));
        assert_eq!(merged.daily_time, 45);
        assert_eq!(merged.streak, 3);
    }

    #[test]
    fn test_absent_scalars_keep_local() {
        let mut local = StudySnapshot::default();
        local.daily_time = 30;
        local.weekly_stats[0] = 30;
        local.today_quote = Some("Keep going".to_string());

        let merged = merge(&local, &RemoteSnapshot::default(), at(12));
        assert_eq!(merged.daily_time, 30);
        assert_eq!(merged.weekly_stats[0], 30);
        assert_eq!(merged.today_quote.as_deref(), Some("Keep going"));
    }

    #[test]
    fn test_missing_collection_keeps_local_records() {
        let mut local = StudySnapshot::default();
        local.quiz_results = vec![QuizResult::new("math".to_string(), 9, 10, at(1))];

        let value = serde_json::json!({"dailyTime": 10});
        let remote = RemoteSnapshot::from_value(value).unwrap();

        let merged = merge(&local, &remote, at(12));
        assert_eq!(merged.quiz_results, local.quiz_results);
        assert_eq!(merged.daily_time, 10);
    }

    #[test]
    fn test_malformed_payload_is_merge_data_error() {
        let value = serde_json::json!({"quizResults": 42});
        let result = RemoteSnapshot::from_value(value);
        assert!(matches!(result, Err(SyncError::MergeData(_))));
    }

    #[test]
    fn test_non_object_payload_is_merge_data_error() {
        let result = RemoteSnapshot::from_value(serde_json::json!("oops"));
        assert!(matches!(result, Err(SyncError::MergeData(_))));
    }

    #[test]
    fn test_last_sync_time_is_merge_clock() {
        let local = StudySnapshot::default();
        let merged = merge(&local, &RemoteSnapshot::default(), at(7));
        assert_eq!(merged.last_sync_time, Some(at(7)));
    }

    #[test]
    fn test_merged_snapshot_ids_unique() {
        let mut local = StudySnapshot::default();
        local.goals = vec![goal("a", "l", at(1))];

        let remote = RemoteSnapshot {
            goals: Some(vec![goal("a", "r", at(2)), goal("b", "r2", at(3))]),
            ..RemoteSnapshot::default()
        };

        let merged = merge(&local, &remote, at(12));
        assert!(merged.record_ids_unique());
    }
}
