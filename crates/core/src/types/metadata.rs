//! Persisted sync bookkeeping

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Process-wide sync metadata
///
/// Read and written only by the sync coordinator and the streak
/// calculator; day-boundary fields are calendar dates, not instants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    pub last_sync_time: Option<DateTime<Utc>>,
    pub last_study_date: Option<NaiveDate>,
    pub last_quote_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata_is_empty() {
        let metadata = SyncMetadata::default();
        assert!(metadata.last_sync_time.is_none());
        assert!(metadata.last_study_date.is_none());
        assert!(metadata.last_quote_date.is_none());
    }

    #[test]
    fn test_metadata_roundtrip() {
        let metadata = SyncMetadata {
            last_sync_time: Some(Utc::now()),
            last_study_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            last_quote_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        };

        let json = serde_json::to_string(&metadata).unwrap();
        let back: SyncMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata, back);
    }
}
