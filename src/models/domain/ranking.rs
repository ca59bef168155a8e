use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RankingEntry {
    pub test_id: String,
    pub user_id: String,
    pub score: f64,
    pub accuracy: f64,
    #[serde(default)]
    pub rank: i32,
    #[serde(default)]
    pub total_participants: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RankingEntry {
    /// A freshly upserted entry; rank stays 0 until the next recompute.
    pub fn unranked(
        test_id: &str,
        user_id: &str,
        score: f64,
        accuracy: f64,
        now: DateTime<Utc>,
    ) -> Self {
        RankingEntry {
            test_id: test_id.to_string(),
            user_id: user_id.to_string(),
            score,
            accuracy,
            rank: 0,
            total_participants: 0,
            updated_at: Some(now),
        }
    }

    /// Share of the other participants this entry outranks, 0–100.
    /// Zero for a lone participant or an entry that has not been ranked yet.
    pub fn percentile(&self) -> f64 {
        percentile(self.rank, self.total_participants)
    }
}

fn percentile(rank: i32, total_participants: i32) -> f64 {
    if total_participants <= 1 || rank <= 0 {
        return 0.0;
    }
    f64::from(total_participants - rank) / f64::from(total_participants - 1) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_single_participant_is_zero() {
        assert_eq!(percentile(1, 1), 0.0);
        assert!(!percentile(1, 1).is_nan());
    }

    #[test]
    fn percentile_bounds() {
        assert_eq!(percentile(1, 10), 100.0);
        assert_eq!(percentile(10, 10), 0.0);
        assert!((percentile(2, 5) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentile_unranked_is_zero() {
        assert_eq!(percentile(0, 10), 0.0);
    }

    #[test]
    fn unranked_entry_starts_at_rank_zero() {
        let entry = RankingEntry::unranked("t-1", "u-1", 12.5, 80.0, Utc::now());
        assert_eq!(entry.rank, 0);
        assert_eq!(entry.percentile(), 0.0);
    }
}
