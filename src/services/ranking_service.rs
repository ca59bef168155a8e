use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    clock::Clock,
    errors::{AppError, AppResult},
    models::{
        domain::{Attempt, RankingEntry},
        dto::response::LeaderboardRow,
    },
    repositories::{AttemptRepository, RankingRepository},
};

/// Sorts by score descending and hands out positions 1..N.
///
/// The sort is stable, so equal scores keep the order the store returned them in.
/// No secondary key is applied on purpose; see DESIGN.md on tie-breaking.
pub fn assign_ranks(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));

    let total = entries.len() as i32;
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = position as i32 + 1;
        entry.total_participants = total;
    }
}

/// Per-test leaderboard maintenance.
///
/// Every submission triggers a full re-sort of the test's participants: O(N log N) reads and
/// N writes per submit. All callers go through [`RankingService::recompute`], so this can be
/// debounced or made incremental later without touching them.
pub struct RankingService {
    ranking_repository: Arc<dyn RankingRepository>,
    attempt_repository: Arc<dyn AttemptRepository>,
    clock: Arc<dyn Clock>,
    recompute_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RankingService {
    pub fn new(
        ranking_repository: Arc<dyn RankingRepository>,
        attempt_repository: Arc<dyn AttemptRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ranking_repository,
            attempt_repository,
            clock,
            recompute_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Writes the user's fresh entry with rank 0, then re-ranks the whole test.
    /// Returns the user's entry as of the recompute.
    pub async fn record_submission(&self, attempt: &Attempt) -> AppResult<Option<RankingEntry>> {
        let entry = RankingEntry::unranked(
            &attempt.test_id,
            &attempt.user_id,
            attempt.score,
            attempt.accuracy,
            self.clock.now(),
        );
        self.ranking_repository.upsert(entry).await?;

        let ranked = self.recompute(&attempt.test_id).await?;
        Ok(ranked.into_iter().find(|e| e.user_id == attempt.user_id))
    }

    /// Reads the full participant set of the test and rewrites every rank and total.
    ///
    /// Recomputes of the same test are serialized within the process so that the last one to
    /// run has seen every upsert that preceded it.
    pub async fn recompute(&self, test_id: &str) -> AppResult<Vec<RankingEntry>> {
        let lock = self.lock_for(test_id)?;
        let _guard = lock.lock().await;

        let mut entries = self.ranking_repository.find_by_test(test_id).await?;
        assign_ranks(&mut entries);

        for entry in &entries {
            self.ranking_repository
                .update_rank(test_id, &entry.user_id, entry.rank, entry.total_participants)
                .await?;
            self.attempt_repository
                .set_rank(test_id, &entry.user_id, entry.rank)
                .await?;
        }

        log::debug!(
            "Recomputed ranking for test {} ({} participants)",
            test_id,
            entries.len()
        );
        Ok(entries)
    }

    pub async fn entry(&self, test_id: &str, user_id: &str) -> AppResult<Option<RankingEntry>> {
        self.ranking_repository.find_entry(test_id, user_id).await
    }

    /// Rows ordered by rank ascending; entries still waiting for a recompute (rank 0) go last.
    pub async fn leaderboard(&self, test_id: &str) -> AppResult<Vec<LeaderboardRow>> {
        let mut entries = self.ranking_repository.find_by_test(test_id).await?;
        entries.sort_by_key(|e| (e.rank == 0, e.rank));
        Ok(entries.into_iter().map(LeaderboardRow::from).collect())
    }

    fn lock_for(&self, test_id: &str) -> AppResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .recompute_locks
            .lock()
            .map_err(|_| AppError::InternalError("Ranking lock table poisoned".to_string()))?;
        Ok(locks
            .entry(test_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }
}
