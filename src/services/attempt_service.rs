use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    errors::{AppError, AppResult},
    models::{
        domain::{Attempt, Response, Test},
        dto::{
            request::SubmitAnswerRequest,
            response::{AnswerFeedback, AttemptProgress, TestStateResponse},
        },
    },
    repositories::{AttemptRepository, CatalogReader, EntitlementGate},
    services::{
        ranking_service::RankingService,
        scoring::{elapsed_minutes, ScoringEngine},
        test_state::{self, ensure_live},
    },
};

/// Start, answer and submit for one user's run through a scheduled test.
pub struct AttemptService {
    catalog: Arc<dyn CatalogReader>,
    entitlements: Arc<dyn EntitlementGate>,
    attempts: Arc<dyn AttemptRepository>,
    ranking: Arc<RankingService>,
    clock: Arc<dyn Clock>,
}

impl AttemptService {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        entitlements: Arc<dyn EntitlementGate>,
        attempts: Arc<dyn AttemptRepository>,
        ranking: Arc<RankingService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            entitlements,
            attempts,
            ranking,
            clock,
        }
    }

    async fn get_test(&self, series_id: &str, test_id: &str) -> AppResult<Test> {
        self.catalog
            .get_test(series_id, test_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Test '{}' not found in series '{}'",
                    test_id, series_id
                ))
            })
    }

    async fn get_attempt(&self, user_id: &str, test_id: &str) -> AppResult<Attempt> {
        self.attempts
            .find_by_user_and_test(user_id, test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No attempt for test '{}'", test_id)))
    }

    /// Creates the attempt on first call; later calls resume the open attempt unchanged.
    pub async fn start_attempt(
        &self,
        user_id: &str,
        series_id: &str,
        test_id: &str,
    ) -> AppResult<Attempt> {
        let test = self.get_test(series_id, test_id).await?;

        if !test.is_free && !self.entitlements.is_entitled(user_id, series_id).await? {
            return Err(AppError::Forbidden(
                "A valid purchase is required to attempt this test".to_string(),
            ));
        }

        let now = self.clock.now();
        ensure_live(&test, now)?;

        if let Some(existing) = self.attempts.find_by_user_and_test(user_id, test_id).await? {
            return Self::resume(existing);
        }

        match self
            .attempts
            .create(Attempt::start(user_id, series_id, test_id, now))
            .await
        {
            Ok(attempt) => {
                log::info!("Attempt {} started: user {} test {}", attempt.id, user_id, test_id);
                Ok(attempt)
            }
            // Lost a race with a concurrent start for the same user and test.
            Err(AppError::AlreadyExists(_)) => {
                Self::resume(self.get_attempt(user_id, test_id).await?)
            }
            Err(err) => Err(err),
        }
    }

    fn resume(attempt: Attempt) -> AppResult<Attempt> {
        if attempt.is_completed() {
            return Err(AppError::AlreadyCompleted);
        }
        log::debug!("Attempt {} resumed", attempt.id);
        Ok(attempt)
    }

    /// Records one answer and reveals whether it was right.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        series_id: &str,
        test_id: &str,
        request: SubmitAnswerRequest,
    ) -> AppResult<AnswerFeedback> {
        request.validate()?;

        let attempt = self.get_attempt(user_id, test_id).await?;
        if attempt.is_completed() {
            return Err(AppError::AlreadyCompleted);
        }

        let test = self.get_test(series_id, test_id).await?;
        ensure_live(&test, self.clock.now())?;

        let section = test.find_section(&request.section_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "Section '{}' not found in test '{}'",
                request.section_id, test_id
            ))
        })?;
        // Answers are keyed by (section, question), so the question must belong to the section.
        let question = section
            .questions
            .iter()
            .find(|q| q.id == request.question_id)
            .ok_or_else(|| AppError::QuestionNotFound(request.question_id.clone()))?;

        if !question.is_valid_option(request.selected_option) {
            return Err(AppError::ValidationError(format!(
                "selected_option {} is out of range for question '{}' ({} options)",
                request.selected_option,
                question.id,
                question.options.len()
            )));
        }

        let is_correct =
            ScoringEngine::is_correct(question.correct_option_index, request.selected_option);
        let correct_option = question.correct_option_index;

        let response = Response {
            section_id: request.section_id,
            question_id: request.question_id,
            selected_option: request.selected_option,
            is_correct,
            time_taken: request.time_taken,
        };

        if !self.attempts.upsert_response(&attempt.id, response).await? {
            return Err(AppError::AlreadyCompleted);
        }

        Ok(AnswerFeedback {
            is_correct,
            correct_option,
        })
    }

    /// Scores and finalizes the attempt, then re-ranks the test.
    ///
    /// Finishing is only allowed while the test is live. A user who starts just before the
    /// end time cannot finish once it passes; late submissions are rejected.
    pub async fn submit_test(
        &self,
        user_id: &str,
        series_id: &str,
        test_id: &str,
    ) -> AppResult<Attempt> {
        let mut attempt = self.get_attempt(user_id, test_id).await?;
        if attempt.is_completed() {
            return Err(AppError::AlreadyCompleted);
        }

        let test = self.get_test(series_id, test_id).await?;
        let now = self.clock.now();
        ensure_live(&test, now)?;

        attempt.submitted_at = Some(now);
        attempt.modified_at = Some(now);
        let card = ScoringEngine::score_attempt(&test, &attempt, now);
        ScoringEngine::apply(&mut attempt, &card);

        if !self.attempts.finalize(&attempt).await? {
            return Err(AppError::AlreadyCompleted);
        }

        log::info!(
            "Attempt {} submitted: user {} test {} score {:.2}",
            attempt.id,
            user_id,
            test_id,
            attempt.score
        );

        match self.ranking.record_submission(&attempt).await {
            Ok(Some(entry)) => attempt.rank = entry.rank,
            Ok(None) => {}
            Err(err) => log::warn!(
                "Ranking recompute failed for test {} after attempt {}: {}",
                test_id,
                attempt.id,
                err
            ),
        }

        Ok(attempt)
    }

    /// Live view of the user's attempt; elapsed time runs until submission.
    pub async fn get_progress(
        &self,
        user_id: &str,
        series_id: &str,
        test_id: &str,
    ) -> AppResult<AttemptProgress> {
        let attempt = self.get_attempt(user_id, test_id).await?;
        let test = self.get_test(series_id, test_id).await?;
        let now = self.clock.now();

        Ok(AttemptProgress {
            test_state: test_state::resolve(&test, now),
            answered: attempt.responses.len(),
            total_questions: test.total_questions(),
            elapsed_minutes: elapsed_minutes(
                attempt.started_at,
                attempt.submitted_at.unwrap_or(now),
            ),
            attempt,
        })
    }

    pub async fn get_test_state(
        &self,
        series_id: &str,
        test_id: &str,
    ) -> AppResult<TestStateResponse> {
        let test = self.get_test(series_id, test_id).await?;
        Ok(TestStateResponse {
            state: test_state::resolve(&test, self.clock.now()),
            test_id: test.id,
        })
    }
}
