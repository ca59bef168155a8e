use std::sync::Arc;

use crate::{
    clock::Clock,
    errors::{AppError, AppResult},
    models::{
        domain::{
            cutoff::{normalize_category, CutoffStatus},
            Attempt, CutoffRecord, RankingEntry, Test,
        },
        dto::response::{
            CutoffAnalysis, PerformanceAnalysis, QuestionReportRow, ResultReport, SectionReport,
            UserSummary,
        },
    },
    repositories::{AttemptRepository, CatalogReader, CutoffRepository, UserDirectory},
    services::{ranking_service::RankingService, test_state::is_result_published},
};

pub struct ResultService {
    attempts: Arc<dyn AttemptRepository>,
    catalog: Arc<dyn CatalogReader>,
    cutoffs: Arc<dyn CutoffRepository>,
    users: Arc<dyn UserDirectory>,
    ranking: Arc<RankingService>,
    clock: Arc<dyn Clock>,
}

impl ResultService {
    pub fn new(
        attempts: Arc<dyn AttemptRepository>,
        catalog: Arc<dyn CatalogReader>,
        cutoffs: Arc<dyn CutoffRepository>,
        users: Arc<dyn UserDirectory>,
        ranking: Arc<RankingService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            attempts,
            catalog,
            cutoffs,
            users,
            ranking,
            clock,
        }
    }

    /// Full analysis of a finished attempt, visible to its owner once results are published.
    pub async fn get_result_analysis(
        &self,
        attempt_id: &str,
        requesting_user_id: &str,
    ) -> AppResult<ResultReport> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))?;

        if attempt.user_id != requesting_user_id {
            return Err(AppError::Forbidden(
                "You can only view your own results".to_string(),
            ));
        }

        if !attempt.result_generated {
            return Err(AppError::ResultNotGenerated);
        }

        let test = self
            .catalog
            .get_test(&attempt.series_id, &attempt.test_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test '{}' not found", attempt.test_id)))?;

        if !is_result_published(&test, self.clock.now()) {
            return Err(AppError::ResultNotPublished);
        }

        let entry = self.ranking.entry(&attempt.test_id, &attempt.user_id).await?;
        let cutoff = self.cutoffs.find_by_test(&attempt.test_id).await?;
        let category = self.users.get_category(&attempt.user_id).await?;

        Ok(build_report(
            &test,
            &attempt,
            entry.as_ref(),
            cutoff.as_ref(),
            category.as_deref(),
        ))
    }
}

pub fn build_report(
    test: &Test,
    attempt: &Attempt,
    entry: Option<&RankingEntry>,
    cutoff: Option<&CutoffRecord>,
    category: Option<&str>,
) -> ResultReport {
    let section_report = section_report(test, attempt);
    let performance_analysis = performance_analysis(&section_report);

    ResultReport {
        attempt_id: attempt.id.clone(),
        test_id: attempt.test_id.clone(),
        user_summary: user_summary(attempt, entry),
        cutoff_analysis: cutoff_analysis(attempt.score, cutoff, category),
        section_report,
        performance_analysis,
        question_report: question_report(test, attempt),
    }
}

/// Falls back to the rank stored on the attempt when no leaderboard entry exists.
pub fn user_summary(attempt: &Attempt, entry: Option<&RankingEntry>) -> UserSummary {
    let (rank, total_participants, percentile) = entry
        .map(|e| (e.rank, e.total_participants, e.percentile()))
        .unwrap_or((attempt.rank, 0, 0.0));

    UserSummary {
        score: attempt.score,
        correct: attempt.correct,
        incorrect: attempt.incorrect,
        unattempted: attempt.unattempted,
        accuracy: attempt.accuracy,
        speed: attempt.speed,
        percentage: attempt.percentage,
        rank,
        total_participants,
        percentile,
    }
}

pub fn cutoff_analysis(
    score: f64,
    cutoff: Option<&CutoffRecord>,
    category: Option<&str>,
) -> CutoffAnalysis {
    let threshold = cutoff.and_then(|record| record.threshold_for(category));
    let status = match threshold {
        Some(threshold) if score >= threshold => CutoffStatus::Passed,
        Some(_) => CutoffStatus::Failed,
        None => CutoffStatus::NotAvailable,
    };

    CutoffAnalysis {
        category: normalize_category(category),
        cutoff_score: threshold,
        user_score: score,
        status,
    }
}

/// Per-section counts, computed from the responses tagged with each section id.
pub fn section_report(test: &Test, attempt: &Attempt) -> Vec<SectionReport> {
    test.sections
        .iter()
        .map(|section| {
            let (correct, incorrect) = attempt
                .responses
                .iter()
                .filter(|r| r.section_id == section.id)
                .fold((0, 0), |(c, i), r| if r.is_correct { (c + 1, i) } else { (c, i + 1) });

            let total_questions = section.questions.len() as i32;
            let attempted = correct + incorrect;
            let accuracy = if attempted > 0 {
                f64::from(correct) / f64::from(attempted) * 100.0
            } else {
                0.0
            };

            SectionReport {
                section_id: section.id.clone(),
                section_title: section.title.clone(),
                total_questions,
                correct,
                incorrect,
                unattempted: (total_questions - attempted).max(0),
                accuracy,
            }
        })
        .collect()
}

/// Strongest and weakest sections by accuracy; the first section wins ties.
pub fn performance_analysis(sections: &[SectionReport]) -> PerformanceAnalysis {
    let mut strongest: Option<&SectionReport> = None;
    let mut weakest: Option<&SectionReport> = None;

    for section in sections {
        if strongest.map_or(true, |s| section.accuracy > s.accuracy) {
            strongest = Some(section);
        }
        if weakest.map_or(true, |w| section.accuracy < w.accuracy) {
            weakest = Some(section);
        }
    }

    PerformanceAnalysis {
        strongest_area: strongest.map(|s| s.section_title.clone()),
        weakest_area: weakest.map(|w| w.section_title.clone()),
    }
}

pub fn question_report(test: &Test, attempt: &Attempt) -> Vec<QuestionReportRow> {
    attempt
        .responses
        .iter()
        .map(|response| {
            let owner = test
                .find_section(&response.section_id)
                .and_then(|section| {
                    section
                        .questions
                        .iter()
                        .find(|q| q.id == response.question_id)
                        .map(|q| (section, q))
                })
                .or_else(|| test.find_question(&response.question_id));

            QuestionReportRow {
                section_id: response.section_id.clone(),
                section_title: owner.map(|(s, _)| s.title.clone()),
                question_id: response.question_id.clone(),
                question_text: owner.map(|(_, q)| q.text.clone()),
                options: owner.map(|(_, q)| q.options.clone()).unwrap_or_default(),
                selected_option: response.selected_option,
                correct_option: owner.map(|(_, q)| q.correct_option_index),
                is_correct: response.is_correct,
                time_taken: response.time_taken,
                explanation: owner.map(|(_, q)| q.explanation.clone()),
            }
        })
        .collect()
}
