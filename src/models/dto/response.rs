use serde::Serialize;

use crate::{
    models::domain::{cutoff::CutoffStatus, Attempt, RankingEntry},
    services::test_state::TestState,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub correct_option: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptProgress {
    pub attempt: Attempt,
    pub test_state: TestState,
    pub answered: usize,
    pub total_questions: usize,
    pub elapsed_minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestStateResponse {
    pub test_id: String,
    pub state: TestState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultReport {
    pub attempt_id: String,
    pub test_id: String,
    pub user_summary: UserSummary,
    pub cutoff_analysis: CutoffAnalysis,
    pub section_report: Vec<SectionReport>,
    pub performance_analysis: PerformanceAnalysis,
    pub question_report: Vec<QuestionReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub score: f64,
    pub correct: i32,
    pub incorrect: i32,
    pub unattempted: i32,
    pub accuracy: f64,
    pub speed: f64,
    pub percentage: f64,
    pub rank: i32,
    pub total_participants: i32,
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutoffAnalysis {
    pub category: String,
    pub cutoff_score: Option<f64>,
    pub user_score: f64,
    pub status: CutoffStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub section_id: String,
    pub section_title: String,
    pub total_questions: i32,
    pub correct: i32,
    pub incorrect: i32,
    pub unattempted: i32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceAnalysis {
    pub strongest_area: Option<String>,
    pub weakest_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReportRow {
    pub section_id: String,
    pub section_title: Option<String>,
    pub question_id: String,
    pub question_text: Option<String>,
    pub options: Vec<String>,
    pub selected_option: i32,
    pub correct_option: Option<i32>,
    pub is_correct: bool,
    pub time_taken: i64,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub score: f64,
    pub rank: i32,
    pub accuracy: f64,
    pub total_participants: i32,
}

impl From<RankingEntry> for LeaderboardRow {
    fn from(entry: RankingEntry) -> Self {
        LeaderboardRow {
            user_id: entry.user_id,
            score: entry.score,
            rank: entry.rank,
            accuracy: entry.accuracy,
            total_participants: entry.total_participants,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecomputeResponse {
    pub test_id: String,
    pub total_participants: usize,
}
