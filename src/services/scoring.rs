use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Attempt, Response, Test};

/// Aggregate result of grading one attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreCard {
    pub total_questions: i32,
    pub correct: i32,
    pub incorrect: i32,
    pub unattempted: i32,
    pub score: f64,
    pub accuracy: f64,
    pub speed: f64,
    pub percentage: f64,
    pub time_taken_minutes: f64,
}

pub struct ScoringEngine;

impl ScoringEngine {
    /// Grades a single answer against the catalog.
    pub fn is_correct(correct_option_index: i32, selected_option: i32) -> bool {
        selected_option == correct_option_index
    }

    /// `now` stands in for `submitted_at` while the attempt is still open.
    pub fn score(
        test: &Test,
        responses: &[Response],
        started_at: DateTime<Utc>,
        submitted_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ScoreCard {
        let total_questions = test.total_questions() as i32;

        let mut correct = 0;
        let mut incorrect = 0;
        let mut score = 0.0;

        for response in responses {
            let question = test.find_question(&response.question_id).map(|(_, q)| q);
            if response.is_correct {
                correct += 1;
                score += test.marks_for(question);
            } else {
                incorrect += 1;
                score -= test.penalty_for(question);
            }
        }

        let attempted = correct + incorrect;
        let unattempted = (total_questions - attempted).max(0);

        let accuracy = ratio(correct, attempted) * 100.0;
        let percentage = ratio(correct, total_questions) * 100.0;

        let end = submitted_at.unwrap_or(now);
        let time_taken_minutes = elapsed_minutes(started_at, end);
        let speed = if time_taken_minutes > 0.0 {
            f64::from(attempted) / time_taken_minutes
        } else {
            0.0
        };

        ScoreCard {
            total_questions,
            correct,
            incorrect,
            unattempted,
            score,
            accuracy,
            speed,
            percentage,
            time_taken_minutes,
        }
    }

    pub fn score_attempt(test: &Test, attempt: &Attempt, now: DateTime<Utc>) -> ScoreCard {
        Self::score(
            test,
            &attempt.responses,
            attempt.started_at,
            attempt.submitted_at,
            now,
        )
    }

    /// Copies the result fields onto the attempt and marks it terminal.
    pub fn apply(attempt: &mut Attempt, card: &ScoreCard) {
        attempt.score = card.score;
        attempt.correct = card.correct;
        attempt.incorrect = card.incorrect;
        attempt.unattempted = card.unattempted;
        attempt.accuracy = card.accuracy;
        attempt.speed = card.speed;
        attempt.percentage = card.percentage;
        attempt.result_generated = true;
    }
}

pub fn elapsed_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds().max(0);
    millis as f64 / 60_000.0
}

fn ratio(numerator: i32, denominator: i32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}
