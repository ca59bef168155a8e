use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marks awarded for a correct answer when neither the question nor the test sets one.
pub const DEFAULT_POSITIVE_MARKS: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TestSeries {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub tests: Vec<Test>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Test {
    pub id: String,
    pub title: String,
    /// Free-preview flag. Supplied by the catalog reader, never derived by the attempt engine.
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result_publish_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub positive_marks: Option<f64>,
    #[serde(default)]
    pub negative_marks: Option<f64>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: i32,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub marks: Option<f64>,
    #[serde(default)]
    pub negative_marks: Option<f64>,
}

impl Test {
    pub fn total_questions(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Searches every section; the first question with a matching id wins.
    pub fn find_question(&self, question_id: &str) -> Option<(&Section, &Question)> {
        self.sections.iter().find_map(|section| {
            section
                .questions
                .iter()
                .find(|q| q.id == question_id)
                .map(|q| (section, q))
        })
    }

    pub fn find_section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Marks for a correct answer: question override, then test default, then 1.
    pub fn marks_for(&self, question: Option<&Question>) -> f64 {
        question
            .and_then(|q| q.marks)
            .or(self.positive_marks)
            .unwrap_or(DEFAULT_POSITIVE_MARKS)
    }

    /// Penalty for a wrong answer, always returned as a non-negative magnitude.
    pub fn penalty_for(&self, question: Option<&Question>) -> f64 {
        question
            .and_then(|q| q.negative_marks)
            .or(self.negative_marks)
            .unwrap_or(0.0)
            .abs()
    }
}

impl Question {
    pub fn is_valid_option(&self, selected_option: i32) -> bool {
        selected_option >= 0 && (selected_option as usize) < self.options.len()
    }
}
