use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Attempt {
    pub id: String,
    pub user_id: String,
    pub series_id: String,
    pub test_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responses: Vec<Response>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub correct: i32,
    #[serde(default)]
    pub incorrect: i32,
    #[serde(default)]
    pub unattempted: i32,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub percentage: f64,
    /// Back-filled by the ranking engine after finalization; 0 until then.
    #[serde(default)]
    pub rank: i32,
    #[serde(default)]
    pub result_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Response {
    pub section_id: String,
    pub question_id: String,
    pub selected_option: i32,
    pub is_correct: bool,
    /// Seconds spent on the question, as reported by the client.
    #[serde(default)]
    pub time_taken: i64,
}

impl Attempt {
    pub fn start(user_id: &str, series_id: &str, test_id: &str, now: DateTime<Utc>) -> Self {
        Attempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            series_id: series_id.to_string(),
            test_id: test_id.to_string(),
            started_at: now,
            submitted_at: None,
            responses: Vec::new(),
            score: 0.0,
            correct: 0,
            incorrect: 0,
            unattempted: 0,
            accuracy: 0.0,
            speed: 0.0,
            percentage: 0.0,
            rank: 0,
            result_generated: false,
            modified_at: Some(now),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.result_generated
    }

    /// Replaces the response with the same (section, question) key, or appends it.
    pub fn upsert_response(&mut self, response: Response) {
        match self
            .responses
            .iter_mut()
            .find(|r| r.matches(&response.section_id, &response.question_id))
        {
            Some(existing) => *existing = response,
            None => self.responses.push(response),
        }
    }
}

impl Response {
    pub fn matches(&self, section_id: &str, question_id: &str) -> bool {
        self.section_id == section_id && self.question_id == question_id
    }
}
