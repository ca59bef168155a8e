use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 128, message = "section_id is required"))]
    pub section_id: String,

    #[validate(length(min = 1, max = 128, message = "question_id is required"))]
    pub question_id: String,

    #[validate(range(min = 0, message = "selected_option must be a zero-based option index"))]
    pub selected_option: i32,

    /// Seconds the user spent on the question.
    #[validate(range(min = 0))]
    #[serde(default)]
    pub time_taken: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestPath {
    pub series_id: String,
    pub test_id: String,
}
