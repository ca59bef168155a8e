#[cfg(test)]
pub mod fixtures {
    use chrono::{DateTime, Duration, Utc};

    use crate::models::domain::{Question, Response, Section, Test};

    /// A four-option question.
    pub fn question(
        id: &str,
        correct_option_index: i32,
        marks: Option<f64>,
        negative_marks: Option<f64>,
    ) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {}", id),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option_index,
            explanation: format!("Explanation for {}", id),
            marks,
            negative_marks,
        }
    }

    /// Two sections, five questions, +2/-0.5 marking, no schedule.
    pub fn sample_test() -> Test {
        Test {
            id: "test-1".to_string(),
            title: "Full Mock 1".to_string(),
            is_free: false,
            date: None,
            start_time: None,
            end_time: None,
            result_publish_time: None,
            positive_marks: Some(2.0),
            negative_marks: Some(0.5),
            sections: vec![
                Section {
                    id: "sec-1".to_string(),
                    title: "Quantitative Aptitude".to_string(),
                    questions: vec![
                        question("q-1", 0, None, None),
                        question("q-2", 2, None, None),
                        question("q-3", 1, None, None),
                    ],
                },
                Section {
                    id: "sec-2".to_string(),
                    title: "Reasoning".to_string(),
                    questions: vec![question("q-4", 1, None, None), question("q-5", 3, None, None)],
                },
            ],
        }
    }

    /// `sample_test` scheduled so that `now` falls inside the live window.
    pub fn live_test(now: DateTime<Utc>) -> Test {
        let mut test = sample_test();
        test.start_time = Some(now - Duration::minutes(30));
        test.end_time = Some(now + Duration::minutes(30));
        test.result_publish_time = Some(now + Duration::minutes(90));
        test
    }

    pub fn response(
        section_id: &str,
        question_id: &str,
        selected: i32,
        is_correct: bool,
    ) -> Response {
        Response {
            section_id: section_id.to_string(),
            question_id: question_id.to_string(),
            selected_option: selected,
            is_correct,
            time_taken: 30,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, Utc};

    use crate::clock::Clock;

    /// Clock pinned to a settable instant.
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self { now: Mutex::new(now) }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::test_helpers::ManualClock;
    use crate::clock::Clock;
    use chrono::{Duration, Utc};

    #[test]
    fn test_fixtures_sample_test() {
        let test = sample_test();
        assert_eq!(test.sections.len(), 2);
        assert_eq!(test.total_questions(), 5);
    }

    #[test]
    fn test_fixtures_live_test_window() {
        let now = Utc::now();
        let test = live_test(now);
        assert!(test.start_time.unwrap() < now);
        assert!(test.end_time.unwrap() > now);
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), start + Duration::minutes(5));
    }
}
