use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Test,
};

/// Lifecycle phase of a scheduled test, derived purely from the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestState {
    Unknown,
    Upcoming,
    Live,
    ResultPending,
    ResultsAvailable,
}

pub fn resolve(test: &Test, now: DateTime<Utc>) -> TestState {
    let (Some(start), Some(end)) = (test.start_time, test.end_time) else {
        return TestState::Unknown;
    };

    if now < start {
        return TestState::Upcoming;
    }
    if now <= end {
        return TestState::Live;
    }

    match test.result_publish_time {
        Some(publish) if now < publish => TestState::ResultPending,
        _ => TestState::ResultsAvailable,
    }
}

pub fn ensure_live(test: &Test, now: DateTime<Utc>) -> AppResult<()> {
    match resolve(test, now) {
        TestState::Live => Ok(()),
        _ => Err(AppError::TestNotLive),
    }
}

/// Stricter than the coarse state: only the publish timestamp matters here.
pub fn is_result_published(test: &Test, now: DateTime<Utc>) -> bool {
    test.result_publish_time.map_or(true, |publish| now >= publish)
}
