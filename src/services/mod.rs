pub mod attempt_service;
pub mod ranking_service;
pub mod result_service;
pub mod scoring;
pub mod test_state;
