pub mod attempt_handler;
pub mod health_handler;
pub mod result_handler;

use actix_web::web;

use crate::auth::AuthMiddleware;

pub use attempt_handler::{
    get_attempt_progress, get_test_state, start_attempt, submit_answer, submit_test,
};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use result_handler::{get_leaderboard, get_result_analysis, recompute_leaderboard};

/// Health probes are public; everything under `/api` needs a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(start_attempt)
                .service(submit_answer)
                .service(submit_test)
                .service(get_attempt_progress)
                .service(get_test_state)
                .service(get_result_analysis)
                .service(get_leaderboard)
                .service(recompute_leaderboard),
        );
}
