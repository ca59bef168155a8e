use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{SubmitAnswerRequest, TestPath},
};

#[post("/test-series/{series_id}/tests/{test_id}/attempt/start")]
pub async fn start_attempt(
    state: web::Data<AppState>,
    path: web::Path<TestPath>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .start_attempt(&auth.0.sub, &path.series_id, &path.test_id)
        .await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[post("/test-series/{series_id}/tests/{test_id}/attempt/answer")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    path: web::Path<TestPath>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let feedback = state
        .attempt_service
        .submit_answer(
            &auth.0.sub,
            &path.series_id,
            &path.test_id,
            request.into_inner(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(feedback))
}

#[post("/test-series/{series_id}/tests/{test_id}/attempt/submit")]
pub async fn submit_test(
    state: web::Data<AppState>,
    path: web::Path<TestPath>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .attempt_service
        .submit_test(&auth.0.sub, &path.series_id, &path.test_id)
        .await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[get("/test-series/{series_id}/tests/{test_id}/attempt")]
pub async fn get_attempt_progress(
    state: web::Data<AppState>,
    path: web::Path<TestPath>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state
        .attempt_service
        .get_progress(&auth.0.sub, &path.series_id, &path.test_id)
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[get("/test-series/{series_id}/tests/{test_id}/state")]
pub async fn get_test_state(
    state: web::Data<AppState>,
    path: web::Path<TestPath>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .attempt_service
        .get_test_state(&path.series_id, &path.test_id)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
