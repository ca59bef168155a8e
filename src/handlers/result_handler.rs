use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_staff, AuthenticatedUser},
    errors::AppError,
    models::dto::response::RecomputeResponse,
};

#[get("/attempts/{attempt_id}/result")]
pub async fn get_result_analysis(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let report = state
        .result_service
        .get_result_analysis(&attempt_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[get("/tests/{test_id}/leaderboard")]
pub async fn get_leaderboard(
    state: web::Data<AppState>,
    test_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    let rows = state.ranking_service.leaderboard(&test_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[post("/tests/{test_id}/leaderboard/recompute")]
pub async fn recompute_leaderboard(
    state: web::Data<AppState>,
    test_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    let entries = state.ranking_service.recompute(&test_id).await?;
    log::info!(
        "Leaderboard for test {} recomputed by {} ({} participants)",
        test_id,
        auth.0.sub,
        entries.len()
    );

    Ok(HttpResponse::Ok().json(RecomputeResponse {
        test_id: test_id.into_inner(),
        total_participants: entries.len(),
    }))
}
