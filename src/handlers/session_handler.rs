use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{Claims, MaybeUser},
    errors::{AppError, AppResult},
    models::dto::request::{AnswerRequest, SessionKeyQuery, StartSessionRequest},
    services::quiz_session_service::SessionOwner,
};

/// Signed-in callers own their session by user id; anonymous callers must
/// send the key their client generated.
pub fn resolve_owner(claims: Option<&Claims>, client_key: Option<&str>) -> AppResult<SessionOwner> {
    if let Some(claims) = claims {
        return Ok(SessionOwner::user(&claims.sub));
    }
    match client_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Ok(SessionOwner::anonymous(key)),
        None => Err(AppError::BadRequest(
            "Sign in or provide a client_key".to_string(),
        )),
    }
}

#[post("/api/session/start")]
async fn start_session(
    state: web::Data<Arc<AppState>>,
    request: web::Json<StartSessionRequest>,
    user: MaybeUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let owner = resolve_owner(user.0.as_ref(), request.client_key.as_deref())?;

    if let Some(claims) = &user.0 {
        if let Err(err) = state
            .user_service
            .touch_last_seen(&claims.sub, &claims.email)
            .await
        {
            log::warn!("Could not update last seen for '{}': {}", claims.sub, err);
        }
    }

    let response = state.session_service.start(&owner, &request.topic).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/session/answer")]
async fn answer_question(
    state: web::Data<Arc<AppState>>,
    request: web::Json<AnswerRequest>,
    user: MaybeUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let owner = resolve_owner(user.0.as_ref(), request.client_key.as_deref())?;

    let response = state.session_service.answer(&owner, &request.choice).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/session/advance")]
async fn advance_question(
    state: web::Data<Arc<AppState>>,
    query: web::Query<SessionKeyQuery>,
    user: MaybeUser,
) -> Result<HttpResponse, AppError> {
    let owner = resolve_owner(user.0.as_ref(), query.client_key.as_deref())?;

    let response = state.session_service.advance(&owner).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/session/restart")]
async fn restart_session(
    state: web::Data<Arc<AppState>>,
    query: web::Query<SessionKeyQuery>,
    user: MaybeUser,
) -> Result<HttpResponse, AppError> {
    let owner = resolve_owner(user.0.as_ref(), query.client_key.as_deref())?;

    let response = state.session_service.restart(&owner).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/session/abort")]
async fn abort_session(
    state: web::Data<Arc<AppState>>,
    query: web::Query<SessionKeyQuery>,
    user: MaybeUser,
) -> Result<HttpResponse, AppError> {
    let owner = resolve_owner(user.0.as_ref(), query.client_key.as_deref())?;

    let response = state.session_service.abort(&owner).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/session")]
async fn get_session(
    state: web::Data<Arc<AppState>>,
    query: web::Query<SessionKeyQuery>,
    user: MaybeUser,
) -> Result<HttpResponse, AppError> {
    let owner = resolve_owner(user.0.as_ref(), query.client_key.as_deref())?;

    let response = state.session_service.snapshot(&owner).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(start_session)
        .service(answer_question)
        .service(advance_question)
        .service(restart_session)
        .service(abort_session)
        .service(get_session);
}
