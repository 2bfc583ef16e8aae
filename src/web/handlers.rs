use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;
use tera::Context;
use tokio::sync::Mutex as SessionLock;
use uuid::Uuid;
use log::{info, debug, error, warn};

use crate::error::SessionError;
use crate::i18n::LANGUAGES;
use crate::model::prompt::SKILL_LEVELS;
use crate::session::{validate_request, PlanSession, SessionState, MAX_DURATION_DAYS};
use crate::web::models::{IndexQuery, LanguageOption, PlanRequest, PlanResponse, TranslateRequest};
use crate::AppState;

// Index page handler
pub async fn index(data: web::Data<AppState>, query: web::Query<IndexQuery>) -> impl Responder {
    let lang = query.lang.unwrap_or_default();
    let languages: Vec<LanguageOption> = LANGUAGES
        .iter()
        .map(|l| LanguageOption { code: l.code(), label: l.label() })
        .collect();
    let skill_levels: Vec<String> = SKILL_LEVELS.iter().map(|s| s.to_string()).collect();

    let mut context = Context::new();
    context.insert("strings", lang.strings());
    context.insert("lang", lang.code());
    context.insert("languages", &languages);
    context.insert("skill_levels", &skill_levels);
    context.insert("max_days", &MAX_DURATION_DAYS);

    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

fn session_handle(data: &AppState, session_id: Uuid, create: bool) -> Result<Option<Arc<SessionLock<PlanSession>>>, HttpResponse> {
    let mut sessions = data.sessions.lock().map_err(|e| {
        error!("Failed to lock sessions mutex: {}", e);
        HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error"
        }))
    })?;

    if create {
        let handle = sessions
            .entry(session_id)
            .or_insert_with(|| Arc::new(SessionLock::new(PlanSession::new())));
        return Ok(Some(handle.clone()));
    }
    Ok(sessions.get(&session_id).cloned())
}

// Drops a session that never got a plan, so rejected or failed first requests leave nothing behind
fn forget_if_empty(data: &AppState, session_id: Uuid, session: &PlanSession) {
    if session.state() != SessionState::Idle || session.current_plan().is_some() {
        return;
    }
    match data.sessions.lock() {
        Ok(mut sessions) => {
            sessions.remove(&session_id);
            debug!("Session {} discarded without a plan", session_id);
        }
        Err(e) => error!("Failed to lock sessions mutex: {}", e),
    }
}

fn not_found(session_id: Uuid) -> HttpResponse {
    warn!("Unknown session {}", session_id);
    HttpResponse::NotFound().json(json!({
        "error": format!("Session {} not found", session_id)
    }))
}

fn busy(session_id: Uuid) -> HttpResponse {
    warn!("Session {} is busy, rejecting request", session_id);
    HttpResponse::Conflict().json(json!({ "error": SessionError::Busy.to_string() }))
}

fn error_response(session_id: Uuid, err: &SessionError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        SessionError::Busy => HttpResponse::Conflict().json(body),
        e if e.is_validation() => HttpResponse::BadRequest().json(body),
        _ => {
            error!("Session {} request failed: {}", session_id, err);
            HttpResponse::BadGateway().json(body)
        }
    }
}

fn plan_response(session_id: Uuid, session: &PlanSession, plan: String) -> PlanResponse {
    let language = session.current_language();
    PlanResponse {
        session_id,
        sport: session.sport().unwrap_or_default().to_string(),
        skill_level: session.skill_level().unwrap_or_default(),
        language,
        language_label: language.label().to_string(),
        plan,
    }
}

// Plan generation endpoint
pub async fn generate_plan(data: web::Data<AppState>, req: web::Json<PlanRequest>) -> impl Responder {
    let session_id = req.session_id.unwrap_or_else(Uuid::new_v4);
    info!(
        "Plan request from session {}: {} ({}, {} days, {})",
        session_id, req.sport, req.skill_level, req.duration_days, req.language.english_name()
    );

    let request = req.user_request();
    if let Err(e) = validate_request(&request) {
        return error_response(session_id, &e);
    }

    let handle = match session_handle(&data, session_id, true) {
        Ok(Some(handle)) => handle,
        Ok(None) => return not_found(session_id),
        Err(resp) => return resp,
    };

    // One outstanding remote call per session
    let mut session = match handle.try_lock() {
        Ok(guard) => guard,
        Err(_) => return busy(session_id),
    };

    let result = data
        .orchestrator
        .generate(&mut session, request, req.language, |m| {
            debug!("Session {} generation progress: {}%", session_id, m.percent());
        })
        .await;

    match result {
        Ok(plan) => HttpResponse::Ok().json(plan_response(session_id, &session, plan)),
        Err(e) => {
            forget_if_empty(&data, session_id, &session);
            error_response(session_id, &e)
        }
    }
}

// Translation endpoint
pub async fn translate_plan(data: web::Data<AppState>, req: web::Json<TranslateRequest>) -> impl Responder {
    let session_id = req.session_id;
    info!("Translate request from session {} to {}", session_id, req.language.english_name());

    let handle = match session_handle(&data, session_id, false) {
        Ok(Some(handle)) => handle,
        Ok(None) => return not_found(session_id),
        Err(resp) => return resp,
    };

    let mut session = match handle.try_lock() {
        Ok(guard) => guard,
        Err(_) => return busy(session_id),
    };

    let result = data
        .orchestrator
        .translate(&mut session, req.language, |m| {
            debug!("Session {} translation progress: {}%", session_id, m.percent());
        })
        .await;

    match result {
        Ok(plan) => HttpResponse::Ok().json(plan_response(session_id, &session, plan)),
        Err(e) => error_response(session_id, &e),
    }
}

// Serves the displayed plan verbatim as a markdown file
pub async fn download_plan(data: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();

    let handle = match session_handle(&data, session_id, false) {
        Ok(Some(handle)) => handle,
        Ok(None) => return not_found(session_id),
        Err(resp) => return resp,
    };

    let session = match handle.try_lock() {
        Ok(guard) => guard,
        Err(_) => return busy(session_id),
    };

    let (plan, file_name) = match (session.current_plan(), session.download_name()) {
        (Some(plan), Some(name)) => (plan.to_string(), name),
        _ => return error_response(session_id, &SessionError::NoPlan),
    };

    info!("Session {} downloading {}", session_id, file_name);
    HttpResponse::Ok()
        .content_type("text/markdown; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(plan)
}
