//! Axum route handlers for candidates: upload, bulk add, listing, pipeline
//! status and AI analysis.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::accounts::store::lock_account;
use crate::activities::store::{record_activity, NewActivity};
use crate::ai_settings::store::fetch_or_default;
use crate::analysis::selector::AnalysisRequest;
use crate::candidates::extraction::extract_resume_text;
use crate::candidates::store::{fetch_owned_candidate, insert_candidate, save_analysis};
use crate::errors::AppError;
use crate::models::candidate::{CandidateRow, CandidateStatus};
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::subscription::limiter::{
    record_usage, record_usage_in_db, SubscriptionStatus, UsageLimiter,
};
use crate::vacancies::store::fetch_owned_vacancy;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub user_id: Uuid,
    pub vacancy_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListCandidatesQuery {
    pub user_id: Uuid,
    pub vacancy_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct BulkResume {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkAddRequest {
    pub user_id: Uuid,
    pub vacancy_id: Uuid,
    pub resumes: Vec<BulkResume>,
}

#[derive(Debug, Serialize)]
pub struct BulkAddResponse {
    pub accepted: Vec<CandidateRow>,
    /// Resumes dropped because the quota ran out.
    pub skipped: usize,
    pub subscription: SubscriptionStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub user_id: Uuid,
    pub status: CandidateStatus,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// Upper bound on an uploaded resume. Scanned PDFs run to several megabytes.
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/v1/candidates/upload
///
/// Multipart upload of a single resume (field `file`). Consumes one unit of
/// the account's quota. The route caps the body at `MAX_RESUME_BYTES`.
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CandidateRow>), AppError> {
    let (filename, bytes) = read_resume_file(multipart).await?;
    fetch_owned_vacancy(&state.db, params.vacancy_id, params.user_id).await?;

    let content = {
        let filename = filename.clone();
        tokio::task::spawn_blocking(move || extract_resume_text(&filename, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("resume extraction panicked: {e}")))?
    };

    let limiter = UsageLimiter::new(&state.config.tiers);
    let mut tx = state.db.begin().await?;
    let mut account = lock_account(&mut tx, params.user_id).await?;

    let status = limiter.status(&account, Utc::now());
    if !status.can_upload {
        return Err(AppError::usage_limit(status));
    }

    let candidate = insert_candidate(&mut tx, params.vacancy_id, &filename, &content).await?;
    record_usage(&mut account);
    record_usage_in_db(&mut tx, account.id, 1).await?;
    record_activity(
        &mut *tx,
        account.id,
        &NewActivity::candidates_added(params.vacancy_id, &[filename.as_str()], &account.email),
    )
    .await?;
    tx.commit().await?;

    info!(
        "Uploaded resume '{}' as candidate {} ({} used)",
        filename, candidate.id, account.resumes_used_current_period
    );
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// POST /api/v1/candidates/bulk
///
/// Adds text resumes in order until the quota is used up. The rest of the
/// batch is skipped, not rejected.
pub async fn handle_bulk_add(
    State(state): State<AppState>,
    Json(req): Json<BulkAddRequest>,
) -> Result<Json<BulkAddResponse>, AppError> {
    if req.resumes.is_empty() {
        return Err(AppError::Validation("resumes cannot be empty".to_string()));
    }
    fetch_owned_vacancy(&state.db, req.vacancy_id, req.user_id).await?;

    let limiter = UsageLimiter::new(&state.config.tiers);
    let mut tx = state.db.begin().await?;
    let mut account = lock_account(&mut tx, req.user_id).await?;

    let now = Utc::now();
    let remaining = limiter.remaining(&account, now);
    if remaining == 0 {
        return Err(AppError::usage_limit(limiter.status(&account, now)));
    }

    let (batch, skipped) = split_batch(req.resumes, remaining);
    let mut accepted = Vec::with_capacity(batch.len());
    for resume in batch {
        let content = resume.content.replace('\0', "");
        accepted.push(insert_candidate(&mut tx, req.vacancy_id, &resume.filename, &content).await?);
        record_usage(&mut account);
    }
    record_usage_in_db(&mut tx, account.id, accepted.len() as i64).await?;
    let filenames: Vec<&str> = accepted.iter().map(|c| c.filename.as_str()).collect();
    record_activity(
        &mut *tx,
        account.id,
        &NewActivity::candidates_added(req.vacancy_id, &filenames, &account.email),
    )
    .await?;
    tx.commit().await?;

    info!(
        "Bulk added {} candidates to vacancy {} ({} skipped)",
        accepted.len(),
        req.vacancy_id,
        skipped
    );
    Ok(Json(BulkAddResponse {
        accepted,
        skipped,
        subscription: limiter.status(&account, now),
    }))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<ListCandidatesQuery>,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    fetch_owned_vacancy(&state.db, params.vacancy_id, params.user_id).await?;

    let candidates = sqlx::query_as::<_, CandidateRow>(
        "SELECT * FROM candidates WHERE vacancy_id = $1 ORDER BY score DESC, created_at ASC",
    )
    .bind(params.vacancy_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(candidates))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CandidateRow>, AppError> {
    Ok(Json(
        fetch_owned_candidate(&state.db, id, params.user_id).await?,
    ))
}

/// PATCH /api/v1/candidates/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<CandidateRow>, AppError> {
    let before = fetch_owned_candidate(&state.db, id, req.user_id).await?;

    let candidate = sqlx::query_as::<_, CandidateRow>(
        "UPDATE candidates SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(req.status.as_str())
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    if before.status != candidate.status {
        record_activity(
            &state.db,
            req.user_id,
            &NewActivity::status_changed(&candidate, &before.status, req.status),
        )
        .await?;
    }
    Ok(Json(candidate))
}

/// POST /api/v1/candidates/:id/analyze
///
/// Scores the resume with the account's AI settings. Provider failures never
/// surface here: the selector always returns a result.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CandidateRow>, AppError> {
    let mut candidate = fetch_owned_candidate(&state.db, id, params.user_id).await?;
    let vacancy = fetch_owned_vacancy(&state.db, candidate.vacancy_id, params.user_id).await?;
    let settings = fetch_or_default(&state.db, params.user_id).await?;

    let result = state
        .ai
        .analyze(&AnalysisRequest {
            vacancy_description: &vacancy.description,
            resume_text: &candidate.content,
            system_prompt: Some(&settings.system_prompt),
            requested_model: &settings.model_name,
            temperature: settings.temperature,
        })
        .await;

    candidate.apply_analysis(result);
    let candidate = save_analysis(&state.db, &candidate).await?;

    info!(
        "Analyzed candidate {} (score {:.2})",
        candidate.id, candidate.score
    );
    Ok(Json(candidate))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Reads the `file` field of a multipart body.
async fn read_resume_file(mut multipart: Multipart) -> Result<(String, bytes::Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "resume.txt".to_string());
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        return Ok((filename, bytes));
    }
    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Resume exceeds the {} MiB upload limit",
            MAX_RESUME_BYTES / (1024 * 1024)
        ))
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Keeps the first `remaining` items; returns them and how many were dropped.
fn split_batch<T>(mut items: Vec<T>, remaining: i64) -> (Vec<T>, usize) {
    let keep = usize::try_from(remaining.max(0)).unwrap_or(usize::MAX);
    if items.len() <= keep {
        return (items, 0);
    }
    let skipped = items.len() - keep;
    items.truncate(keep);
    (items, skipped)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::DefaultBodyLimit,
        http::{header, Request},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    const BOUNDARY: &str = "nexus-test-boundary";

    /// Builds a `multipart/form-data` body with one `file` part.
    pub(crate) fn multipart_request(uri: &str, filename: &str, payload: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// Same extractor and body limit as the upload route, without the database.
    fn resume_reader() -> Router {
        Router::new().route(
            "/upload",
            post(|multipart: Multipart| async move {
                read_resume_file(multipart)
                    .await
                    .map(|(name, bytes)| format!("{name}:{}", bytes.len()))
            })
            .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES)),
        )
    }

    #[tokio::test]
    async fn test_scanned_pdf_sized_upload_is_read() {
        let payload = vec![b'%'; 3 * 1024 * 1024];
        let response = resume_reader()
            .oneshot(multipart_request("/upload", "scan.pdf", &payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], format!("scan.pdf:{}", payload.len()).as_bytes());
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_payload_too_large() {
        let payload = vec![b'%'; MAX_RESUME_BYTES + 1024];
        let response = resume_reader()
            .oneshot(multipart_request("/upload", "huge.pdf", &payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_rejected() {
        let request = Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n--{BOUNDARY}--\r\n"
            )))
            .unwrap();
        let response = resume_reader().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_split_batch_within_quota() {
        let (kept, skipped) = split_batch(vec![1, 2, 3], 10);
        assert_eq!(kept, vec![1, 2, 3]);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_split_batch_slices_to_remaining() {
        let (kept, skipped) = split_batch(vec!["a", "b", "c", "d"], 2);
        assert_eq!(kept, vec!["a", "b"]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_split_batch_nothing_remaining() {
        let (kept, skipped) = split_batch(vec![1, 2], 0);
        assert!(kept.is_empty());
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_status_deserializes_upper_case() {
        let req: UpdateStatusRequest = serde_json::from_str(
            r#"{"user_id":"00000000-0000-0000-0000-000000000000","status":"SHORTLIST"}"#,
        )
        .unwrap();
        assert_eq!(req.status, CandidateStatus::Shortlist);
    }
}
