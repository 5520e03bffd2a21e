use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::ai_settings::store::fetch_or_default;
use crate::analysis::selector::AnalysisProviderSelector;
use crate::candidates::store::fetch_owned_candidate;
use crate::errors::AppError;
use crate::llm_client::ChatMessage;
use crate::outreach::prompts::{build_outreach_prompt, template_letter, OUTREACH_SYSTEM};
use crate::state::AppState;
use crate::vacancies::store::fetch_owned_vacancy;

pub const OUTREACH_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Deserialize)]
pub struct OutreachRequest {
    pub user_id: Uuid,
    /// Defaults to the resume's file name without extension.
    pub candidate_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OutreachResponse {
    pub message: String,
    /// False when the template letter was used.
    pub generated: bool,
}

/// Everything the letter is written from.
pub struct OutreachInput<'a> {
    pub candidate_name: &'a str,
    pub vacancy_title: &'a str,
    pub skills: &'a [String],
    pub signature: &'a str,
}

/// POST /api/v1/candidates/:id/outreach
pub async fn handle_outreach(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<OutreachRequest>,
) -> Result<Json<OutreachResponse>, AppError> {
    let candidate = fetch_owned_candidate(&state.db, id, req.user_id).await?;
    let vacancy = fetch_owned_vacancy(&state.db, candidate.vacancy_id, req.user_id).await?;
    let settings = fetch_or_default(&state.db, req.user_id).await?;

    let name = req
        .candidate_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| name_from_filename(&candidate.filename))
        .to_string();

    let response = write_letter(
        &state.ai,
        &settings.model_name,
        &OutreachInput {
            candidate_name: &name,
            vacancy_title: &vacancy.title,
            skills: &candidate.skills_match,
            signature: &state.config.project_name,
        },
    )
    .await;

    info!(
        "Outreach letter for candidate {} ({})",
        candidate.id,
        if response.generated { "generated" } else { "template" }
    );
    Ok(Json(response))
}

pub async fn write_letter(
    ai: &AnalysisProviderSelector,
    model: &str,
    input: &OutreachInput<'_>,
) -> OutreachResponse {
    let messages = [
        ChatMessage::system(OUTREACH_SYSTEM),
        ChatMessage::user(build_outreach_prompt(
            input.candidate_name,
            input.vacancy_title,
            input.skills,
        )),
    ];
    let generated = ai
        .complete(&messages, model, OUTREACH_TEMPERATURE)
        .await
        .map(|text| strip_quotes(&text).to_string())
        .filter(|text| !text.is_empty());

    match generated {
        Some(message) => OutreachResponse {
            message,
            generated: true,
        },
        None => OutreachResponse {
            message: template_letter(
                input.candidate_name,
                input.vacancy_title,
                input.skills,
                input.signature,
            ),
            generated: false,
        },
    }
}

/// Models like to wrap the letter in quotes.
fn strip_quotes(text: &str) -> &str {
    text.trim().trim_matches('"').trim_matches('\'').trim()
}

fn name_from_filename(filename: &str) -> &str {
    std::path::Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(filename)
}
