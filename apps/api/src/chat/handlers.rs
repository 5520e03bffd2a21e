use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::ai_settings::store::fetch_or_default;
use crate::analysis::selector::AnalysisProviderSelector;
use crate::candidates::store::fetch_owned_candidate;
use crate::chat::prompts::{
    build_candidate_chat_prompt, build_hr_ask_prompt, candidate_chat_system, hr_ask_system,
    AI_UNAVAILABLE_REPLY,
};
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, Role};
use crate::models::candidate::CandidateRow;
use crate::models::chat::ChatMessageRow;
use crate::models::vacancy::VacancyRow;
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::vacancies::store::fetch_owned_vacancy;

/// Message content that asks the assistant to open the conversation.
pub const AI_START: &str = "AI_START";

pub const HR_ASK_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: Uuid,
    pub candidate_id: Uuid,
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct HrAskRequest {
    pub user_id: Uuid,
    pub candidate_id: Uuid,
    pub question: String,
}

/// GET /api/v1/chat/:candidate_id
pub async fn handle_chat_history(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ChatMessageRow>>, AppError> {
    fetch_owned_candidate(&state.db, candidate_id, params.user_id).await?;

    let messages = sqlx::query_as::<_, ChatMessageRow>(
        "SELECT * FROM chat_messages WHERE candidate_id = $1 ORDER BY created_at ASC",
    )
    .bind(candidate_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(messages))
}

/// POST /api/v1/chat
///
/// Stores the message and, for user messages, stores an AI reply after it.
/// `AI_START` is not stored; the assistant's opening message is returned
/// instead.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatMessageRow>, AppError> {
    let candidate = fetch_owned_candidate(&state.db, req.candidate_id, req.user_id).await?;
    let is_init = req.content == AI_START;
    if !is_init && req.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let stored = if is_init {
        None
    } else {
        Some(insert_message(&state, candidate.id, req.role, &req.content).await?)
    };

    let wants_reply = is_init || req.role == Role::User;
    let reply = if wants_reply {
        let vacancy = fetch_owned_vacancy(&state.db, candidate.vacancy_id, req.user_id).await?;
        let settings = fetch_or_default(&state.db, req.user_id).await?;
        let messages = [
            ChatMessage::system(candidate_chat_system()),
            ChatMessage::user(build_candidate_chat_prompt(
                &vacancy,
                &candidate,
                &req.content,
            )),
        ];
        state
            .ai
            .complete(&messages, &settings.model_name, settings.temperature)
            .await
    } else {
        None
    };

    let reply_row = match reply {
        Some(text) => {
            let row = insert_message(&state, candidate.id, Role::Assistant, &text).await?;
            info!("Chat reply stored for candidate {}", candidate.id);
            Some(row)
        }
        None => None,
    };

    match (stored, reply_row) {
        (Some(stored), _) => Ok(Json(stored)),
        (None, Some(reply)) => Ok(Json(reply)),
        // Opening message requested but no provider answered: nothing is stored.
        (None, None) => Ok(Json(ChatMessageRow {
            id: Uuid::nil(),
            candidate_id: candidate.id,
            role: role_name(Role::Assistant).to_string(),
            content: AI_UNAVAILABLE_REPLY.to_string(),
            created_at: Utc::now(),
        })),
    }
}

/// POST /api/v1/chat/hr-ask
///
/// Answers a recruiter's question about a candidate. Not stored in the
/// candidate's chat history.
pub async fn handle_hr_ask(
    State(state): State<AppState>,
    Json(req): Json<HrAskRequest>,
) -> Result<Json<String>, AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }
    let candidate = fetch_owned_candidate(&state.db, req.candidate_id, req.user_id).await?;
    let vacancy = fetch_owned_vacancy(&state.db, candidate.vacancy_id, req.user_id).await?;
    let settings = fetch_or_default(&state.db, req.user_id).await?;

    let answer = answer_hr_question(
        &state.ai,
        &settings.model_name,
        &vacancy,
        &candidate,
        &req.question,
    )
    .await;
    Ok(Json(answer))
}

/// Runs on the account's model at a fixed `HR_ASK_TEMPERATURE`, whatever the
/// saved settings say.
pub async fn answer_hr_question(
    ai: &AnalysisProviderSelector,
    model: &str,
    vacancy: &VacancyRow,
    candidate: &CandidateRow,
    question: &str,
) -> String {
    let messages = [
        ChatMessage::system(hr_ask_system()),
        ChatMessage::user(build_hr_ask_prompt(vacancy, candidate, question)),
    ];
    ai.complete(&messages, model, HR_ASK_TEMPERATURE)
        .await
        .unwrap_or_else(|| AI_UNAVAILABLE_REPLY.to_string())
}

async fn insert_message(
    state: &AppState,
    candidate_id: Uuid,
    role: Role,
    content: &str,
) -> Result<ChatMessageRow, sqlx::Error> {
    sqlx::query_as::<_, ChatMessageRow>(
        r#"
        INSERT INTO chat_messages (id, candidate_id, role, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(candidate_id)
    .bind(role_name(role))
    .bind(content)
    .fetch_one(&state.db)
    .await
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::prompts::tests::{candidate, vacancy};
    use crate::llm_client::fake::FakeProvider;
    use crate::llm_client::ChatProvider;
    use std::sync::Arc;

    fn gateway_only(gateway: Arc<FakeProvider>) -> AnalysisProviderSelector {
        AnalysisProviderSelector::new(
            None,
            Some(gateway as Arc<dyn ChatProvider>),
            false,
            "deepseek/deepseek-chat".to_string(),
        )
    }

    #[tokio::test]
    async fn test_hr_question_ignores_saved_temperature() {
        let gateway = FakeProvider::answering("OpenRouter", "Да, стоит пригласить.");
        let ai = gateway_only(gateway.clone());

        let answer =
            answer_hr_question(&ai, "x-ai/grok-4.1-fast", &vacancy(), &candidate(), "Звать?").await;

        assert_eq!(answer, "Да, стоит пригласить.");
        assert_eq!(gateway.calls(), vec!["x-ai/grok-4.1-fast"]);
        assert_eq!(gateway.temperatures(), vec![HR_ASK_TEMPERATURE]);
    }

    #[tokio::test]
    async fn test_hr_question_without_provider_gets_apology() {
        let ai = gateway_only(FakeProvider::failing("OpenRouter"));
        let answer = answer_hr_question(&ai, "m", &vacancy(), &candidate(), "Звать?").await;
        assert_eq!(answer, AI_UNAVAILABLE_REPLY);
    }

    #[test]
    fn test_role_names_match_wire_format() {
        for role in [Role::System, Role::User, Role::Assistant] {
            let wire = serde_json::to_value(role).unwrap();
            assert_eq!(wire, role_name(role));
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let parsed = serde_json::from_str::<SendMessageRequest>(
            r#"{"user_id":"00000000-0000-0000-0000-000000000000",
                "candidate_id":"00000000-0000-0000-0000-000000000000",
                "role":"moderator","content":"hi"}"#,
        );
        assert!(parsed.is_err());
    }
}
