// Prompts for the candidate chat and the recruiter's "ask HR" helper.
// Both conversations run in Russian.

use crate::llm_client::prompts::{truncate_chars, RUSSIAN_ONLY_INSTRUCTION};
use crate::models::candidate::CandidateRow;
use crate::models::vacancy::VacancyRow;

const NOT_SPECIFIED: &str = "Не указана";

pub const CANDIDATE_CHAT_SYSTEM: &str = "Вы - экспертный HR AI ассистент. \
Ваши цели в этом чате:
1. Уточнить готовность кандидата к конкретным условиям вакансии (з/п, график, задачи).
2. Провести \"Technical/Skill Check\" - задайте точечный вопрос по одному из навыков, заявленных в резюме, чтобы убедиться в компетенции.
3. Оценить мотивацию.

Будьте вежливы, но профессионально-критичны. Ориентируйтесь на веса навыков (Skill Weights) - \
чем выше вес, тем важнее этот навык проверить.";

pub const HR_ASK_SYSTEM: &str = "Вы - эксперт HR-аналитик. Рекрутер задает вам вопросы о кандидате. \
Дайте честный, развернутый и полезный ответ. Используйте метрики и факты из резюме.";

/// Shown to the recruiter when neither provider answered.
pub const AI_UNAVAILABLE_REPLY: &str = "Извините, AI сейчас недоступен.";

pub fn candidate_chat_system() -> String {
    format!("{CANDIDATE_CHAT_SYSTEM} {RUSSIAN_ONLY_INSTRUCTION}")
}

pub fn hr_ask_system() -> String {
    format!("{HR_ASK_SYSTEM} {RUSSIAN_ONLY_INSTRUCTION}")
}

/// Vacancy and resume context for the candidate-facing chat.
pub fn build_candidate_chat_prompt(
    vacancy: &VacancyRow,
    candidate: &CandidateRow,
    message: &str,
) -> String {
    let weights = vacancy
        .skill_weights
        .as_ref()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "Standard".to_string());
    let resume = candidate
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| truncate_chars(&candidate.content, 500));

    let mut context = format!(
        "Вакансия: {}\nОписание: {}...\nЗарплата: {}\nВеса навыков (Skill Weights): {}\n\n\
         Резюме кандидата: {}...\n\nРанее заданные вопросы скрининга:\n",
        vacancy.title,
        truncate_chars(&vacancy.description, 300),
        vacancy.salary_range.as_deref().unwrap_or(NOT_SPECIFIED),
        weights,
        resume,
    );
    for (i, question) in candidate.screening_questions.iter().take(3).enumerate() {
        context.push_str(&format!("{}. {}\n", i + 1, question));
    }

    format!(
        "{context}\nСообщение от кандидата: {message}\n\n\
         Действуйте как HR AI. Проанализируйте ответ. Если это начало чата - поприветствуйте \
         и уточните готовность к требованиям вакансии. Если чат продолжается - проведите \
         мини-проверку заявленных навыков. Дайте лаконичный, человечный ответ."
    )
}

/// Candidate dossier plus the recruiter's question.
pub fn build_hr_ask_prompt(vacancy: &VacancyRow, candidate: &CandidateRow, question: &str) -> String {
    let resume = candidate
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| truncate_chars(&candidate.content, 1000));

    format!(
        "Контекст:\nВакансия: {}\nОписание: {}...\nЗарплата: {}\nТребуемые навыки: {}\n\n\
         Кандидат: {}\nРезюме: {}...\nSkills Match: {}\nMissing Skills: {}\n\n\
         Вопрос рекрутера: {}\n\nОтвет:",
        vacancy.title,
        truncate_chars(&vacancy.description, 500),
        vacancy.salary_range.as_deref().unwrap_or(NOT_SPECIFIED),
        vacancy.required_skills.as_deref().unwrap_or("N/A"),
        candidate.filename,
        resume,
        candidate.skills_match.join(", "),
        candidate.missing_skills.join(", "),
        question,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    pub(crate) fn vacancy() -> VacancyRow {
        VacancyRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Rust разработчик".to_string(),
            description: "Разработка backend-сервисов".to_string(),
            required_skills: Some("Rust, PostgreSQL".to_string()),
            experience_level: None,
            salary_range: None,
            skill_weights: Some(json!({"Rust": 5})),
            created_at: Utc::now(),
        }
    }

    pub(crate) fn candidate() -> CandidateRow {
        CandidateRow {
            id: Uuid::new_v4(),
            vacancy_id: Uuid::new_v4(),
            filename: "ivanov.pdf".to_string(),
            content: "Иванов Иван. 5 лет Rust.".to_string(),
            score: 0.8,
            skills_match: vec!["Rust".to_string()],
            missing_skills: vec!["Kafka".to_string()],
            summary: None,
            recommendation: None,
            screening_questions: vec!["Q1".into(), "Q2".into(), "Q3".into(), "Q4".into()],
            status: "NEW".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_chat_prompt_lists_three_questions() {
        let prompt = build_candidate_chat_prompt(&vacancy(), &candidate(), "Здравствуйте");
        assert!(prompt.contains("3. Q3"));
        assert!(!prompt.contains("Q4"));
        assert!(prompt.contains("Зарплата: Не указана"));
        assert!(prompt.contains("{\"Rust\":5}"));
        assert!(prompt.contains("Иванов Иван"));
    }

    #[test]
    fn test_hr_prompt_includes_skill_lists() {
        let prompt = build_hr_ask_prompt(&vacancy(), &candidate(), "Стоит ли звать?");
        assert!(prompt.contains("Skills Match: Rust"));
        assert!(prompt.contains("Missing Skills: Kafka"));
        assert!(prompt.contains("Вопрос рекрутера: Стоит ли звать?"));
    }
}
