//! The normalized analysis result and the constants used to fill it in when
//! a provider's answer is partial or missing altogether.

use serde::{Deserialize, Serialize};

pub const MAX_SCREENING_QUESTIONS: usize = 5;

/// Defaults for fields a GigaChat answer leaves out.
pub const DEFAULT_SCORE: f64 = 0.7;
pub const DEFAULT_RECOMMENDATION: &str = "Consider for interview";
pub const DEFAULT_SCREENING_QUESTION: &str =
    "Расскажите подробнее о проекте из вашего опыта, который лучше всего соответствует требованиям вакансии.";

/// The placeholder result returned when no provider produced a usable answer.
pub const FALLBACK_SCORE: f64 = 0.85;
pub const FALLBACK_SKILLS_MATCH: [&str; 3] = ["Python", "FastAPI", "SQL"];
pub const FALLBACK_MISSING_SKILLS: [&str; 1] = ["Cloud Ops"];
pub const FALLBACK_RECOMMENDATION: &str = "Interview";
pub const FALLBACK_SCREENING_QUESTIONS: [&str; 3] = [
    "Расскажите о вашем опыте работы с Python и FastAPI в production-проектах.",
    "Как вы проектируете схему базы данных и оптимизируете SQL-запросы?",
    "Был ли у вас опыт развертывания и сопровождения сервисов в облаке?",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub skills_match: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: String,
    pub recommendation: String,
    #[serde(default)]
    pub screening_questions: Vec<String>,
}

impl AnalysisResult {
    /// The fixed placeholder shown when both providers failed.
    pub fn fallback(reason: &str) -> Self {
        Self {
            score: FALLBACK_SCORE,
            skills_match: to_strings(&FALLBACK_SKILLS_MATCH),
            missing_skills: to_strings(&FALLBACK_MISSING_SKILLS),
            summary: format!(
                "Automatic analysis is unavailable ({reason}). Placeholder assessment shown."
            ),
            recommendation: FALLBACK_RECOMMENDATION.to_string(),
            screening_questions: to_strings(&FALLBACK_SCREENING_QUESTIONS),
        }
    }

    /// Clamps the score into [0, 1] and caps the question list.
    /// Scores on a 0–100 scale are rescaled first.
    pub fn normalized(mut self) -> Self {
        self.score = normalize_score(self.score);
        self.screening_questions.truncate(MAX_SCREENING_QUESTIONS);
        self
    }
}

/// A provider answer where every field may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct PartialAnalysis {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub skills_match: Option<Vec<String>>,
    #[serde(default)]
    pub missing_skills: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub screening_questions: Option<Vec<String>>,
}

impl PartialAnalysis {
    /// Fills absent fields with the named defaults.
    pub fn complete_with_defaults(self, provider: &str) -> AnalysisResult {
        AnalysisResult {
            score: self.score.unwrap_or(DEFAULT_SCORE),
            skills_match: self.skills_match.unwrap_or_default(),
            missing_skills: self.missing_skills.unwrap_or_default(),
            summary: self
                .summary
                .unwrap_or_else(|| format!("Resume analysis completed via {provider}.")),
            recommendation: self
                .recommendation
                .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string()),
            screening_questions: self
                .screening_questions
                .unwrap_or_else(|| vec![DEFAULT_SCREENING_QUESTION.to_string()]),
        }
        .normalized()
    }
}

fn normalize_score(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    let score = if score > 1.0 && score <= 100.0 {
        score / 100.0
    } else {
        score
    };
    score.clamp(0.0, 1.0)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_literals() {
        let result = AnalysisResult::fallback("timeout");
        assert_eq!(result.score, 0.85);
        assert_eq!(result.skills_match, vec!["Python", "FastAPI", "SQL"]);
        assert_eq!(result.missing_skills, vec!["Cloud Ops"]);
        assert_eq!(result.recommendation, "Interview");
        assert_eq!(result.screening_questions.len(), 3);
        assert!(result.summary.contains("timeout"));
    }

    #[test]
    fn test_partial_fills_every_default() {
        let result = PartialAnalysis::default().complete_with_defaults("GigaChat");
        assert_eq!(result.score, DEFAULT_SCORE);
        assert_eq!(result.recommendation, DEFAULT_RECOMMENDATION);
        assert_eq!(result.summary, "Resume analysis completed via GigaChat.");
        assert_eq!(result.screening_questions, vec![DEFAULT_SCREENING_QUESTION]);
        assert!(result.skills_match.is_empty());
        assert!(result.missing_skills.is_empty());
    }

    #[test]
    fn test_percent_scores_are_rescaled() {
        assert_eq!(normalize_score(85.0), 0.85);
        assert_eq!(normalize_score(0.42), 0.42);
        assert_eq!(normalize_score(1.0), 1.0);
        assert_eq!(normalize_score(250.0), 1.0);
        assert_eq!(normalize_score(-3.0), 0.0);
        assert_eq!(normalize_score(f64::NAN), 0.0);
    }

    #[test]
    fn test_screening_questions_capped() {
        let partial = PartialAnalysis {
            screening_questions: Some((0..8).map(|i| format!("Q{i}")).collect()),
            ..Default::default()
        };
        let result = partial.complete_with_defaults("GigaChat");
        assert_eq!(result.screening_questions.len(), MAX_SCREENING_QUESTIONS);
    }

    #[test]
    fn test_strict_shape_allows_missing_questions() {
        let raw = r#"{"score":0.3,"skills_match":["Go"],"missing_skills":[],"summary":"s","recommendation":"Reject"}"#;
        let parsed: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert!(parsed.screening_questions.is_empty());
    }
}
