use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::result::AnalysisResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub filename: String,
    /// Text extracted from the uploaded resume.
    pub content: String,
    pub score: f64,
    pub skills_match: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: Option<String>,
    pub recommendation: Option<String>,
    pub screening_questions: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Pipeline stage a recruiter moves a candidate through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CandidateStatus {
    New,
    Shortlist,
    Rejected,
    Approved,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::New => "NEW",
            CandidateStatus::Shortlist => "SHORTLIST",
            CandidateStatus::Rejected => "REJECTED",
            CandidateStatus::Approved => "APPROVED",
        }
    }
}

impl CandidateRow {
    pub fn apply_analysis(&mut self, result: AnalysisResult) {
        self.score = result.score;
        self.skills_match = result.skills_match;
        self.missing_skills = result.missing_skills;
        self.summary = Some(result.summary);
        self.recommendation = Some(result.recommendation);
        self.screening_questions = result.screening_questions;
    }
}
