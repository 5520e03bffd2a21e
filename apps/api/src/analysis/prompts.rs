// Prompt constants for candidate analysis.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Used when the recruiter has not configured their own system prompt.
pub const DEFAULT_ANALYSIS_SYSTEM: &str = "You are an expert HR AI assistant specializing in \
    candidate screening and resume analysis. Your role is to objectively evaluate candidates \
    against job requirements and provide actionable insights.";

/// Replace `{vacancy_description}` and `{resume_text}` before sending.
const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Screen the candidate's resume against the vacancy description.

Vacancy Description:
{vacancy_description}

Resume Text:
{resume_text}

Analyze the resume and provide:
1. A match score from 0.0 to 1.0 (float).
2. List of matching skills found in the resume.
3. List of missing skills that are required but not found.
4. A brief professional summary of the candidate (max 2 sentences).
5. A recommendation (e.g. "Strong hire", "Interview", "Reject").
6. Three to five concrete interview questions in Russian.

Respond with a JSON object of exactly this structure:
{
  "score": 0.0,
  "skills_match": ["skill1", "skill2"],
  "missing_skills": ["skill3"],
  "summary": "text",
  "recommendation": "text",
  "screening_questions": ["question1", "question2", "question3"]
}
"#;

pub fn build_analysis_prompt(vacancy_description: &str, resume_text: &str) -> String {
    let prompt = ANALYSIS_PROMPT_TEMPLATE
        .replace("{vacancy_description}", vacancy_description)
        .replace("{resume_text}", resume_text);
    format!("{prompt}\n{JSON_ONLY_INSTRUCTION}")
}
