// Candidate chat with an AI interviewer, plus one-off recruiter questions.
pub mod handlers;
pub mod prompts;
