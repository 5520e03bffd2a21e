// AI-written invitation letters to candidates, with a fixed template when no
// provider answers.
pub mod handlers;
pub mod prompts;
