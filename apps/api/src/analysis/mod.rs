// Candidate analysis: prompt building, provider selection with fallback,
// and result normalization. All provider calls go through llm_client.

pub mod prompts;
pub mod result;
pub mod selector;
