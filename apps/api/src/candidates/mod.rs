// Candidates: resume intake under the subscription quota, pipeline status
// and AI analysis.

pub mod extraction;
pub mod handlers;
pub mod store;
