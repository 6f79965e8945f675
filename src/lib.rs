//! Trip Planner: a conversational, budget-minded travel assistant.

pub mod agent;
pub mod channels;
pub mod config;
pub mod error;
pub mod flights;
pub mod llm;
pub mod preferences;
