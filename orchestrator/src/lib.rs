//! Tutor orchestrator: routes a student's message to one educational tool,
//! runs it, and replies in plain language.

pub mod agents;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod tools;

pub use pipeline::Pipeline;
