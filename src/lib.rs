//! Auto-Analyst Core — orchestration core for a multi-agent data analytics
//! assistant:
//! - Agent template registry with per-user planner visibility
//! - LM-adapter-driven planner producing structured, replayable plans
//! - Streaming plan executor (individual `@agent` and multi-agent modes)
//! - Session state with deep-analyzer cache invalidation on user change
//! - Usage/credit accounting across a five-tier pricing table
//! - Seven-stage deep analysis pipeline with resumable persistence

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
