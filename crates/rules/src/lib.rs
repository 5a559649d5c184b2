//! Automation rule engine for item change events.
//!
//! This crate provides:
//! - Filter parsing (`subscription:` keyword, permissive)
//! - Filter evaluation against an incoming event
//! - Sequential action dispatch with per-action failure isolation
//! - `RuleEngine`, which loads a user's rules and runs the matching ones

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod guard;

#[cfg(test)]
mod testing;

pub use dispatcher::{ActionDispatcher, ActionOutcome, DispatchResult, DispatchStatus};
pub use engine::{RuleEngine, RuleFailure, RunReport};
pub use error::EngineError;
pub use evaluator::is_valid;
pub use filter::{parse_filter, SearchFilter};
pub use guard::CallGuard;
