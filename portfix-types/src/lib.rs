//! Shared DTOs (schemas-as-code) for the portfix workspace.
//!
//! # Design constraints
//! - The plan type mirrors the JSON the oracle is asked to produce.
//! - Report types are serialized to disk; prefer adding optional fields over changing semantics.

pub mod attempt;
pub mod diagnostic;
pub mod plan;
pub mod report;
pub mod scan;
pub mod translate;

/// Schema identifiers.
pub mod schema {
    pub const PORTFIX_PLAN_V1: &str = "portfix.plan.v1";
    pub const PORTFIX_HEAL_V1: &str = "portfix.heal.v1";
}
