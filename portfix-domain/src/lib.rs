//! Domain logic: what a valid migration plan is, and what the oracle is asked.
//!
//! This crate owns the plan contract and the text of every oracle request. It performs no I/O;
//! talking to the oracle, the build tool and the disk is `portfix-core`'s job.

mod fence;
mod prompts;
mod validate;

pub use fence::{strip_fence, wrap_fence};
pub use prompts::{LanguagePair, OracleRequest, plan_request, repair_request, translation_request};
pub use validate::{
    ValidateOptions, ValidationError, contained_target, validate_plan, validate_plan_with,
};
