//! Eligibility rule engine: per-variant rules and the recursive resolver.
//!
//! The resolver dispatches each condition node to the rule that supports it
//! and recurses into combinators. Rules are pure over (condition, context,
//! clock); a wrong-shaped context value means not eligible, while a missing
//! rule is a wiring defect that always propagates as an error.

mod error;
mod resolver;
pub mod rules;

pub use error::EligibilityError;
pub use resolver::EligibilityResolver;
pub use rules::Rule;
