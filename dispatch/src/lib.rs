//! Verity Dispatch
//!
//! Constraint validator selection and invocation.
//!
//! Responsibilities:
//! - Define the `ConstraintValidator` trait and its invocation context
//! - Register candidate validators per constraint kind, rejecting
//!   ambiguous registrations eagerly
//! - Resolve the most specific validator for a runtime value kind and
//!   cache resolved instances
//! - Apply the null-validity policy and constraint composition
//!   (AND-combination, report-as-single-violation collapsing)
//! - Ship the built-in validators

pub mod builtin;
mod evaluate;
mod registry;
mod validator;

pub use evaluate::{ConstraintEvaluator, ConstraintFailure};
pub use registry::ValidatorRegistry;
pub use validator::{ConstraintValidator, SupportedType, ValidatorContext};
