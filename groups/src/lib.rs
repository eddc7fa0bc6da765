//! Verity Groups
//!
//! Validation groups and group sequences.
//!
//! Responsibilities:
//! - Name validation groups, including the implicit `Default`
//! - Register named sequences and expand them transitively
//! - Produce ordered sequence units with the fail-fast distinction:
//!   groups inside a sequence stop on the first failing group, groups
//!   outside any sequence always run

mod group;
mod resolver;
mod sequence;

pub use group::{Group, DEFAULT_GROUP};
pub use resolver::{GroupResolver, SequenceUnit};
pub use sequence::GroupSequence;
