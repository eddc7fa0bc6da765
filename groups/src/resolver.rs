//! Expansion of requested groups into ordered sequence units.

use std::collections::BTreeMap;

use verity_core::ConfigurationError;

use crate::{Group, GroupSequence};

/// One unit of group execution.
///
/// A unit derived from a registered sequence carries that sequence's
/// expanded groups in order and is fail-fast: a failure in one group
/// stops the remaining groups of the unit. A standalone group is a
/// single-group unit that never suppresses anything. Units are
/// independent of each other: a failed sequence unit has no effect on
/// later units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceUnit {
    sequence: Option<String>,
    groups: Vec<Group>,
}

impl SequenceUnit {
    fn single(group: Group) -> Self {
        Self {
            sequence: None,
            groups: vec![group],
        }
    }

    fn from_sequence(name: impl Into<String>, groups: Vec<Group>) -> Self {
        Self {
            sequence: Some(name.into()),
            groups,
        }
    }

    /// The groups of this unit, in execution order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Whether a failure in one group stops the remaining groups of
    /// this unit.
    pub fn fail_fast(&self) -> bool {
        self.sequence.is_some()
    }

    /// The sequence this unit was expanded from, if any.
    pub fn sequence_name(&self) -> Option<&str> {
        self.sequence.as_deref()
    }
}

/// Expands requested groups against the registered named sequences.
#[derive(Debug, Default)]
pub struct GroupResolver {
    sequences: BTreeMap<String, Vec<Group>>,
}

impl GroupResolver {
    /// Create a resolver with no registered sequences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named sequence.
    pub fn add_sequence(&mut self, sequence: GroupSequence) -> Result<(), ConfigurationError> {
        if sequence.members().is_empty() {
            return Err(ConfigurationError::EmptyGroupSequence(
                sequence.name().to_string(),
            ));
        }
        if self.sequences.contains_key(sequence.name()) {
            return Err(ConfigurationError::DuplicateGroupSequence(
                sequence.name().to_string(),
            ));
        }
        self.sequences
            .insert(sequence.name().to_string(), sequence.members().to_vec());
        Ok(())
    }

    /// Returns true if a sequence is registered under this name.
    pub fn is_sequence(&self, name: &str) -> bool {
        self.sequences.contains_key(name)
    }

    /// Expand a requested set of groups into ordered sequence units.
    ///
    /// An empty request is illegal. A group naming a registered sequence
    /// expands transitively; a sequence that reaches itself fails at the
    /// point of expansion. The implicit `Default` group stays a
    /// single-group unit here; its per-type redefinition is applied by
    /// the engine against each validated bean's own metadata.
    pub fn resolve(&self, requested: &[Group]) -> Result<Vec<SequenceUnit>, ConfigurationError> {
        if requested.is_empty() {
            return Err(ConfigurationError::EmptyGroupRequest);
        }

        let mut units = Vec::new();
        let mut seen = Vec::new();
        for group in requested {
            if seen.contains(group) {
                continue;
            }
            seen.push(group.clone());

            if !group.is_default() && self.is_sequence(group.name()) {
                let mut groups = Vec::new();
                let mut stack = Vec::new();
                self.expand(group.name(), &mut stack, &mut groups)?;
                units.push(SequenceUnit::from_sequence(group.name(), groups));
            } else {
                units.push(SequenceUnit::single(group.clone()));
            }
        }
        Ok(units)
    }

    fn expand(
        &self,
        name: &str,
        stack: &mut Vec<String>,
        out: &mut Vec<Group>,
    ) -> Result<(), ConfigurationError> {
        if stack.iter().any(|entry| entry == name) {
            return Err(ConfigurationError::GroupSequenceCycle(name.to_string()));
        }
        stack.push(name.to_string());
        // Registration guarantees the member list is non-empty.
        let members = &self.sequences[name];
        for member in members {
            if !member.is_default() && self.is_sequence(member.name()) {
                self.expand(member.name(), stack, out)?;
            } else if !out.contains(member) {
                out.push(member.clone());
            }
        }
        stack.pop();
        Ok(())
    }
}
