//! Group identities.

use std::fmt;

/// Name of the implicit default group.
pub const DEFAULT_GROUP: &str = "Default";

/// A named validation group.
///
/// A constraint runs only when one of its groups is requested. The
/// implicit `Default` group applies to every constraint that does not
/// name groups of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Group(String);

impl Group {
    /// Create a group from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The implicit default group.
    pub fn default_group() -> Self {
        Self(DEFAULT_GROUP.to_string())
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the implicit default group.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_GROUP
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::default_group()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Group {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Helper macro to build a group request.
///
/// `groups![]` expands to the implicit default group, matching the
/// common "no particular profile" call site.
#[macro_export]
macro_rules! groups {
    () => {
        vec![$crate::Group::default_group()]
    };
    ($($name:expr),+ $(,)?) => {
        vec![$($crate::Group::new($name)),+]
    };
}
