//! Path construction and comparison.

use std::fmt;

/// Index qualifier on a node whose value came out of a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementIndex {
    /// Position within an ordered list.
    Position(usize),
    /// Key within a string-keyed map.
    Key(String),
}

impl fmt::Display for ElementIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementIndex::Position(i) => write!(f, "{}", i),
            ElementIndex::Key(k) => write!(f, "{}", k),
        }
    }
}

/// One node of a property path.
///
/// Property, parameter and return-value nodes carry an optional
/// container qualifier so that a violation inside `items` renders as
/// `items[1]` rather than as the container itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathNode {
    /// Bean property, optionally qualified with a list index or map key.
    Property {
        name: String,
        index: Option<ElementIndex>,
    },
    /// Method or constructor name seeding an executable path.
    Executable { name: String },
    /// Method or constructor parameter, rendered by declared name when
    /// one exists, `arg{i}` otherwise.
    Parameter {
        index: usize,
        name: Option<String>,
        element: Option<ElementIndex>,
    },
    /// Return value pseudo-node.
    ReturnValue { element: Option<ElementIndex> },
    /// Cross-parameter pseudo-node.
    CrossParameter,
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathNode::Property { name, index } => {
                write!(f, "{}", name)?;
                if let Some(index) = index {
                    write!(f, "[{}]", index)?;
                }
                Ok(())
            }
            PathNode::Executable { name } => write!(f, "{}", name),
            PathNode::Parameter { index, name, element } => {
                match name {
                    Some(name) => write!(f, "{}", name)?,
                    None => write!(f, "arg{}", index)?,
                }
                if let Some(element) = element {
                    write!(f, "[{}]", element)?;
                }
                Ok(())
            }
            PathNode::ReturnValue { element } => {
                write!(f, "<return value>")?;
                if let Some(element) = element {
                    write!(f, "[{}]", element)?;
                }
                Ok(())
            }
            PathNode::CrossParameter => write!(f, "<cross-parameter>"),
        }
    }
}

/// An immutable property path: the ordered list of nodes from the root
/// of a validation call down to a constrained value.
///
/// The root-level path is empty. Appending returns an extended copy;
/// a path captured by a violation is never mutated afterwards. Two
/// paths are equal iff their node sequences are equal element-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    nodes: Vec<PathNode>,
}

impl Path {
    /// The empty root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true if this is the empty root path.
    pub fn is_root(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes of this path, outermost first.
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the path has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn appended(&self, node: PathNode) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.push(node);
        Self { nodes }
    }

    /// Extend with a simple property node.
    pub fn property(&self, name: impl Into<String>) -> Self {
        self.appended(PathNode::Property {
            name: name.into(),
            index: None,
        })
    }

    /// Extend with an indexed property node (`name[i]`).
    pub fn indexed(&self, name: impl Into<String>, index: usize) -> Self {
        self.appended(PathNode::Property {
            name: name.into(),
            index: Some(ElementIndex::Position(index)),
        })
    }

    /// Extend with a keyed property node (`name[key]`).
    pub fn keyed(&self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.appended(PathNode::Property {
            name: name.into(),
            index: Some(ElementIndex::Key(key.into())),
        })
    }

    /// Extend with an executable-name node.
    pub fn executable(&self, name: impl Into<String>) -> Self {
        self.appended(PathNode::Executable { name: name.into() })
    }

    /// Extend with a parameter node.
    pub fn parameter(&self, index: usize, name: Option<&str>) -> Self {
        self.appended(PathNode::Parameter {
            index,
            name: name.map(str::to_string),
            element: None,
        })
    }

    /// Extend with a return-value node.
    pub fn return_value(&self) -> Self {
        self.appended(PathNode::ReturnValue { element: None })
    }

    /// Extend with the cross-parameter pseudo-node.
    pub fn cross_parameter(&self) -> Self {
        self.appended(PathNode::CrossParameter)
    }

    /// Extend with an arbitrary node.
    pub fn with_node(&self, node: PathNode) -> Self {
        self.appended(node)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}
