//! The compiled form of a creatable path: a chain of steps, each carrying
//! the predicate nodes that must hold for a match (and that are written when
//! the step is created).

use crate::ast::Expression;
use std::fmt;

/// A fixed comparison value: a string literal or a variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExpr {
    Literal(String),
    Variable {
        prefix: Option<String>,
        local_name: String,
    },
}

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpr::Literal(s) if s.contains('\'') => write!(f, "\"{}\"", s),
            ValueExpr::Literal(s) => write!(f, "'{}'", s),
            ValueExpr::Variable {
                prefix: Some(p),
                local_name,
            } => write!(f, "${}:{}", p, local_name),
            ValueExpr::Variable {
                prefix: None,
                local_name,
            } => write!(f, "${}", local_name),
        }
    }
}

/// The shape shared by steps and predicate nodes, which is all node
/// creation needs to know.
pub trait PathNode {
    fn prefix(&self) -> Option<&str>;
    /// Empty for a self-reference (`.`).
    fn local_name(&self) -> &str;
    fn is_attribute(&self) -> bool;
    /// The value the node must have, written as its content on creation.
    fn value(&self) -> Option<&ValueExpr>;
    fn dependencies(&self) -> &[PredicateNode];
    fn next_node(&self) -> Option<&dyn PathNode>;

    fn is_self_reference(&self) -> bool {
        self.local_name().is_empty()
    }

    /// A node with nothing below it but (at most) its own value.
    fn is_simple(&self) -> bool {
        self.next_node().is_none() && self.dependencies().iter().all(|d| d.is_self_reference())
    }
}

/// One `/`-separated segment of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub prefix: Option<String>,
    pub local_name: String,
    pub is_attribute: bool,
    /// Set from a `[.=value]` predicate.
    pub value: Option<ValueExpr>,
    pub dependencies: Vec<PredicateNode>,
    pub next: Option<Box<Step>>,
    /// The step's own source text, e.g. `A[B='b']`.
    pub source: String,
    /// `source` parsed for evaluation relative to the previous step's node.
    pub expression: Expression,
}

/// A node inside a predicate. Chained with `next` for `B/C` and nested
/// through its own `dependencies` for `B[C]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateNode {
    pub prefix: Option<String>,
    pub local_name: String,
    pub is_attribute: bool,
    pub value: Option<ValueExpr>,
    pub dependencies: Vec<PredicateNode>,
    pub next: Option<Box<PredicateNode>>,
}

impl PredicateNode {
    pub(crate) fn self_reference(value: Option<ValueExpr>) -> Self {
        Self {
            prefix: None,
            local_name: String::new(),
            is_attribute: false,
            value,
            dependencies: Vec::new(),
            next: None,
        }
    }
}

macro_rules! impl_path_node {
    ($ty:ty) => {
        impl PathNode for $ty {
            fn prefix(&self) -> Option<&str> {
                self.prefix.as_deref()
            }
            fn local_name(&self) -> &str {
                &self.local_name
            }
            fn is_attribute(&self) -> bool {
                self.is_attribute
            }
            fn value(&self) -> Option<&ValueExpr> {
                self.value.as_ref()
            }
            fn dependencies(&self) -> &[PredicateNode] {
                &self.dependencies
            }
            fn next_node(&self) -> Option<&dyn PathNode> {
                self.next.as_deref().map(|n| n as &dyn PathNode)
            }
        }
    };
}

impl_path_node!(Step);
impl_path_node!(PredicateNode);

/// A parsed path expression.
///
/// Every compiled path can be evaluated for reads through `expression`.
/// Only a creatable path has a step chain, which describes exactly one tree
/// location and can be used to create it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPath {
    pub(crate) source: String,
    pub(crate) expression: Expression,
    pub(crate) first_step: Option<Step>,
    pub(crate) depth: usize,
}

impl CompiledPath {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn first_step(&self) -> Option<&Step> {
        self.first_step.as_ref()
    }

    /// Number of steps; 0 when the path is not creatable.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_creatable(&self) -> bool {
        self.first_step.is_some()
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        std::iter::successors(self.first_step.as_ref(), |s| s.next.as_deref())
    }

    /// The step at zero-based `index`.
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps().nth(index)
    }

    pub fn last_step(&self) -> Option<&Step> {
        self.steps().last()
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
