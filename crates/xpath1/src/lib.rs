//! XPath 1.0 for typed XML views: a read evaluator over any
//! [`DataSourceNode`] tree and a compiler that also recognizes the subset of
//! paths that can be created.

pub mod ast;
pub mod axes;
pub mod compiler;
pub mod context;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NameTest, NodeTest};
pub use compiler::{CompiledPath, PathNode, PredicateNode, Step, ValueExpr, compile};
pub use context::{EmptyContext, StaticContext, XML_NAMESPACE, split_qualified};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, XPathValue, evaluate};
pub use error::XPathError;
pub use parser::parse_expression;
