//! Binary operators: comparisons with XPath 1.0 node-set semantics,
//! arithmetic, and node-set union.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::engine::{XPathValue, parse_number};
use crate::error::XPathError;

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Scalar {
    fn to_number(&self) -> f64 {
        match self {
            Scalar::Str(s) => parse_number(s),
            Scalar::Num(n) => *n,
            Scalar::Bool(b) => f64::from(u8::from(*b)),
        }
    }

    fn to_bool(&self) -> bool {
        match self {
            Scalar::Str(s) => !s.is_empty(),
            Scalar::Num(n) => *n != 0.0 && !n.is_nan(),
            Scalar::Bool(b) => *b,
        }
    }
}

pub fn evaluate<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    match op {
        BinaryOperator::Or => Ok(XPathValue::Boolean(left.to_bool() || right.to_bool())),
        BinaryOperator::And => Ok(XPathValue::Boolean(left.to_bool() && right.to_bool())),
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => Ok(XPathValue::Boolean(compare(op, &left, &right))),
        BinaryOperator::Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        BinaryOperator::Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),
        BinaryOperator::Union => match (left, right) {
            (XPathValue::NodeSet(mut a), XPathValue::NodeSet(b)) => {
                a.extend(b);
                a.sort();
                a.dedup();
                Ok(XPathValue::NodeSet(a))
            }
            _ => Err(XPathError::TypeError(
                "The '|' operator requires node-set operands".to_string(),
            )),
        },
    }
}

/// Expands a value into the scalars a comparison ranges over. A node-set
/// contributes the string value of each member.
fn scalars<'a, N: DataSourceNode<'a>>(value: &XPathValue<N>) -> Vec<Scalar> {
    match value {
        XPathValue::NodeSet(nodes) => nodes.iter().map(|n| Scalar::Str(n.string_value())).collect(),
        XPathValue::String(s) => vec![Scalar::Str(s.clone())],
        XPathValue::Number(n) => vec![Scalar::Num(*n)],
        XPathValue::Boolean(b) => vec![Scalar::Bool(*b)],
    }
}

fn compare<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    // A node-set compared with a boolean is first converted to a boolean.
    let (left, right) = match (left, right) {
        (XPathValue::NodeSet(_), XPathValue::Boolean(_))
        | (XPathValue::Boolean(_), XPathValue::NodeSet(_)) => (
            vec![Scalar::Bool(left.to_bool())],
            vec![Scalar::Bool(right.to_bool())],
        ),
        _ => (scalars(left), scalars(right)),
    };

    left.iter()
        .any(|l| right.iter().any(|r| compare_scalars(op, l, r)))
}

fn compare_scalars(op: BinaryOperator, left: &Scalar, right: &Scalar) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (left, right) {
                (Scalar::Bool(_), _) | (_, Scalar::Bool(_)) => left.to_bool() == right.to_bool(),
                (Scalar::Num(_), _) | (_, Scalar::Num(_)) => left.to_number() == right.to_number(),
                (Scalar::Str(l), Scalar::Str(r)) => l == r,
            };
            equal == (op == BinaryOperator::Equals)
        }
        BinaryOperator::LessThan => left.to_number() < right.to_number(),
        BinaryOperator::LessThanOrEqual => left.to_number() <= right.to_number(),
        BinaryOperator::GreaterThan => left.to_number() > right.to_number(),
        BinaryOperator::GreaterThanOrEqual => left.to_number() >= right.to_number(),
        _ => false,
    }
}
