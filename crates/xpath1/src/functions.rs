//! Built-in XPath 1.0 functions.
//!
//! Only the core library subset that path predicates and `evaluate` queries
//! need is provided: node-set, string, boolean and number basics.

use super::engine::{EvaluationContext, XPathValue};
use crate::datasource::DataSourceNode;
use crate::error::XPathError;

fn arity_error(function: &str, expected: &str) -> XPathError {
    XPathError::FunctionError {
        function: format!("{}()", function),
        message: format!("Expected {}", expected),
    }
}

fn expect_args<N>(
    function: &str,
    args: &[XPathValue<N>],
    range: std::ops::RangeInclusive<usize>,
) -> Result<(), XPathError> {
    if range.contains(&args.len()) {
        return Ok(());
    }
    let expected = if range.start() == range.end() {
        format!("{} argument(s)", range.start())
    } else {
        format!("{} to {} arguments", range.start(), range.end())
    };
    Err(arity_error(function, &expected))
}

/// The string argument, or the context node's string value when omitted.
fn string_or_context<'a, N: DataSourceNode<'a>>(
    args: &mut Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> String {
    match args.pop() {
        Some(value) => value.to_string(),
        None => e_ctx.context_node.string_value(),
    }
}

/// The first node of the node-set argument, or the context node when omitted.
fn node_or_context<'a, N: DataSourceNode<'a>>(
    function: &str,
    args: &mut Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Option<N>, XPathError> {
    match args.pop() {
        None => Ok(Some(e_ctx.context_node)),
        Some(XPathValue::NodeSet(nodes)) => Ok(nodes.first().copied()),
        Some(_) => Err(XPathError::FunctionError {
            function: format!("{}()", function),
            message: "Argument must be a node-set".to_string(),
        }),
    }
}

/// Dispatches a function call to the correct implementation.
pub fn evaluate_function<'a, N: DataSourceNode<'a>>(
    name: &str,
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<N>, XPathError> {
    match name {
        // Node-set
        "count" => {
            expect_args(name, &args, 1..=1)?;
            match args.pop() {
                Some(XPathValue::NodeSet(nodes)) => Ok(XPathValue::Number(nodes.len() as f64)),
                _ => Err(XPathError::FunctionError {
                    function: "count()".to_string(),
                    message: "Argument must be a node-set".to_string(),
                }),
            }
        }
        "position" => {
            expect_args(name, &args, 0..=0)?;
            Ok(XPathValue::Number(e_ctx.context_position as f64))
        }
        "last" => {
            expect_args(name, &args, 0..=0)?;
            Ok(XPathValue::Number(e_ctx.context_size as f64))
        }
        "local-name" | "name" | "namespace-uri" => {
            expect_args(name, &args, 0..=1)?;
            let node = node_or_context(name, &mut args, e_ctx)?;
            let result = node.map(|n| match name {
                "namespace-uri" => n.namespace_uri().unwrap_or_default().to_string(),
                "local-name" => n.name().map(|q| q.local_part.to_string()).unwrap_or_default(),
                _ => n
                    .name()
                    .map(|q| match q.prefix {
                        Some(p) => format!("{}:{}", p, q.local_part),
                        None => q.local_part.to_string(),
                    })
                    .unwrap_or_default(),
            });
            Ok(XPathValue::String(result.unwrap_or_default()))
        }

        // String
        "string" => {
            expect_args(name, &args, 0..=1)?;
            Ok(XPathValue::String(string_or_context(&mut args, e_ctx)))
        }
        "concat" => {
            if args.len() < 2 {
                return Err(arity_error(name, "at least 2 arguments"));
            }
            Ok(XPathValue::String(args.iter().map(|a| a.to_string()).collect()))
        }
        "contains" | "starts-with" => {
            expect_args(name, &args, 2..=2)?;
            let needle = args.remove(1).to_string();
            let haystack = args.remove(0).to_string();
            Ok(XPathValue::Boolean(if name == "contains" {
                haystack.contains(&needle)
            } else {
                haystack.starts_with(&needle)
            }))
        }
        "string-length" => {
            expect_args(name, &args, 0..=1)?;
            let s = string_or_context(&mut args, e_ctx);
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            expect_args(name, &args, 0..=1)?;
            let s = string_or_context(&mut args, e_ctx);
            Ok(XPathValue::String(
                s.split_whitespace().collect::<Vec<_>>().join(" "),
            ))
        }

        // Boolean
        "boolean" => {
            expect_args(name, &args, 1..=1)?;
            Ok(XPathValue::Boolean(args[0].to_bool()))
        }
        "not" => {
            expect_args(name, &args, 1..=1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" | "false" => {
            expect_args(name, &args, 0..=0)?;
            Ok(XPathValue::Boolean(name == "true"))
        }

        // Number
        "number" => {
            expect_args(name, &args, 0..=1)?;
            let n = match args.pop() {
                Some(value) => value.to_number(),
                None => XPathValue::NodeSet(vec![e_ctx.context_node]).to_number(),
            };
            Ok(XPathValue::Number(n))
        }
        "sum" => {
            expect_args(name, &args, 1..=1)?;
            match args.pop() {
                Some(XPathValue::NodeSet(nodes)) => Ok(XPathValue::Number(
                    nodes
                        .iter()
                        .map(|n| XPathValue::<N>::String(n.string_value()).to_number())
                        .sum(),
                )),
                _ => Err(XPathError::FunctionError {
                    function: "sum()".to_string(),
                    message: "Argument must be a node-set".to_string(),
                }),
            }
        }
        "floor" | "ceiling" | "round" => {
            expect_args(name, &args, 1..=1)?;
            let n = args[0].to_number();
            Ok(XPathValue::Number(match name {
                "floor" => n.floor(),
                "ceiling" => n.ceil(),
                _ => (n + 0.5).floor(),
            }))
        }
        _ => Err(XPathError::FunctionError {
            function: name.to_string(),
            message: "Unknown XPath function".to_string(),
        }),
    }
}
