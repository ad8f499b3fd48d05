//! A `nom`-based parser for the XPath 1.0 expression language.

use super::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{map, map_res, opt, peek, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

// --- Main Public Parser ---

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    if input.trim().is_empty() {
        return Err(XPathError::XPathParse(
            input.to_string(),
            "Expression is empty".to_string(),
        ));
    }
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::XPathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(XPathError::XPathParse(input.to_string(), e.to_string())),
    }
}

// --- Combinators & Helpers ---

pub(crate) fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn build_binary_expr_parser<'a, F, G>(
    sub_expr_parser: F,
    op_parser: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &str| {
        let (input, mut left) = sub_expr_parser.clone().parse(input)?;
        let (input, remainder) =
            many0(pair(ws(op_parser.clone()), sub_expr_parser.clone())).parse(input)?;

        for (op, right) in remainder {
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

// --- Expression Parsers (in order of precedence) ---

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::Or, tag("or")).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::And, tag("and")).parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(and_expr, or_op)(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(equality_expr, and_op)(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Equals, tag("=")),
        value(BinaryOperator::NotEquals, tag("!=")),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::LessThanOrEqual, tag("<=")),
        value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
        value(BinaryOperator::LessThan, tag("<")),
        value(BinaryOperator::GreaterThan, tag(">")),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Plus, char('+')),
        value(BinaryOperator::Minus, char('-')),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Multiply, char('*')),
        value(BinaryOperator::Divide, tag("div")),
        value(BinaryOperator::Modulo, tag("mod")),
    ))
    .parse(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::Union, char('|')).parse(input)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(relational_expr, equality_op)(input)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(additive_expr, relational_op)(input)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(multiplicative_expr, additive_op)(input)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(unary_expr, multiplicative_op)(input)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    let (i, neg_op) = opt(ws(char('-'))).parse(input)?;
    let (i, expr) = union_expr(i)?;

    match neg_op {
        Some(_) => Ok((
            i,
            Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(expr),
            },
        )),
        None => Ok((i, expr)),
    }
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(path_expr, union_op)(input)
}

/// Parses either a primary expression (optionally followed by `/step`s) or a
/// plain location path. Primary expressions go first so that `count(A)` is
/// not read as a step named `count`.
fn path_expr(input: &str) -> IResult<&str, Expression> {
    let (i, start_expr) =
        alt((primary_expr, map(location_path, Expression::LocationPath))).parse(input)?;

    let (i, remainder_steps) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;

    if remainder_steps.is_empty() {
        return Ok((i, start_expr));
    }

    let (start_point, is_absolute, mut steps) = match start_expr {
        Expression::LocationPath(lp) => (lp.start_point, lp.is_absolute, lp.steps),
        other => (Some(Box::new(other)), false, vec![]),
    };
    push_steps(&mut steps, remainder_steps);

    Ok((
        i,
        Expression::LocationPath(LocationPath {
            start_point,
            is_absolute,
            steps,
        }),
    ))
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    ws(alt((
        variable_reference,
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    )))
    .parse(input)
}

// --- Literal Parsers ---

/// `Digits ('.' Digits?)? | '.' Digits`. Exponents and `inf`/`nan` are not
/// XPath numbers, so nom's float parser is deliberately not used here.
fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

pub(crate) fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn variable_reference(input: &str) -> IResult<&str, Expression> {
    map(preceded(char('$'), q_name), |name| {
        Expression::Variable(name.to_string())
    })
    .parse(input)
}

// --- Name and NodeTest Parsers ---

pub(crate) fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}')
}

pub(crate) fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start_char), take_while(is_name_char))).parse(input)
}

pub(crate) fn q_name(input: &str) -> IResult<&str, NameTest> {
    map(
        pair(nc_name, opt(preceded(char(':'), nc_name))),
        |(first, second)| match second {
            Some(local) => NameTest::new(Some(first), local),
            None => NameTest::new(None, first),
        },
    )
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    map(
        terminated(
            alt((
                tag("text"),
                tag("node"),
                tag("comment"),
                tag("processing-instruction"),
            )),
            pair(ws(char('(')), ws(char(')'))),
        ),
        |node_type: &str| match node_type {
            "text" => NodeTest::NodeType(NodeTypeTest::Text),
            "comment" => NodeTest::NodeType(NodeTypeTest::Comment),
            "processing-instruction" => NodeTest::NodeType(NodeTypeTest::ProcessingInstruction),
            _ => NodeTest::NodeType(NodeTypeTest::Node),
        },
    )
    .parse(input)
}

pub fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        value(NodeTest::Wildcard, tag("*")),
        map(terminated(nc_name, tag(":*")), |prefix| {
            NodeTest::NamespaceWildcard(prefix.to_string())
        }),
        node_type_test,
        map(q_name, NodeTest::Name),
    ))
    .parse(input)
}

// --- Path Parsers ---

fn axis(input: &str) -> IResult<&str, Axis> {
    terminated(
        alt((
            value(Axis::Child, tag("child")),
            value(Axis::DescendantOrSelf, tag("descendant-or-self")),
            value(Axis::Descendant, tag("descendant")),
            value(Axis::Attribute, tag("attribute")),
            value(Axis::Parent, tag("parent")),
            value(Axis::Ancestor, tag("ancestor")),
            value(Axis::SelfAxis, tag("self")),
            value(Axis::FollowingSibling, tag("following-sibling")),
            value(Axis::PrecedingSibling, tag("preceding-sibling")),
        )),
        tag("::"),
    )
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    let (i, (axis, node_test)) = ws(alt((
        value(
            (Axis::Parent, NodeTest::NodeType(NodeTypeTest::Node)),
            tag(".."),
        ),
        value(
            (Axis::SelfAxis, NodeTest::NodeType(NodeTypeTest::Node)),
            char('.'),
        ),
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| {
            (ax.unwrap_or(Axis::Child), nt)
        }),
    )))
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn descendant_or_self() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        node_test: NodeTest::NodeType(NodeTypeTest::Node),
        predicates: vec![],
    }
}

fn push_steps<'a>(steps: &mut Vec<Step>, remainder: Vec<(&'a str, Step)>) {
    for (sep, next_step) in remainder {
        if sep == "//" {
            steps.push(descendant_or_self());
        }
        steps.push(next_step);
    }
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    let (i, (is_absolute, mut steps)) = if let Ok((rem, _)) =
        tag::<&str, &str, nom::error::Error<&str>>("//")(input)
    {
        let (rem, step) = step(rem)?;
        (rem, (true, vec![descendant_or_self(), step]))
    } else if let Ok((rem, _)) = tag::<&str, &str, nom::error::Error<&str>>("/")(input) {
        match step(rem) {
            Ok((rem, first_step)) => (rem, (true, vec![first_step])),
            // A lone "/" selects the root.
            Err(_) => (rem, (true, vec![])),
        }
    } else {
        let (rem, first_step) = step(input)?;
        (rem, (false, vec![first_step]))
    };

    let (i, remainder) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;
    push_steps(&mut steps, remainder);

    Ok((
        i,
        LocationPath {
            start_point: None,
            is_absolute,
            steps,
        },
    ))
}

// --- Function Call Parser ---

fn function_call(input: &str) -> IResult<&str, Expression> {
    // The lookahead for '(' keeps a step name like 'foo' in 'foo/bar' from
    // being read as a call.
    let (i, name) = q_name(input)?;
    let (i, _) = peek(ws(char('('))).parse(i)?;

    if name.prefix.is_none()
        && matches!(
            name.local_name.as_str(),
            "text" | "node" | "comment" | "processing-instruction"
        )
    {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (i, _) = multispace0(i)?;
    let (i, args) = delimited(
        char('('),
        separated_list0(ws(char(',')), expression),
        char(')'),
    )
    .parse(i)?;

    Ok((
        i,
        Expression::FunctionCall {
            name: name.to_string(),
            args,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(name: &str) -> Step {
        Step {
            axis: Axis::Child,
            node_test: NodeTest::Name(NameTest::new(None, name)),
            predicates: vec![],
        }
    }

    fn relative(steps: Vec<Step>) -> Expression {
        Expression::LocationPath(LocationPath {
            start_point: None,
            is_absolute: false,
            steps,
        })
    }

    #[test]
    fn test_parse_simple_path() {
        let result = parse_expression("foo/bar").unwrap();
        assert_eq!(result, relative(vec![child("foo"), child("bar")]));
    }

    #[test]
    fn test_parse_prefixed_names() {
        let result = parse_expression("p:A/@q:B").unwrap();
        let Expression::LocationPath(lp) = result else {
            panic!("Expected location path");
        };
        assert_eq!(
            lp.steps[0].node_test,
            NodeTest::Name(NameTest::new(Some("p"), "A"))
        );
        assert_eq!(lp.steps[1].axis, Axis::Attribute);
        assert_eq!(
            lp.steps[1].node_test,
            NodeTest::Name(NameTest::new(Some("q"), "B"))
        );
    }

    #[test]
    fn test_parse_wildcards() {
        let Expression::LocationPath(lp) = parse_expression("a:*/@*").unwrap() else {
            panic!("Expected location path");
        };
        assert_eq!(lp.steps[0].node_test, NodeTest::NamespaceWildcard("a".into()));
        assert_eq!(lp.steps[1].node_test, NodeTest::Wildcard);
    }

    #[test]
    fn test_names_that_look_like_numbers() {
        // "Info" and "nan" must stay names, not floats.
        let result = parse_expression("Info/nan").unwrap();
        assert_eq!(result, relative(vec![child("Info"), child("nan")]));
        assert_eq!(parse_expression(".5").unwrap(), Expression::Number(0.5));
    }

    #[test]
    fn test_parse_unary_minus() {
        let result = parse_expression("10 - -5").unwrap();
        assert_eq!(
            result,
            Expression::BinaryOp {
                left: Box::new(Expression::Number(10.0)),
                op: BinaryOperator::Minus,
                right: Box::new(Expression::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: Box::new(Expression::Number(5.0))
                }),
            }
        );
    }

    #[test]
    fn test_parse_axes() {
        let Expression::LocationPath(lp) = parse_expression("following-sibling::foo").unwrap()
        else {
            panic!("Expected location path");
        };
        assert_eq!(lp.steps[0].axis, Axis::FollowingSibling);

        let Expression::LocationPath(lp) = parse_expression("../x").unwrap() else {
            panic!("Expected location path");
        };
        assert_eq!(lp.steps[0].axis, Axis::Parent);
    }

    #[test]
    fn test_parse_path_starting_with_variable() {
        let result = parse_expression("$p:var/foo").unwrap();
        assert_eq!(
            result,
            Expression::LocationPath(LocationPath {
                start_point: Some(Box::new(Expression::Variable("p:var".to_string()))),
                is_absolute: false,
                steps: vec![child("foo")],
            })
        );
    }

    #[test]
    fn test_parse_predicate_comparison() {
        let result = parse_expression("foo[@id = 'a']").unwrap();
        let attribute = Step {
            axis: Axis::Attribute,
            node_test: NodeTest::Name(NameTest::new(None, "id")),
            predicates: vec![],
        };
        let mut foo = child("foo");
        foo.predicates.push(Expression::BinaryOp {
            left: Box::new(relative(vec![attribute])),
            op: BinaryOperator::Equals,
            right: Box::new(Expression::Literal("a".into())),
        });
        assert_eq!(result, relative(vec![foo]));
    }

    #[test]
    fn test_parse_function_call() {
        let result = parse_expression("count(A)").unwrap();
        assert_eq!(
            result,
            Expression::FunctionCall {
                name: "count".into(),
                args: vec![relative(vec![child("A")])],
            }
        );
        assert!(parse_expression("para[position()=1]").unwrap().is_location_path());
    }

    #[test]
    fn test_parse_self_and_text() {
        let Expression::LocationPath(lp) = parse_expression(".").unwrap() else {
            panic!("Expected location path for '.'");
        };
        assert_eq!(lp.steps[0].axis, Axis::SelfAxis);

        let Expression::LocationPath(lp) = parse_expression("foo/text()").unwrap() else {
            panic!("Expected location path");
        };
        assert_eq!(lp.steps[1].node_test, NodeTest::NodeType(NodeTypeTest::Text));
    }

    #[test]
    fn test_parse_operator_precedence() {
        let result = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(
            result,
            Expression::BinaryOp {
                left: Box::new(Expression::Number(1.0)),
                op: BinaryOperator::Plus,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(Expression::Number(2.0)),
                    op: BinaryOperator::Multiply,
                    right: Box::new(Expression::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_parse_boolean_logic() {
        let result = parse_expression("a or b and c").unwrap();
        assert_eq!(
            result,
            Expression::BinaryOp {
                left: Box::new(relative(vec![child("a")])),
                op: BinaryOperator::Or,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(relative(vec![child("b")])),
                    op: BinaryOperator::And,
                    right: Box::new(relative(vec![child("c")])),
                }),
            }
        );
    }

    #[test]
    fn test_parse_descendant_or_self() {
        let result = parse_expression("//foo").unwrap();
        assert_eq!(
            result,
            Expression::LocationPath(LocationPath {
                start_point: None,
                is_absolute: true,
                steps: vec![descendant_or_self(), child("foo")],
            })
        );
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("a[").is_err());
        assert!(parse_expression("a]").is_err());
        assert!(parse_expression("'unterminated").is_err());
    }
}
