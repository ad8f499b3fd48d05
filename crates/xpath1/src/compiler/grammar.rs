//! The creatable subset of the path language, parsed into a flat syntax that
//! `build` turns into a step chain.
//!
//! ```text
//! path     := step ('/' step)*
//! step     := '.' | '@' qname preds | qname preds
//! preds    := ('[' and_expr ']')*
//! and_expr := term ('and' term)*
//! term     := path '=' value | value '=' path | path
//! value    := literal | '$' qname
//! ```

use super::path::ValueExpr;
use crate::ast::NameTest;
use crate::parser::{is_name_char, q_name, string_literal, ws};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, satisfy},
    combinator::{consumed, map, not, peek, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
};

#[derive(Debug, Clone, PartialEq)]
pub(super) enum StepHead {
    SelfRef,
    Element(NameTest),
    Attribute(NameTest),
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct RawStep<'s> {
    pub text: &'s str,
    pub head: StepHead,
    /// One entry per bracket, each a list of `and`-ed terms.
    pub predicates: Vec<Vec<RawTerm<'s>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum RawTerm<'s> {
    Exists(Vec<RawStep<'s>>),
    Compare(Vec<RawStep<'s>>, ValueExpr),
}

pub(super) fn path(input: &str) -> IResult<&str, Vec<RawStep<'_>>> {
    separated_list1(ws(char('/')), raw_step).parse(input)
}

fn raw_step(input: &str) -> IResult<&str, RawStep<'_>> {
    map(
        consumed(pair(ws(step_head), many0(predicate))),
        |(text, (head, predicates))| RawStep {
            text: text.trim(),
            head,
            predicates,
        },
    )
    .parse(input)
}

fn step_head(input: &str) -> IResult<&str, StepHead> {
    alt((
        value(StepHead::SelfRef, terminated(char('.'), not(char('.')))),
        map(preceded(char('@'), q_name), StepHead::Attribute),
        map(q_name, StepHead::Element),
    ))
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Vec<RawTerm<'_>>> {
    delimited(ws(char('[')), and_expr, ws(char(']'))).parse(input)
}

fn and_expr(input: &str) -> IResult<&str, Vec<RawTerm<'_>>> {
    separated_list1(and_keyword, term).parse(input)
}

fn and_keyword(input: &str) -> IResult<&str, &str> {
    ws(terminated(tag("and"), not(peek(satisfy(is_name_char))))).parse(input)
}

fn term(input: &str) -> IResult<&str, RawTerm<'_>> {
    alt((
        map(separated_pair(path, ws(char('=')), value_expr), |(p, v)| {
            RawTerm::Compare(p, v)
        }),
        map(separated_pair(value_expr, ws(char('=')), path), |(v, p)| {
            RawTerm::Compare(p, v)
        }),
        map(path, RawTerm::Exists),
    ))
    .parse(input)
}

fn value_expr(input: &str) -> IResult<&str, ValueExpr> {
    ws(alt((
        map(string_literal, ValueExpr::Literal),
        map(preceded(char('$'), q_name), |name| ValueExpr::Variable {
            prefix: name.prefix,
            local_name: name.local_name,
        }),
    )))
    .parse(input)
}
