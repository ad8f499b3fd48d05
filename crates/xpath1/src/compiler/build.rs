//! Turns parsed syntax into a step chain, rejecting shapes that do not name
//! exactly one creatable location.

use super::grammar::{RawStep, RawTerm, StepHead};
use super::path::{PathNode, PredicateNode, Step, ValueExpr};
use crate::ast::NameTest;
use crate::parser::parse_expression;

/// Why a syntactically valid path cannot be used for creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct NotCreatable(pub &'static str);

type Built<T> = Result<T, NotCreatable>;

#[derive(Default)]
pub(super) struct Builder {
    self_comparisons: usize,
}

impl Builder {
    pub fn build(mut self, raw: Vec<RawStep<'_>>) -> Built<(Step, usize)> {
        let mut steps = Vec::with_capacity(raw.len());
        for raw_step in raw {
            match &raw_step.head {
                StepHead::SelfRef if raw_step.predicates.is_empty() => continue,
                StepHead::SelfRef => return Err(NotCreatable("predicate on a self step")),
                StepHead::Element(name) | StepHead::Attribute(name) => {
                    let is_attribute = matches!(raw_step.head, StepHead::Attribute(_));
                    steps.push(self.step(name, is_attribute, &raw_step)?);
                }
            }
        }
        if self.self_comparisons > 1 {
            return Err(NotCreatable("more than one self comparison"));
        }

        let depth = steps.len();
        let mut chain: Option<Step> = None;
        for mut step in steps.into_iter().rev() {
            if step.is_attribute && chain.is_some() {
                return Err(NotCreatable("attribute step is not last"));
            }
            step.next = chain.map(Box::new);
            chain = Some(step);
        }
        chain
            .map(|first| (first, depth))
            .ok_or(NotCreatable("path has no named step"))
    }

    fn step(&mut self, name: &NameTest, is_attribute: bool, raw: &RawStep<'_>) -> Built<Step> {
        let dependencies = self.predicates(&raw.predicates)?;
        let expression =
            parse_expression(raw.text).map_err(|_| NotCreatable("step does not parse alone"))?;
        let mut step = Step {
            prefix: name.prefix.clone(),
            local_name: name.local_name.clone(),
            is_attribute,
            value: None,
            dependencies,
            next: None,
            source: raw.text.to_string(),
            expression,
        };
        step.value = take_self_value(&step.dependencies, None)?;
        check_attribute(&step)?;
        Ok(step)
    }

    fn predicates(&mut self, brackets: &[Vec<RawTerm<'_>>]) -> Built<Vec<PredicateNode>> {
        let mut dependencies: Vec<PredicateNode> = Vec::new();
        for term in brackets.iter().flatten() {
            let node = match term {
                RawTerm::Exists(operand) => self.chain(operand, None)?,
                RawTerm::Compare(operand, value) => self.chain(operand, Some(value.clone()))?,
            };
            if node.is_self_reference() && dependencies.iter().any(|d| d.is_self_reference()) {
                return Err(NotCreatable("second self reference in one predicate set"));
            }
            dependencies.push(node);
        }
        Ok(dependencies)
    }

    /// Builds the node chain for one predicate operand; `value` lands on the
    /// last node.
    fn chain(&mut self, operand: &[RawStep<'_>], value: Option<ValueExpr>) -> Built<PredicateNode> {
        let mut nodes = Vec::new();
        for raw in operand {
            match &raw.head {
                StepHead::SelfRef if raw.predicates.is_empty() => continue,
                StepHead::SelfRef => return Err(NotCreatable("predicate on a self step")),
                StepHead::Element(name) | StepHead::Attribute(name) => {
                    let dependencies = self.predicates(&raw.predicates)?;
                    nodes.push(PredicateNode {
                        prefix: name.prefix.clone(),
                        local_name: name.local_name.clone(),
                        is_attribute: matches!(raw.head, StepHead::Attribute(_)),
                        value: None,
                        dependencies,
                        next: None,
                    });
                }
            }
        }

        if nodes.is_empty() {
            if value.is_some() {
                self.self_comparisons += 1;
            }
            return Ok(PredicateNode::self_reference(value));
        }

        let mut chain: Option<PredicateNode> = None;
        let mut value = value;
        for mut node in nodes.into_iter().rev() {
            let own = take_self_value(&node.dependencies, value.take())?;
            node.value = own;
            if node.is_attribute && chain.is_some() {
                return Err(NotCreatable("attribute is not the last node of a predicate"));
            }
            node.next = chain.map(Box::new);
            check_attribute(&node)?;
            chain = Some(node);
        }
        chain.ok_or(NotCreatable("empty predicate operand"))
    }
}

/// Merges the value of a `[.=v]` dependency with a value assigned from
/// outside; two values for one node cannot both be written.
fn take_self_value(deps: &[PredicateNode], assigned: Option<ValueExpr>) -> Built<Option<ValueExpr>> {
    let from_self = deps
        .iter()
        .find(|d| d.is_self_reference())
        .and_then(|d| d.value.clone());
    match (assigned, from_self) {
        (Some(_), Some(_)) => Err(NotCreatable("conflicting values for one node")),
        (a, s) => Ok(a.or(s)),
    }
}

fn check_attribute(node: &dyn PathNode) -> Built<()> {
    if node.is_attribute() && node.dependencies().iter().any(|d| !d.is_self_reference()) {
        return Err(NotCreatable("attribute with child predicates"));
    }
    Ok(())
}
