//! Node collection along each supported axis.
//!
//! Results keep the order in which the axis visits nodes, with duplicates
//! (reachable from several context nodes) removed.

use crate::ast::Axis;
use crate::datasource::DataSourceNode;
use std::collections::HashSet;

struct Collector<N> {
    seen: HashSet<N>,
    out: Vec<N>,
}

impl<'a, N: DataSourceNode<'a>> Collector<N> {
    fn push(&mut self, node: N) {
        if self.seen.insert(node) {
            self.out.push(node);
        }
    }

    fn extend(&mut self, nodes: impl Iterator<Item = N>) {
        for node in nodes {
            self.push(node);
        }
    }

    fn descendants(&mut self, node: N) {
        for child in node.children() {
            self.push(child);
            self.descendants(child);
        }
    }
}

/// Collects every node reachable from `context_nodes` along `axis`.
pub fn collect<'a, N: DataSourceNode<'a>>(axis: Axis, context_nodes: &[N]) -> Vec<N> {
    let mut c = Collector {
        seen: HashSet::new(),
        out: Vec::new(),
    };

    for &node in context_nodes {
        match axis {
            Axis::SelfAxis => c.push(node),
            Axis::Child => c.extend(node.children()),
            Axis::Attribute => c.extend(node.attributes()),
            Axis::Descendant => c.descendants(node),
            Axis::DescendantOrSelf => {
                c.push(node);
                c.descendants(node);
            }
            Axis::Parent => c.extend(node.parent().into_iter()),
            Axis::Ancestor => c.extend(std::iter::successors(node.parent(), |p| p.parent())),
            Axis::FollowingSibling => {
                if let Some(parent) = node.parent() {
                    c.extend(parent.children().skip_while(|s| *s != node).skip(1));
                }
            }
            Axis::PrecedingSibling => {
                if let Some(parent) = node.parent() {
                    c.extend(parent.children().take_while(|s| *s != node));
                }
            }
        }
    }
    c.out
}
