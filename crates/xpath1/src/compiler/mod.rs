//! Compiles path expressions for the cursor layer.
//!
//! Any valid expression compiles and can be evaluated for reads. Paths in
//! the creatable subset additionally get a step chain describing what to
//! write when the location does not exist yet.

mod build;
mod grammar;
mod path;

pub use path::{CompiledPath, PathNode, PredicateNode, Step, ValueExpr};

use crate::error::XPathError;
use crate::parser::parse_expression;
use build::Builder;

/// Compiles `source`. Fails only when `source` is not a valid expression;
/// a valid but non-creatable path compiles with no steps.
pub fn compile(source: &str) -> Result<CompiledPath, XPathError> {
    let expression = parse_expression(source)?;

    let creatable = match grammar::path(source.trim()) {
        Ok(("", raw)) => Builder::default().build(raw).map_err(|e| e.0),
        Ok(_) | Err(_) => Err("unsupported syntax"),
    }
    .inspect_err(|reason| log::debug!("path '{}' is read-only: {}", source, reason));

    let (first_step, depth) = match creatable {
        Ok((first, depth)) => (Some(first), depth),
        Err(_) => (None, 0),
    };
    Ok(CompiledPath {
        source: source.to_string(),
        expression,
        first_step,
        depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn literal(s: &str) -> Option<ValueExpr> {
        Some(ValueExpr::Literal(s.to_string()))
    }

    #[rstest]
    #[case("aa", 1)]
    #[case("@aa", 1)]
    #[case("aa/bb", 2)]
    #[case("aa/@bb", 2)]
    #[case("aa/./bb", 2)]
    #[case("p:aa/q:bb", 2)]
    #[case("aa[bb]", 1)]
    #[case("aa[@bb]", 1)]
    #[case("aa[bb='1']", 1)]
    #[case("aa['1'=bb]", 1)]
    #[case("aa[bb=$cc]", 1)]
    #[case("aa[$cc=bb]", 1)]
    #[case("aa[.='1']", 1)]
    #[case("aa[bb and cc and dd]", 1)]
    #[case("aa[bb][cc]/dd", 2)]
    #[case("aa[bb/cc='x']", 1)]
    #[case("A[B='b']/C[D[E][F='f'] and G]/@H", 3)]
    fn creatable_paths(#[case] source: &str, #[case] depth: usize) {
        init();
        let path = compile(source).unwrap();
        assert!(path.is_creatable(), "{} should be creatable", source);
        assert_eq!(path.depth(), depth);
        assert_eq!(path.steps().count(), depth);
    }

    #[rstest]
    #[case("*")]
    #[case("@*")]
    #[case("a/*")]
    #[case("a[*]")]
    #[case("a[b/*]")]
    #[case("a:*")]
    #[case("@a/b")]
    #[case("a[@b/c]")]
    #[case("a[b or c]")]
    #[case("a[b=c]")]
    #[case("a[$b or c]")]
    #[case("a[$b=$c]")]
    #[case("a[.='1'][.='2']")]
    #[case("a[b[.='1']][.='2']")]
    #[case("f()")]
    #[case("/a")]
    #[case("a//b")]
    #[case("..")]
    #[case(".")]
    #[case("a[1]")]
    #[case("a[b!='1']")]
    #[case("@a[b]")]
    fn read_only_paths(#[case] source: &str) {
        init();
        let path = compile(source).unwrap();
        assert!(!path.is_creatable(), "{} should not be creatable", source);
        assert_eq!(path.depth(), 0);
        assert!(path.first_step().is_none());
        assert_eq!(path.source(), source);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("a[")]
    #[case("a/")]
    fn invalid_paths_fail(#[case] source: &str) {
        assert!(compile(source).is_err());
    }

    #[test]
    fn comparison_becomes_dependency_value() {
        let path = compile("aa[bb='1']").unwrap();
        let step = path.first_step().unwrap();
        assert_eq!(step.local_name, "aa");
        assert_eq!(step.value, None);
        assert_eq!(step.dependencies.len(), 1);
        assert_eq!(step.dependencies[0].local_name, "bb");
        assert_eq!(step.dependencies[0].value, literal("1"));
        assert!(!step.is_simple());
    }

    #[test]
    fn self_comparison_sets_step_value() {
        let path = compile("aa[.='1']").unwrap();
        let step = path.first_step().unwrap();
        assert_eq!(step.value, literal("1"));
        assert!(step.dependencies[0].is_self_reference());
        assert!(step.is_simple());
    }

    #[test]
    fn predicate_chains_carry_value_on_last_node() {
        let path = compile("aa[bb/p:cc=$v:dd]").unwrap();
        let dep = &path.first_step().unwrap().dependencies[0];
        assert_eq!(dep.local_name, "bb");
        assert_eq!(dep.value, None);
        let next = dep.next.as_deref().unwrap();
        assert_eq!(next.prefix.as_deref(), Some("p"));
        assert_eq!(next.local_name, "cc");
        assert_eq!(
            next.value,
            Some(ValueExpr::Variable {
                prefix: Some("v".into()),
                local_name: "dd".into()
            })
        );
    }

    #[test]
    fn nested_predicates_are_kept_in_order() {
        let path = compile("A[B='b']/C[D[E][F='f'] and G]/@H").unwrap();
        let c = path.step(1).unwrap();
        assert_eq!(c.local_name, "C");
        let names: Vec<_> = c.dependencies.iter().map(|d| d.local_name.as_str()).collect();
        assert_eq!(names, ["D", "G"]);
        let d_deps: Vec<_> = c.dependencies[0]
            .dependencies
            .iter()
            .map(|d| (d.local_name.as_str(), d.value.clone()))
            .collect();
        assert_eq!(d_deps, [("E", None), ("F", literal("f"))]);
        let h = path.last_step().unwrap();
        assert!(h.is_attribute);
        assert!(h.next.is_none());
    }

    #[test]
    fn steps_keep_their_own_source() {
        let path = compile("aa[.='1'] / @bb").unwrap();
        let sources: Vec<_> = path.steps().map(|s| s.source.as_str()).collect();
        assert_eq!(sources, ["aa[.='1']", "@bb"]);
    }

    #[test]
    fn compiling_is_pure() {
        let source = "A[B='b']/C[D[E][F='f'] and G]/@H";
        assert_eq!(compile(source).unwrap(), compile(source).unwrap());
    }
}
