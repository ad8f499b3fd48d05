//! Declarative configuration of a typed view.
//!
//! A view is described by a list of behaviors, each naming one aspect of
//! how its type maps onto the document. They are resolved once, by
//! [`XmlMetadata::from_config`](crate::metadata::XmlMetadata::from_config).

use serde::{Deserialize, Serialize};
use xmlview_types::TypeKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behavior {
    /// The name of the document element when the view is the root.
    Root {
        local_name: String,
        #[serde(default)]
        namespace_uri: Option<String>,
    },
    /// The `xsi:type` written for the view's own type.
    Type {
        xsi_type: String,
        #[serde(default)]
        namespace_uri: Option<String>,
    },
    /// A subtype that may stand in for the view's type.
    Include {
        type_key: TypeKey,
        xsi_type: String,
        #[serde(default)]
        namespace_uri: Option<String>,
    },
    Namespace {
        prefix: String,
        namespace_uri: String,
        /// Declared on the document element when the root is created.
        #[serde(default)]
        is_root: bool,
    },
    /// A `$prefix:name` value usable in path predicates.
    Variable {
        #[serde(default)]
        prefix: Option<String>,
        local_name: String,
        value: String,
    },
    /// Where the view's nodes are found, relative to its parent.
    Path { expression: String },
}

/// Receives the behaviors of a view one at a time. Every method defaults to
/// ignoring its behavior.
pub trait BehaviorVisitor {
    fn visit_root(&mut self, _local_name: &str, _namespace_uri: Option<&str>) {}

    fn visit_type(&mut self, _xsi_type: &str, _namespace_uri: Option<&str>) {}

    fn visit_include(&mut self, _type_key: &TypeKey, _xsi_type: &str, _namespace_uri: Option<&str>) {}

    fn visit_namespace(&mut self, _prefix: &str, _namespace_uri: &str, _is_root: bool) {}

    fn visit_variable(&mut self, _prefix: Option<&str>, _local_name: &str, _value: &str) {}

    fn visit_path(&mut self, _expression: &str) {}
}

impl Behavior {
    pub fn accept<V: BehaviorVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Behavior::Root {
                local_name,
                namespace_uri,
            } => visitor.visit_root(local_name, namespace_uri.as_deref()),
            Behavior::Type {
                xsi_type,
                namespace_uri,
            } => visitor.visit_type(xsi_type, namespace_uri.as_deref()),
            Behavior::Include {
                type_key,
                xsi_type,
                namespace_uri,
            } => visitor.visit_include(type_key, xsi_type, namespace_uri.as_deref()),
            Behavior::Namespace {
                prefix,
                namespace_uri,
                is_root,
            } => visitor.visit_namespace(prefix, namespace_uri, *is_root),
            Behavior::Variable {
                prefix,
                local_name,
                value,
            } => visitor.visit_variable(prefix.as_deref(), local_name, value),
            Behavior::Path { expression } => visitor.visit_path(expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl BehaviorVisitor for Recorder {
        fn visit_namespace(&mut self, prefix: &str, namespace_uri: &str, is_root: bool) {
            self.0.push(format!("ns {}={} {}", prefix, namespace_uri, is_root));
        }

        fn visit_path(&mut self, expression: &str) {
            self.0.push(format!("path {}", expression));
        }
    }

    #[test]
    fn deserializes_tagged_variants() {
        let json = r#"[
            {"kind": "root", "local_name": "Order"},
            {"kind": "include", "type_key": "Rush", "xsi_type": "RushOrder", "namespace_uri": "urn:o"},
            {"kind": "variable", "local_name": "v", "value": "1"},
            {"kind": "path", "expression": "Items/Item"}
        ]"#;
        let behaviors: Vec<Behavior> = serde_json::from_str(json).unwrap();
        assert_eq!(
            behaviors[0],
            Behavior::Root {
                local_name: "Order".into(),
                namespace_uri: None
            }
        );
        assert_eq!(
            behaviors[1],
            Behavior::Include {
                type_key: TypeKey::new("Rush"),
                xsi_type: "RushOrder".into(),
                namespace_uri: Some("urn:o".into())
            }
        );
        assert!(matches!(&behaviors[2], Behavior::Variable { prefix: None, .. }));
        assert!(serde_json::from_str::<Behavior>(r#"{"kind": "unknown"}"#).is_err());
    }

    #[test]
    fn visitor_sees_only_what_it_handles() {
        let behaviors = [
            Behavior::Namespace {
                prefix: "o".into(),
                namespace_uri: "urn:o".into(),
                is_root: true,
            },
            Behavior::Type {
                xsi_type: "T".into(),
                namespace_uri: None,
            },
            Behavior::Path {
                expression: "a/b".into(),
            },
        ];
        let mut recorder = Recorder::default();
        for behavior in &behaviors {
            behavior.accept(&mut recorder);
        }
        assert_eq!(recorder.0, ["ns o=urn:o true", "path a/b"]);
    }
}
