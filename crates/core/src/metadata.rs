//! Resolved configuration of a typed view.

use crate::behavior::{Behavior, BehaviorVisitor};
use crate::context::XmlContext;
use crate::cursor::{DirectCursor, PathCursor, ReadOnlyCursor, XmlCursor};
use crate::error::CursorError;
use crate::flags::CursorFlags;
use crate::node::{RealNode, XmlNode};
use serde::{Deserialize, Serialize};
use xmlview_dom::Document;
use xmlview_types::{IncludedType, IncludedTypeSet, KnownType, KnownTypeSet, TypeKey, XmlName};
use xmlview_xpath1::{CompiledPath, compile};

/// Flags of the cursor a view opens on its parent.
pub const ROOT_FLAGS: CursorFlags = CursorFlags::ELEMENTS.union(CursorFlags::MUTABLE);

/// The serialized form of a view's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub type_key: TypeKey,
    #[serde(default)]
    pub behaviors: Vec<Behavior>,
}

impl ViewConfig {
    pub fn new(type_key: impl Into<TypeKey>) -> Self {
        Self {
            type_key: type_key.into(),
            behaviors: Vec::new(),
        }
    }

    pub fn with(mut self, behavior: Behavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Collects behaviors in order; later `Root` and `Path` entries win.
#[derive(Default)]
struct Collector {
    root: Option<XmlName>,
    xsi_type: Option<XmlName>,
    includes: Vec<IncludedType>,
    namespaces: Vec<(String, String, bool)>,
    variables: Vec<(Option<String>, String, String)>,
    path: Option<String>,
}

impl BehaviorVisitor for Collector {
    fn visit_root(&mut self, local_name: &str, namespace_uri: Option<&str>) {
        if let Some(previous) = &self.root {
            log::warn!("root {} overridden by {}", previous, local_name);
        }
        self.root = Some(XmlName::new(local_name, namespace_uri));
    }

    fn visit_type(&mut self, xsi_type: &str, namespace_uri: Option<&str>) {
        if self.xsi_type.is_some() {
            log::warn!("xsi type overridden by {}", xsi_type);
        }
        self.xsi_type = Some(XmlName::new(xsi_type, namespace_uri));
    }

    fn visit_include(&mut self, type_key: &TypeKey, xsi_type: &str, namespace_uri: Option<&str>) {
        self.includes
            .push(IncludedType::new(XmlName::new(xsi_type, namespace_uri), type_key.clone()));
    }

    fn visit_namespace(&mut self, prefix: &str, namespace_uri: &str, is_root: bool) {
        self.namespaces
            .push((prefix.to_string(), namespace_uri.to_string(), is_root));
    }

    fn visit_variable(&mut self, prefix: Option<&str>, local_name: &str, value: &str) {
        self.variables.push((
            prefix.map(str::to_string),
            local_name.to_string(),
            value.to_string(),
        ));
    }

    fn visit_path(&mut self, expression: &str) {
        if let Some(previous) = &self.path {
            log::warn!("path '{}' overridden by '{}'", previous, expression);
        }
        self.path = Some(expression.to_string());
    }
}

/// Everything a view needs to find, create and type its nodes.
#[derive(Debug, Clone)]
pub struct XmlMetadata {
    type_key: TypeKey,
    root_name: XmlName,
    xsi_type: XmlName,
    included: IncludedTypeSet,
    known: KnownTypeSet,
    context: XmlContext,
    path: Option<CompiledPath>,
}

impl XmlMetadata {
    pub fn from_config(config: &ViewConfig) -> Result<Self, CursorError> {
        let mut collector = Collector::default();
        for behavior in &config.behaviors {
            behavior.accept(&mut collector);
        }

        let type_key = config.type_key.clone();
        let root_name = collector
            .root
            .unwrap_or_else(|| XmlName::local(default_local_name(&type_key)));
        let xsi_type = collector.xsi_type.unwrap_or_default();

        let mut included = IncludedTypeSet::new(IncludedType::new(xsi_type.clone(), type_key.clone()));
        for include in collector.includes {
            included.include(include);
        }
        let known = KnownTypeSet::new(KnownType::new(root_name.clone(), xsi_type.clone(), type_key.clone()));

        let mut context = XmlContext::new();
        for (prefix, uri, is_root) in &collector.namespaces {
            context.add_namespace(prefix, uri, *is_root);
        }
        for (prefix, local_name, value) in &collector.variables {
            context.add_variable(prefix.as_deref(), local_name, value)?;
        }

        let path = collector.path.as_deref().map(compile).transpose()?;
        log::debug!(
            "resolved view {} (root {}, {} included type(s))",
            type_key,
            root_name,
            included.iter().count()
        );
        Ok(Self {
            type_key,
            root_name,
            xsi_type,
            included,
            known,
            context,
            path,
        })
    }

    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    pub fn root_name(&self) -> &XmlName {
        &self.root_name
    }

    pub fn xsi_type(&self) -> &XmlName {
        &self.xsi_type
    }

    pub fn included_types(&self) -> &IncludedTypeSet {
        &self.included
    }

    pub fn known_types(&self) -> &KnownTypeSet {
        &self.known
    }

    pub fn context(&self) -> &XmlContext {
        &self.context
    }

    pub fn path(&self) -> Option<&CompiledPath> {
        self.path.as_ref()
    }

    /// The document element of `doc` as a view of this type, created when
    /// the document is empty.
    pub fn ensure_root(&self, doc: &mut Document) -> Result<RealNode, CursorError> {
        if let Some(element) = doc.document_element() {
            let name = doc.name(element);
            if !self.root_name.matches(name.local_name(), name.namespace_uri()) {
                return Err(CursorError::invalid(format!(
                    "document element {} is not {}",
                    name, self.root_name
                )));
            }
            return Ok(RealNode::new(doc, element, self.type_key.clone()));
        }

        let prefix = self.root_name.effective_namespace().and_then(|ns| {
            self.context
                .root_namespaces()
                .find(|b| b.uri == ns)
                .map(|b| b.prefix.clone())
        });
        let root = doc.root();
        let mut writer = doc.write_children(root)?;
        writer.start_element(&self.root_name, prefix.as_deref())?;
        writer.end_element()?;
        let element = writer
            .finish()?
            .first()
            .copied()
            .ok_or_else(|| CursorError::invalid("document element was not created"))?;
        for binding in self.context.root_namespaces() {
            doc.declare_namespace(element, Some(&binding.prefix), &binding.uri)?;
        }
        if !self.xsi_type.is_empty() {
            doc.set_xsi_type(element, &self.xsi_type)?;
        }
        log::debug!("created document element {}", self.root_name);
        Ok(RealNode::new(doc, element, self.type_key.clone()))
    }

    /// Opens the cursor over this view's node below `parent`: along the
    /// configured path, or over the matching children when there is none.
    pub fn select_base<'a>(&'a self, parent: &'a mut dyn XmlNode) -> Result<Box<dyn XmlCursor + 'a>, CursorError> {
        self.open(parent, ROOT_FLAGS)
    }

    /// Like [`select_base`](Self::select_base), for a view with many nodes.
    pub fn select_all<'a>(&'a self, parent: &'a mut dyn XmlNode) -> Result<Box<dyn XmlCursor + 'a>, CursorError> {
        self.open(parent, ROOT_FLAGS | CursorFlags::MULTIPLE)
    }

    fn open<'a>(
        &'a self,
        parent: &'a mut dyn XmlNode,
        flags: CursorFlags,
    ) -> Result<Box<dyn XmlCursor + 'a>, CursorError> {
        match &self.path {
            Some(path) if path.is_creatable() => Ok(Box::new(PathCursor::new(
                parent,
                path,
                &self.included,
                &self.context,
                flags,
            )?)),
            Some(path) => {
                log::debug!("'{}' is read-only; opening a read-only cursor", path);
                let read_only = CursorFlags::ELEMENTS
                    | if flags.allows_multiple() {
                        CursorFlags::MULTIPLE
                    } else {
                        CursorFlags::NONE
                    };
                Ok(Box::new(ReadOnlyCursor::new(
                    parent,
                    path,
                    &self.included,
                    &self.context,
                    read_only,
                )))
            }
            None => Ok(Box::new(DirectCursor::new(parent, &self.known, flags))),
        }
    }
}

/// `app::model::Order` becomes `Order`.
fn default_local_name(type_key: &TypeKey) -> &str {
    type_key
        .as_str()
        .rsplit("::")
        .next()
        .unwrap_or(type_key.as_str())
}
