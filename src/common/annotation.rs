//! `ssc:Annotation` and `ssc:Annotations`
//!
//! Annotations carry tool-specific content. The content of a single annotation
//! is unconstrained; the helpers here cover the common shapes (text, an
//! attribute-only element, or any pre-built element) without validating them.

use std::borrow::Cow;

use xmltree::{Element, XMLNode};

use crate::element::{children_named, expect_tag, push_child, required_attribute, SspElement};
use crate::error::Result;
use crate::namespace::SspNamespace;

/// A single `ssc:Annotation` with its required `type` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    root: Element,
}

impl Annotation {
    /// Create an annotation; `type_declaration` should be a non-empty normalized string
    pub fn new(type_declaration: impl Into<String>) -> Self {
        let mut root = SspNamespace::Ssc.element("Annotation");
        root.attributes
            .insert("type".to_string(), type_declaration.into());
        Self { root }
    }

    pub fn type_declaration(&self) -> &str {
        self.root
            .attributes
            .get("type")
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Append a pre-built child element
    pub fn add_element(&mut self, element: Element) {
        push_child(&mut self.root, element);
    }

    /// Set the text content, replacing any earlier text
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.root
            .children
            .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));
        self.root.children.insert(0, XMLNode::Text(text.into()));
    }

    /// Append a child element named `name` carrying only `attributes`
    pub fn add_dict<I, K, V>(&mut self, name: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut child = Element::new(name);
        for (key, value) in attributes {
            child.attributes.insert(key.into(), value.into());
        }
        push_child(&mut self.root, child);
    }

    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.root.get_text()
    }

    pub fn element(&self) -> &Element {
        &self.root
    }
}

impl SspElement for Annotation {
    fn to_element(&self) -> Element {
        self.root.clone()
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "Annotation")?;
        required_attribute(element, "type")?;
        Ok(Self {
            root: element.clone(),
        })
    }
}

/// An `ssc:Annotations` container
///
/// The standard does not allow an empty `ssc:Annotations` element in most places,
/// so check [`Annotations::is_empty`] before embedding one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    root: Element,
    count: usize,
}

impl Annotations {
    pub fn new() -> Self {
        Self {
            root: SspNamespace::Ssc.element("Annotations"),
            count: 0,
        }
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.count += 1;
        push_child(&mut self.root, annotation.root);
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// The annotations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Annotation> + '_ {
        children_named(&self.root, SspNamespace::Ssc, "Annotation").map(|element| Annotation {
            root: element.clone(),
        })
    }

    pub fn element(&self) -> &Element {
        &self.root
    }

    /// Append the container to `parent` unless it is empty
    pub(crate) fn append_to(&self, parent: &mut Element) {
        if !self.is_empty() {
            push_child(parent, self.to_element());
        }
    }
}

impl Default for Annotations {
    fn default() -> Self {
        Self::new()
    }
}

impl SspElement for Annotations {
    fn to_element(&self) -> Element {
        self.root.clone()
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "Annotations")?;
        let mut annotations = Annotations::new();
        for child in children_named(element, SspNamespace::Ssc, "Annotation") {
            annotations.add_annotation(Annotation::from_element(child)?);
        }
        Ok(annotations)
    }
}
