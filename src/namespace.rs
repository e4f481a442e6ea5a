//! SSP namespace registry
//!
//! The five SSP sub-standards each own one XML namespace with a canonical short
//! prefix. Trees are serialized with these prefixes by [`register_namespaces`],
//! which the writer applies to every document it emits.

use std::fmt;

use xmltree::{Element, Namespace, XMLNode};

/// One of the five SSP namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SspNamespace {
    /// System Structure Common
    Ssc,
    /// System Structure Parameter Values
    Ssv,
    /// System Structure Signal Dictionary
    Ssb,
    /// System Structure Parameter Mapping
    Ssm,
    /// System Structure Description
    Ssd,
}

impl SspNamespace {
    pub const ALL: [SspNamespace; 5] = [
        SspNamespace::Ssc,
        SspNamespace::Ssv,
        SspNamespace::Ssb,
        SspNamespace::Ssm,
        SspNamespace::Ssd,
    ];

    /// Canonical prefix used in serialized documents
    pub fn prefix(&self) -> &'static str {
        match self {
            SspNamespace::Ssc => "ssc",
            SspNamespace::Ssv => "ssv",
            SspNamespace::Ssb => "ssb",
            SspNamespace::Ssm => "ssm",
            SspNamespace::Ssd => "ssd",
        }
    }

    /// Namespace URI
    pub fn uri(&self) -> &'static str {
        match self {
            SspNamespace::Ssc => "http://ssp-standard.org/SSP1/SystemStructureCommon",
            SspNamespace::Ssv => "http://ssp-standard.org/SSP1/SystemStructureParameterValues",
            SspNamespace::Ssb => "http://ssp-standard.org/SSP1/SystemStructureSignalDictionary",
            SspNamespace::Ssm => "http://ssp-standard.org/SSP1/SystemStructureParameterMapping",
            SspNamespace::Ssd => "http://ssp-standard.org/SSP1/SystemStructureDescription",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.prefix() == prefix)
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.uri() == uri)
    }

    /// Create an empty element in this namespace, e.g. `ssc:Annotation`
    pub fn element(&self, local_name: &str) -> Element {
        let mut element = Element::new(local_name);
        element.prefix = Some(self.prefix().to_string());
        element.namespace = Some(self.uri().to_string());
        element
    }

    /// Whether `element` is `<prefix:local_name>` in this namespace
    pub fn matches(&self, element: &Element, local_name: &str) -> bool {
        if element.name != local_name {
            return false;
        }
        match element.namespace.as_deref() {
            Some(uri) => uri == self.uri(),
            None => element.prefix.as_deref() == Some(self.prefix()),
        }
    }
}

impl fmt::Display for SspNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// All five prefix declarations as an xml-rs namespace map
pub fn namespace_map() -> Namespace {
    let mut namespace = Namespace::empty();
    for ns in SspNamespace::ALL {
        namespace.put(ns.prefix(), ns.uri());
    }
    namespace
}

/// Declare the canonical SSP prefixes on `root` and rename SSP-namespaced
/// elements in the tree to those prefixes. Idempotent.
pub fn register_namespaces(root: &mut Element) {
    canonicalize(root);
    root.namespaces
        .get_or_insert_with(Namespace::empty)
        .0
        .extend(namespace_map().0);
}

fn canonicalize(element: &mut Element) {
    if let Some(ns) = element.namespace.as_deref().and_then(SspNamespace::from_uri) {
        element.prefix = Some(ns.prefix().to_string());
    }
    if let Some(declared) = element.namespaces.as_mut() {
        // Aliases of SSP URIs under foreign prefixes would be re-emitted as
        // redundant xmlns declarations.
        declared.0.retain(|prefix, uri| {
            SspNamespace::from_uri(uri).map_or(true, |ns| ns.prefix() == prefix)
        });
    }
    for child in element.children.iter_mut() {
        if let XMLNode::Element(child) = child {
            canonicalize(child);
        }
    }
}
