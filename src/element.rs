//! The SSP element contract
//!
//! Every typed standard element converts to a fresh `xmltree::Element` and can be
//! rebuilt from one. Reading reports what was wrong (tag, attribute, child or
//! value) instead of falling back to defaults.

use std::str::FromStr;

use xmltree::{Element, Namespace, XMLNode};

use crate::error::{Result, SspError};
use crate::namespace::SspNamespace;

/// Conversion between a typed SSP element and its XML tree
pub trait SspElement: Sized {
    /// Build a new element tree from the current state
    fn to_element(&self) -> Element;

    /// Rebuild a value from an element tree
    fn from_element(element: &Element) -> Result<Self>;
}

/// Qualified name of an element for diagnostics, e.g. `ssc:Item`
pub fn qualified_name(element: &Element) -> String {
    let prefix = element
        .namespace
        .as_deref()
        .and_then(SspNamespace::from_uri)
        .map(|ns| ns.prefix())
        .or(element.prefix.as_deref());

    match prefix {
        Some(prefix) => format!("{}:{}", prefix, element.name),
        None => element.name.clone(),
    }
}

/// Fail unless `element` is `<ns:local_name>`
pub fn expect_tag(element: &Element, ns: SspNamespace, local_name: &str) -> Result<()> {
    if ns.matches(element, local_name) {
        Ok(())
    } else {
        Err(SspError::UnexpectedTag {
            expected: format!("{}:{}", ns.prefix(), local_name),
            found: qualified_name(element),
        })
    }
}

pub fn optional_attribute<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

pub fn required_attribute<'a>(element: &'a Element, name: &str) -> Result<&'a str> {
    optional_attribute(element, name).ok_or_else(|| SspError::MissingAttribute {
        element: qualified_name(element),
        attribute: name.to_string(),
    })
}

/// Parse a required attribute with `FromStr`
pub fn parse_attribute<T>(element: &Element, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = required_attribute(element, name)?;
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid_value(element, name, raw, e.to_string()))
}

/// Parse an optional attribute with `FromStr`
pub fn parse_optional_attribute<T>(element: &Element, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_attribute(element, name) {
        Some(_) => parse_attribute(element, name).map(Some),
        None => Ok(None),
    }
}

/// `xs:double` spells the special values INF, -INF and NaN
pub fn format_xs_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let spelled = if value > 0.0 { "INF" } else { "-INF" };
        spelled.to_string()
    } else {
        value.to_string()
    }
}

/// Parse an `xs:boolean` lexical value
pub fn parse_xs_boolean(element: &Element, name: &str) -> Result<bool> {
    let raw = required_attribute(element, name)?;
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid_value(element, name, raw, "expected xs:boolean")),
    }
}

pub fn invalid_value(
    element: &Element,
    attribute: &str,
    value: &str,
    reason: impl Into<String>,
) -> SspError {
    SspError::InvalidValue {
        element: qualified_name(element),
        attribute: attribute.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Child elements, skipping text, comments and processing instructions
pub fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(XMLNode::as_element)
}

/// Child elements named `ns:local_name`, in document order
pub fn children_named<'a>(
    element: &'a Element,
    ns: SspNamespace,
    local_name: &'a str,
) -> impl Iterator<Item = &'a Element> {
    child_elements(element).filter(move |child| ns.matches(child, local_name))
}

pub fn find_child<'a>(element: &'a Element, ns: SspNamespace, local_name: &str) -> Option<&'a Element> {
    child_elements(element).find(|child| ns.matches(child, local_name))
}

pub fn required_child<'a>(
    element: &'a Element,
    ns: SspNamespace,
    local_name: &str,
) -> Result<&'a Element> {
    find_child(element, ns, local_name).ok_or_else(|| SspError::MissingChild {
        element: qualified_name(element),
        child: format!("{}:{}", ns.prefix(), local_name),
    })
}

/// Append `child` to `parent`
pub fn push_child(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}

/// Attributes and child elements a typed model does not interpret.
///
/// Collected when reading and written back unchanged, so a document can be
/// read and saved without losing content the model has no field for. Children
/// are written after the modelled ones. Prefix declarations outside the SSP
/// namespaces are kept too, so attributes like `xsi:schemaLocation` stay bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unrecognized {
    pub namespaces: Vec<(String, String)>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Unrecognized {
    /// Everything on `element` outside `known_attributes` and the children
    /// accepted by `is_known`
    pub fn collect(
        element: &Element,
        known_attributes: &[&str],
        is_known: impl Fn(&Element) -> bool,
    ) -> Self {
        let namespaces = element
            .namespaces
            .iter()
            .flat_map(|declared| declared.0.iter())
            .filter(|(prefix, uri)| is_foreign_declaration(prefix, uri))
            .map(|(prefix, uri)| (prefix.clone(), uri.clone()))
            .collect();

        Self {
            namespaces,
            attributes: element
                .attributes
                .iter()
                .filter(|(name, _)| !known_attributes.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            children: child_elements(element)
                .filter(|child| !is_known(child))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.attributes.is_empty() && self.children.is_empty()
    }

    /// Write the kept prefix declarations and attributes onto `element`
    pub fn write_attributes(&self, element: &mut Element) {
        if !self.namespaces.is_empty() {
            let declared = element.namespaces.get_or_insert_with(Namespace::empty);
            for (prefix, uri) in &self.namespaces {
                declared.put(prefix.as_str(), uri.as_str());
            }
        }
        for (name, value) in &self.attributes {
            element.attributes.insert(name.clone(), value.clone());
        }
    }

    pub fn append_children(&self, element: &mut Element) {
        for child in &self.children {
            push_child(element, child.clone());
        }
    }
}

fn is_foreign_declaration(prefix: &str, uri: &str) -> bool {
    !uri.is_empty()
        && prefix != "xml"
        && prefix != "xmlns"
        && SspNamespace::from_uri(uri).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: &str) -> Element {
        let mut element = SspNamespace::Ssc.element("Item");
        element.attributes.insert("name".to_string(), "A".to_string());
        element.attributes.insert("value".to_string(), value.to_string());
        element
    }

    #[test]
    fn test_expect_tag_reports_found_name() {
        let err = expect_tag(&item("0"), SspNamespace::Ssc, "Enumeration").unwrap_err();
        match err {
            SspError::UnexpectedTag { expected, found } => {
                assert_eq!(expected, "ssc:Enumeration");
                assert_eq!(found, "ssc:Item");
            }
            other => panic!("Expected UnexpectedTag, got {:?}", other),
        }
    }

    #[test]
    fn test_namespace_mismatch_is_rejected() {
        let element = SspNamespace::Ssv.element("Item");
        assert!(expect_tag(&element, SspNamespace::Ssc, "Item").is_err());
    }

    #[test]
    fn test_parse_attribute() {
        let value: i32 = parse_attribute(&item("7"), "value").unwrap();
        assert_eq!(value, 7);

        let err = parse_attribute::<i32>(&item("seven"), "value").unwrap_err();
        assert!(matches!(err, SspError::InvalidValue { .. }));

        let err = parse_attribute::<i32>(&item("1"), "missing").unwrap_err();
        assert!(matches!(err, SspError::MissingAttribute { .. }));
    }

    #[test]
    fn test_required_child() {
        let mut parent = SspNamespace::Ssc.element("Enumeration");
        assert!(required_child(&parent, SspNamespace::Ssc, "Item").is_err());

        push_child(&mut parent, item("1"));
        let child = required_child(&parent, SspNamespace::Ssc, "Item").unwrap();
        assert_eq!(optional_attribute(child, "value"), Some("1"));
    }

    #[test]
    fn test_parse_optional_attribute() {
        assert_eq!(parse_optional_attribute::<i32>(&item("3"), "value").unwrap(), Some(3));
        assert_eq!(parse_optional_attribute::<i32>(&item("3"), "kg").unwrap(), None);
        assert!(parse_optional_attribute::<i32>(&item("x"), "value").is_err());
    }

    #[test]
    fn test_unrecognized_content_is_written_back() {
        let mut source = SspNamespace::Ssc.element("Enumeration");
        source.attributes.insert("name".to_string(), "Modes".to_string());
        source
            .attributes
            .insert("xsi:schemaLocation".to_string(), "a b".to_string());
        let mut declared = Namespace::empty();
        declared.put("xsi", "http://www.w3.org/2001/XMLSchema-instance");
        declared.put("ssc", SspNamespace::Ssc.uri());
        declared.put("xml", "http://www.w3.org/XML/1998/namespace");
        source.namespaces = Some(declared);
        push_child(&mut source, item("0"));
        push_child(&mut source, Element::new("VendorData"));

        let other = Unrecognized::collect(&source, &["name"], |child| {
            SspNamespace::Ssc.matches(child, "Item")
        });
        assert_eq!(
            other.attributes,
            vec![("xsi:schemaLocation".to_string(), "a b".to_string())]
        );
        assert_eq!(
            other.namespaces,
            vec![(
                "xsi".to_string(),
                "http://www.w3.org/2001/XMLSchema-instance".to_string()
            )]
        );
        assert_eq!(other.children.len(), 1);
        assert_eq!(other.children[0].name, "VendorData");

        let mut rebuilt = SspNamespace::Ssc.element("Enumeration");
        other.write_attributes(&mut rebuilt);
        other.append_children(&mut rebuilt);
        assert_eq!(optional_attribute(&rebuilt, "xsi:schemaLocation"), Some("a b"));
        assert_eq!(
            rebuilt.namespaces.as_ref().and_then(|ns| ns.get("xsi")),
            Some("http://www.w3.org/2001/XMLSchema-instance")
        );
        assert!(find_child_named(&rebuilt, "VendorData"));
        assert!(Unrecognized::default().is_empty());
    }

    fn find_child_named(element: &Element, name: &str) -> bool {
        child_elements(element).any(|child| child.name == name)
    }
}
