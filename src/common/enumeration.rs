//! `ssc:Enumerations`, `ssc:Enumeration` and `ssc:Item`

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::common::annotation::Annotations;
use crate::common::metadata::BaseElement;
use crate::element::{
    children_named, expect_tag, find_child, parse_attribute, push_child, required_attribute,
    required_child, SspElement,
};
use crate::error::Result;
use crate::namespace::SspNamespace;

/// One member of an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub value: i32,
}

impl Item {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl SspElement for Item {
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssc.element("Item");
        element
            .attributes
            .insert("name".to_string(), self.name.clone());
        element
            .attributes
            .insert("value".to_string(), self.value.to_string());
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "Item")?;
        Ok(Self {
            name: required_attribute(element, "name")?.to_string(),
            value: parse_attribute(element, "value")?,
        })
    }
}

/// A named, ordered set of integer-valued items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub base_element: BaseElement,
    pub name: String,
    pub items: Vec<Item>,
    pub annotations: Annotations,
}

impl Enumeration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base_element: BaseElement::default(),
            name: name.into(),
            items: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// Append an item, builder style
    pub fn with_item(mut self, name: impl Into<String>, value: i32) -> Self {
        self.items.push(Item::new(name, value));
        self
    }

    /// Look up the value of the item called `name`
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value)
    }
}

impl SspElement for Enumeration {
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssc.element("Enumeration");
        self.base_element.write_attributes(&mut element);
        element
            .attributes
            .insert("name".to_string(), self.name.clone());
        for item in &self.items {
            push_child(&mut element, item.to_element());
        }
        self.annotations.append_to(&mut element);
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "Enumeration")?;
        // At least one item is required.
        required_child(element, SspNamespace::Ssc, "Item")?;

        let items = children_named(element, SspNamespace::Ssc, "Item")
            .map(Item::from_element)
            .collect::<Result<Vec<_>>>()?;
        let annotations = match find_child(element, SspNamespace::Ssc, "Annotations") {
            Some(child) => Annotations::from_element(child)?,
            None => Annotations::new(),
        };

        Ok(Self {
            base_element: BaseElement::from_attributes(element),
            name: required_attribute(element, "name")?.to_string(),
            items,
            annotations,
        })
    }
}

/// An `ssc:Enumerations` container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumerations {
    enumerations: Vec<Enumeration>,
}

impl Enumerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_enumeration(&mut self, enumeration: Enumeration) {
        self.enumerations.push(enumeration);
    }

    pub fn is_empty(&self) -> bool {
        self.enumerations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.enumerations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enumeration> {
        self.enumerations.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Enumeration> {
        self.enumerations.iter().find(|e| e.name == name)
    }

    pub(crate) fn append_to(&self, parent: &mut Element) {
        if !self.is_empty() {
            push_child(parent, self.to_element());
        }
    }
}

impl FromIterator<Enumeration> for Enumerations {
    fn from_iter<I: IntoIterator<Item = Enumeration>>(iter: I) -> Self {
        Self {
            enumerations: iter.into_iter().collect(),
        }
    }
}

impl SspElement for Enumerations {
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssc.element("Enumerations");
        for enumeration in &self.enumerations {
            push_child(&mut element, enumeration.to_element());
        }
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "Enumerations")?;
        children_named(element, SspNamespace::Ssc, "Enumeration")
            .map(Enumeration::from_element)
            .collect()
    }
}
