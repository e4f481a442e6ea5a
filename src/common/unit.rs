//! `ssc:Units`, `ssc:Unit` and `ssc:BaseUnit`

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::common::annotation::Annotations;
use crate::common::metadata::BaseElement;
use crate::element::{
    children_named, expect_tag, find_child, format_xs_double, parse_optional_attribute,
    push_child, required_attribute, required_child, SspElement,
};
use crate::error::Result;
use crate::namespace::SspNamespace;

/// SI base unit exponents plus an affine conversion
/// (`value_si = factor * value + offset`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseUnit {
    pub kg: i32,
    pub m: i32,
    pub s: i32,
    #[serde(rename = "A")]
    pub a: i32,
    #[serde(rename = "K")]
    pub k: i32,
    pub mol: i32,
    pub cd: i32,
    pub rad: i32,
    pub factor: f64,
    pub offset: f64,
}

impl Default for BaseUnit {
    fn default() -> Self {
        Self {
            kg: 0,
            m: 0,
            s: 0,
            a: 0,
            k: 0,
            mol: 0,
            cd: 0,
            rad: 0,
            factor: 1.0,
            offset: 0.0,
        }
    }
}

impl BaseUnit {
    fn exponents(&self) -> [(&'static str, i32); 8] {
        [
            ("kg", self.kg),
            ("m", self.m),
            ("s", self.s),
            ("A", self.a),
            ("K", self.k),
            ("mol", self.mol),
            ("cd", self.cd),
            ("rad", self.rad),
        ]
    }
}

impl SspElement for BaseUnit {
    /// Attributes equal to their schema default are left out
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssc.element("BaseUnit");
        for (name, exponent) in self.exponents() {
            if exponent != 0 {
                element
                    .attributes
                    .insert(name.to_string(), exponent.to_string());
            }
        }
        if self.factor != 1.0 {
            element
                .attributes
                .insert("factor".to_string(), format_xs_double(self.factor));
        }
        if self.offset != 0.0 {
            element
                .attributes
                .insert("offset".to_string(), format_xs_double(self.offset));
        }
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "BaseUnit")?;
        let exponent = |name: &str| -> Result<i32> {
            Ok(parse_optional_attribute(element, name)?.unwrap_or(0))
        };

        Ok(Self {
            kg: exponent("kg")?,
            m: exponent("m")?,
            s: exponent("s")?,
            a: exponent("A")?,
            k: exponent("K")?,
            mol: exponent("mol")?,
            cd: exponent("cd")?,
            rad: exponent("rad")?,
            factor: parse_optional_attribute(element, "factor")?.unwrap_or(1.0),
            offset: parse_optional_attribute(element, "offset")?.unwrap_or(0.0),
        })
    }
}

/// A named unit defined by its base unit
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub base_element: BaseElement,
    pub name: String,
    pub base_unit: BaseUnit,
    pub annotations: Annotations,
}

impl Unit {
    pub fn new(name: impl Into<String>, base_unit: BaseUnit) -> Self {
        Self {
            base_element: BaseElement::default(),
            name: name.into(),
            base_unit,
            annotations: Annotations::new(),
        }
    }
}

impl SspElement for Unit {
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssc.element("Unit");
        self.base_element.write_attributes(&mut element);
        element
            .attributes
            .insert("name".to_string(), self.name.clone());
        push_child(&mut element, self.base_unit.to_element());
        self.annotations.append_to(&mut element);
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "Unit")?;
        let base_unit = required_child(element, SspNamespace::Ssc, "BaseUnit")?;
        let annotations = match find_child(element, SspNamespace::Ssc, "Annotations") {
            Some(child) => Annotations::from_element(child)?,
            None => Annotations::new(),
        };

        Ok(Self {
            base_element: BaseElement::from_attributes(element),
            name: required_attribute(element, "name")?.to_string(),
            base_unit: BaseUnit::from_element(base_unit)?,
            annotations,
        })
    }
}

/// An `ssc:Units` container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Units {
    units: Vec<Unit>,
}

impl Units {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub(crate) fn append_to(&self, parent: &mut Element) {
        if !self.is_empty() {
            push_child(parent, self.to_element());
        }
    }
}

impl FromIterator<Unit> for Units {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

impl SspElement for Units {
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssc.element("Units");
        for unit in &self.units {
            push_child(&mut element, unit.to_element());
        }
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssc, "Units")?;
        children_named(element, SspNamespace::Ssc, "Unit")
            .map(Unit::from_element)
            .collect()
    }
}
