//! System Structure Parameter Values (`.ssv`) documents

use xmltree::Element;

use crate::common::{Annotations, BaseElement, Enumerations, TopLevelMetaData, Units};
use crate::element::{
    child_elements, children_named, expect_tag, find_child, format_xs_double, optional_attribute,
    parse_attribute, parse_xs_boolean, push_child, qualified_name, required_attribute,
    required_child, SspElement, Unrecognized,
};
use crate::error::{Result, SspError};
use crate::file::{SspDocument, SspFile};
use crate::namespace::SspNamespace;
use crate::SSP_VERSION;

/// An `.ssv` file
pub type ParameterValuesFile = SspFile<ParameterSet>;

/// The typed value of one parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Real { value: f64, unit: Option<String> },
    Integer(i32),
    Boolean(bool),
    String(String),
    Enumeration { value: String, name: Option<String> },
    /// Hex-encoded binary data
    Binary {
        value: String,
        mime_type: Option<String>,
    },
}

impl ParameterValue {
    /// Local name of the element carrying this value, e.g. `Real`
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::Real { .. } => "Real",
            ParameterValue::Integer(_) => "Integer",
            ParameterValue::Boolean(_) => "Boolean",
            ParameterValue::String(_) => "String",
            ParameterValue::Enumeration { .. } => "Enumeration",
            ParameterValue::Binary { .. } => "Binary",
        }
    }

    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssv.element(self.type_name());
        let mut set = |name: &str, value: String| {
            element.attributes.insert(name.to_string(), value);
        };

        match self {
            ParameterValue::Real { value, unit } => {
                set("value", format_xs_double(*value));
                if let Some(unit) = unit {
                    set("unit", unit.clone());
                }
            }
            ParameterValue::Integer(value) => set("value", value.to_string()),
            ParameterValue::Boolean(value) => set("value", value.to_string()),
            ParameterValue::String(value) => set("value", value.clone()),
            ParameterValue::Enumeration { value, name } => {
                set("value", value.clone());
                if let Some(name) = name {
                    set("name", name.clone());
                }
            }
            ParameterValue::Binary { value, mime_type } => {
                if let Some(mime_type) = mime_type {
                    set("mime-type", mime_type.clone());
                }
                set("value", value.clone());
            }
        }
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        let is = |name: &str| SspNamespace::Ssv.matches(element, name);
        let optional = |name: &str| optional_attribute(element, name).map(str::to_string);

        if is("Real") {
            Ok(ParameterValue::Real {
                value: parse_attribute(element, "value")?,
                unit: optional("unit"),
            })
        } else if is("Integer") {
            Ok(ParameterValue::Integer(parse_attribute(element, "value")?))
        } else if is("Boolean") {
            Ok(ParameterValue::Boolean(parse_xs_boolean(element, "value")?))
        } else if is("String") {
            Ok(ParameterValue::String(
                required_attribute(element, "value")?.to_string(),
            ))
        } else if is("Enumeration") {
            Ok(ParameterValue::Enumeration {
                value: required_attribute(element, "value")?.to_string(),
                name: optional("name"),
            })
        } else if is("Binary") {
            Ok(ParameterValue::Binary {
                value: required_attribute(element, "value")?.to_string(),
                mime_type: optional("mime-type"),
            })
        } else {
            Err(SspError::UnexpectedTag {
                expected: "ssv:Real|Integer|Boolean|String|Enumeration|Binary".to_string(),
                found: qualified_name(element),
            })
        }
    }
}

/// An `ssv:Parameter`
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub base_element: BaseElement,
    pub name: String,
    pub value: ParameterValue,
    pub annotations: Annotations,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            base_element: BaseElement::default(),
            name: name.into(),
            value,
            annotations: Annotations::new(),
        }
    }
}

impl SspElement for Parameter {
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssv.element("Parameter");
        self.base_element.write_attributes(&mut element);
        element
            .attributes
            .insert("name".to_string(), self.name.clone());
        push_child(&mut element, self.value.to_element());
        self.annotations.append_to(&mut element);
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssv, "Parameter")?;

        let value = child_elements(element)
            .find(|child| !SspNamespace::Ssc.matches(child, "Annotations"))
            .ok_or_else(|| SspError::MissingChild {
                element: qualified_name(element),
                child: "parameter value".to_string(),
            })?;
        let annotations = match find_child(element, SspNamespace::Ssc, "Annotations") {
            Some(child) => Annotations::from_element(child)?,
            None => Annotations::new(),
        };

        Ok(Self {
            base_element: BaseElement::from_attributes(element),
            name: required_attribute(element, "name")?.to_string(),
            value: ParameterValue::from_element(value)?,
            annotations,
        })
    }
}

/// Attributes of `ssv:ParameterSet` covered by the typed fields
const PARAMETER_SET_ATTRIBUTES: [&str; 10] = [
    "version",
    "name",
    "id",
    "description",
    "author",
    "fileversion",
    "copyright",
    "license",
    "generationTool",
    "generationDateAndTime",
];

/// The root `ssv:ParameterSet` of a parameter values file
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub base_element: BaseElement,
    pub metadata: TopLevelMetaData,
    pub version: String,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub enumerations: Enumerations,
    pub units: Units,
    pub annotations: Annotations,
    /// Content kept as read, e.g. `xsi:schemaLocation` or vendor elements
    pub unrecognized: Unrecognized,
}

impl ParameterSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base_element: BaseElement::default(),
            metadata: TopLevelMetaData::default(),
            version: SSP_VERSION.to_string(),
            name: name.into(),
            parameters: Vec::new(),
            enumerations: Enumerations::new(),
            units: Units::new(),
            annotations: Annotations::new(),
            unrecognized: Unrecognized::default(),
        }
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new("")
    }
}

impl SspElement for ParameterSet {
    fn to_element(&self) -> Element {
        let mut element = SspNamespace::Ssv.element("ParameterSet");
        element
            .attributes
            .insert("version".to_string(), self.version.clone());
        element
            .attributes
            .insert("name".to_string(), self.name.clone());
        self.base_element.write_attributes(&mut element);
        self.metadata.write_attributes(&mut element);
        self.unrecognized.write_attributes(&mut element);

        let mut parameters = SspNamespace::Ssv.element("Parameters");
        for parameter in &self.parameters {
            push_child(&mut parameters, parameter.to_element());
        }
        push_child(&mut element, parameters);

        self.enumerations.append_to(&mut element);
        self.units.append_to(&mut element);
        self.annotations.append_to(&mut element);
        self.unrecognized.append_children(&mut element);
        element
    }

    fn from_element(element: &Element) -> Result<Self> {
        expect_tag(element, SspNamespace::Ssv, "ParameterSet")?;

        let parameters = required_child(element, SspNamespace::Ssv, "Parameters")?;
        let parameters = children_named(parameters, SspNamespace::Ssv, "Parameter")
            .map(Parameter::from_element)
            .collect::<Result<Vec<_>>>()?;
        let enumerations = match find_child(element, SspNamespace::Ssc, "Enumerations") {
            Some(child) => Enumerations::from_element(child)?,
            None => Enumerations::new(),
        };
        let units = match find_child(element, SspNamespace::Ssc, "Units") {
            Some(child) => Units::from_element(child)?,
            None => Units::new(),
        };
        let annotations = match find_child(element, SspNamespace::Ssc, "Annotations") {
            Some(child) => Annotations::from_element(child)?,
            None => Annotations::new(),
        };
        let unrecognized = Unrecognized::collect(element, &PARAMETER_SET_ATTRIBUTES, |child| {
            SspNamespace::Ssv.matches(child, "Parameters")
                || SspNamespace::Ssc.matches(child, "Enumerations")
                || SspNamespace::Ssc.matches(child, "Units")
                || SspNamespace::Ssc.matches(child, "Annotations")
        });

        Ok(Self {
            base_element: BaseElement::from_attributes(element),
            metadata: TopLevelMetaData::from_attributes(element)?,
            version: required_attribute(element, "version")?.to_string(),
            name: required_attribute(element, "name")?.to_string(),
            parameters,
            enumerations,
            units,
            annotations,
            unrecognized,
        })
    }
}

impl SspDocument for ParameterSet {
    const IDENTIFIER: &'static str = "ssv";

    fn read(&mut self, root: &Element) -> Result<()> {
        *self = Self::from_element(root)?;
        Ok(())
    }

    fn write(&self) -> Result<Element> {
        Ok(self.to_element())
    }
}
