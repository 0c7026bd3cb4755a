use crate::value::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link category reserved for parent/child grouping
pub const CONTAINS: &str = "Contains";

/// Container state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    Expanded,
    Collapsed,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Expanded => "Expanded",
            Group::Collapsed => "Collapsed",
        }
    }
}

/// Graph node - identity key is `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(skip_serializing_if = "Properties::is_empty", default)]
    pub properties: Properties,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            category: None,
            group: None,
            properties: Properties::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Overwrite fields present in `other`, keep the rest
    pub(crate) fn merge_from(&mut self, other: Node) {
        overwrite(&mut self.label, other.label);
        overwrite(&mut self.category, other.category);
        overwrite(&mut self.group, other.group);
        self.properties.extend(other.properties);
    }
}

/// Graph link - identity key is (source, target, category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Properties::is_empty", default)]
    pub properties: Properties,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            category: None,
            label: None,
            properties: Properties::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Whether this link expresses containment rather than a reference
    pub fn is_containment(&self) -> bool {
        self.category.as_deref() == Some(CONTAINS)
    }

    pub(crate) fn merge_from(&mut self, other: Link) {
        overwrite(&mut self.label, other.label);
        self.properties.extend(other.properties);
    }
}

/// Link/node classification - identity key is `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
    #[serde(skip_serializing_if = "Properties::is_empty", default)]
    pub properties: Properties,
}

impl Category {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            based_on: None,
            properties: Properties::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn based_on(mut self, parent: impl Into<String>) -> Self {
        self.based_on = Some(parent.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub(crate) fn merge_from(&mut self, other: Category) {
        overwrite(&mut self.label, other.label);
        overwrite(&mut self.based_on, other.based_on);
        self.properties.extend(other.properties);
    }
}

/// Declared type of a custom property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Double,
    Int32,
    Boolean,
}

impl DataType {
    /// Type name used by graph viewers
    pub fn markup_name(&self) -> &'static str {
        match self {
            DataType::String => "System.String",
            DataType::Double => "System.Double",
            DataType::Int32 => "System.Int32",
            DataType::Boolean => "System.Boolean",
        }
    }
}

/// Custom property registration - identity key is `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub id: String,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyDeclaration {
    pub fn new(id: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            data_type,
            label: None,
            description: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn merge_from(&mut self, other: PropertyDeclaration) {
        self.data_type = other.data_type;
        overwrite(&mut self.label, other.label);
        overwrite(&mut self.description, other.description);
    }
}

/// Element kind a style applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleTarget {
    Node,
    Link,
}

impl StyleTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleTarget::Node => "Node",
            StyleTarget::Link => "Link",
        }
    }
}

/// Property-equals match condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub property: String,
    pub value: PropertyValue,
}

impl Condition {
    pub fn equals(property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Viewer expression, e.g. `IsReferenced = False` or `Kind = 'service'`
    pub fn expression(&self) -> String {
        match &self.value {
            PropertyValue::String(s) => format!("{} = '{}'", self.property, s),
            other => format!("{} = {}", self.property, other),
        }
    }

    /// Evaluate against a property bag
    pub fn matches(&self, properties: &Properties) -> bool {
        properties.get(&self.property) == Some(&self.value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SetterValue {
    Value(String),
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setter {
    pub property: String,
    pub value: SetterValue,
}

/// Conditional visual rule. Styles have no identity and are never deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub target: StyleTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_label: Option<String>,
    pub conditions: Vec<Condition>,
    pub setters: Vec<Setter>,
}

impl Style {
    pub fn new(target: StyleTarget) -> Self {
        Self {
            target,
            group_label: None,
            value_label: None,
            conditions: Vec::new(),
            setters: Vec::new(),
        }
    }

    pub fn with_group_label(mut self, label: impl Into<String>) -> Self {
        self.group_label = Some(label.into());
        self
    }

    pub fn with_value_label(mut self, label: impl Into<String>) -> Self {
        self.value_label = Some(label.into());
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn set(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.setters.push(Setter {
            property: property.into(),
            value: SetterValue::Value(value.into()),
        });
        self
    }

    pub fn set_expression(mut self, property: impl Into<String>, expression: impl Into<String>) -> Self {
        self.setters.push(Setter {
            property: property.into(),
            value: SetterValue::Expression(expression.into()),
        });
        self
    }

    /// Whether all conditions hold for the given property bag
    pub fn applies_to(&self, properties: &Properties) -> bool {
        self.conditions.iter().all(|c| c.matches(properties))
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
