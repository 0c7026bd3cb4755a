use crate::types::{Category, Link, Node, PropertyDeclaration, Style};
use crate::value::PropertyValue;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("node id must not be empty")]
    EmptyNodeId,
    #[error("link endpoints must not be empty: '{from}' -> '{to}'")]
    EmptyLinkEndpoint { from: String, to: String },
    #[error("category id must not be empty")]
    EmptyCategoryId,
    #[error("property id must not be empty")]
    EmptyPropertyId,
    #[error("{element} property '{name}' is reserved or not a valid attribute name")]
    InvalidPropertyName { element: &'static str, name: String },
    #[error("style must have at least one setter")]
    EmptyStyle,
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("unknown link: {0}")]
    UnknownLink(LinkKey),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

const NODE_ATTRIBUTES: &[&str] = &["Id", "Label", "Category", "Group"];
const LINK_ATTRIBUTES: &[&str] = &["Source", "Target", "Category", "Label"];
const CATEGORY_ATTRIBUTES: &[&str] = &["Id", "Label", "BasedOn"];

/// XML attribute name without namespace prefix
fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name != "xmlns" && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn check_property_name(element: &'static str, reserved: &[&str], name: &str) -> Result<()> {
    if reserved.contains(&name) || !is_attribute_name(name) {
        return Err(GraphError::InvalidPropertyName {
            element,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn check_properties<'a>(
    element: &'static str,
    reserved: &[&str],
    mut names: impl Iterator<Item = &'a String>,
) -> Result<()> {
    names.try_for_each(|name| check_property_name(element, reserved, name))
}

/// Identity key of a link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub source: String,
    pub target: String,
    pub category: Option<String>,
}

impl LinkKey {
    pub fn new(source: &str, target: &str, category: Option<&str>) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            category: category.map(str::to_string),
        }
    }

    pub fn of(link: &Link) -> Self {
        Self {
            source: link.source.clone(),
            target: link.target.clone(),
            category: link.category.clone(),
        }
    }
}

impl std::fmt::Display for LinkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.category {
            Some(c) => write!(f, "{} -[{}]-> {}", self.source, c, self.target),
            None => write!(f, "{} -> {}", self.source, self.target),
        }
    }
}

/// Outcome of adding an identified element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Inserted,
    /// An element with the same identity existed and was refined in place
    Updated,
}

/// Graph document
///
/// Element order is first-insertion order; merging into an existing element never moves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    categories: Vec<Category>,
    properties: Vec<PropertyDeclaration>,
    styles: Vec<Style>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    #[serde(skip)]
    link_index: HashMap<LinkKey, usize>,
    #[serde(skip)]
    category_index: HashMap<String, usize>,
    #[serde(skip)]
    property_index: HashMap<String, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<Merge> {
        if node.id.is_empty() {
            return Err(GraphError::EmptyNodeId);
        }
        check_properties("node", NODE_ATTRIBUTES, node.properties.keys())?;
        match self.node_index.get(&node.id) {
            Some(&idx) => {
                self.nodes[idx].merge_from(node);
                Ok(Merge::Updated)
            }
            None => {
                self.node_index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
                Ok(Merge::Inserted)
            }
        }
    }

    pub fn add_link(&mut self, link: Link) -> Result<Merge> {
        if link.source.is_empty() || link.target.is_empty() {
            return Err(GraphError::EmptyLinkEndpoint {
                from: link.source,
                to: link.target,
            });
        }
        check_properties("link", LINK_ATTRIBUTES, link.properties.keys())?;
        let key = LinkKey::of(&link);
        match self.link_index.get(&key) {
            Some(&idx) => {
                self.links[idx].merge_from(link);
                Ok(Merge::Updated)
            }
            None => {
                self.link_index.insert(key, self.links.len());
                self.links.push(link);
                Ok(Merge::Inserted)
            }
        }
    }

    pub fn add_category(&mut self, category: Category) -> Result<Merge> {
        if category.id.is_empty() {
            return Err(GraphError::EmptyCategoryId);
        }
        check_properties("category", CATEGORY_ATTRIBUTES, category.properties.keys())?;
        match self.category_index.get(&category.id) {
            Some(&idx) => {
                self.categories[idx].merge_from(category);
                Ok(Merge::Updated)
            }
            None => {
                self.category_index.insert(category.id.clone(), self.categories.len());
                self.categories.push(category);
                Ok(Merge::Inserted)
            }
        }
    }

    pub fn declare_property(&mut self, declaration: PropertyDeclaration) -> Result<Merge> {
        if declaration.id.is_empty() {
            return Err(GraphError::EmptyPropertyId);
        }
        match self.property_index.get(&declaration.id) {
            Some(&idx) => {
                self.properties[idx].merge_from(declaration);
                Ok(Merge::Updated)
            }
            None => {
                self.property_index.insert(declaration.id.clone(), self.properties.len());
                self.properties.push(declaration);
                Ok(Merge::Inserted)
            }
        }
    }

    /// Styles are appended as-is; a style needs at least one setter
    pub fn add_style(&mut self, style: Style) -> Result<()> {
        if style.setters.is_empty() {
            return Err(GraphError::EmptyStyle);
        }
        self.styles.push(style);
        Ok(())
    }

    pub fn set_node_property(&mut self, id: &str, name: &str, value: PropertyValue) -> Result<()> {
        check_property_name("node", NODE_ATTRIBUTES, name)?;
        let idx = *self
            .node_index
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        self.nodes[idx].properties.insert(name.to_string(), value);
        Ok(())
    }

    pub fn set_link_property(&mut self, key: &LinkKey, name: &str, value: PropertyValue) -> Result<()> {
        check_property_name("link", LINK_ATTRIBUTES, name)?;
        let idx = *self
            .link_index
            .get(key)
            .ok_or_else(|| GraphError::UnknownLink(key.clone()))?;
        self.links[idx].properties.insert(name.to_string(), value);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn link(&self, source: &str, target: &str, category: Option<&str>) -> Option<&Link> {
        self.link_index
            .get(&LinkKey::new(source, target, category))
            .map(|&idx| &self.links[idx])
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index.get(id).map(|&idx| &self.categories[idx])
    }

    pub fn property(&self, id: &str) -> Option<&PropertyDeclaration> {
        self.property_index.get(id).map(|&idx| &self.properties[idx])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn properties(&self) -> &[PropertyDeclaration] {
        &self.properties
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.links.is_empty()
            && self.categories.is_empty()
            && self.properties.is_empty()
            && self.styles.is_empty()
    }

    /// Custom properties used on nodes or links without a declaration, sorted
    pub fn undeclared_properties(&self) -> Vec<String> {
        let used: BTreeSet<&String> = self
            .nodes
            .iter()
            .flat_map(|n| n.properties.keys())
            .chain(self.links.iter().flat_map(|l| l.properties.keys()))
            .collect();

        used.into_iter()
            .filter(|name| !self.property_index.contains_key(*name))
            .cloned()
            .collect()
    }

    /// Links whose source or target has no node (viewers create those implicitly)
    pub fn dangling_links(&self) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| !self.node_index.contains_key(&l.source) || !self.node_index.contains_key(&l.target))
            .collect()
    }

    /// SHA256 over the ordered content (hex)
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
