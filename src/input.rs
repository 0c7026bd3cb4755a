//! JSON input model and the rule set that maps it onto a graph

use builder::{RuleSet, TypedRule};
use model::{Category, Group, Link, Node, CONTAINS};
use serde::Deserialize;
use std::path::Path;

/// Link category for calls between components
pub const CALLS: &str = "Calls";

#[derive(Debug, Clone, Deserialize)]
pub struct Component {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Becomes the node category
    #[serde(default)]
    pub kind: Option<String>,
    /// Containing component, linked with a `Contains` link
    #[serde(default)]
    pub parent: Option<String>,
    /// Render as an expanded group
    #[serde(default)]
    pub container: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Call {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Input {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub calls: Vec<Call>,
}

impl Input {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Component and call rules, generic ones first so later rules refine them
pub fn rules() -> RuleSet {
    RuleSet::new()
        .with(TypedRule::<Component>::node("component", |c| {
            let mut node = Node::new(&c.id).with_label(c.label.as_deref().unwrap_or(&c.id));
            if let Some(kind) = &c.kind {
                node = node.with_category(kind);
            }
            Ok(node)
        }))
        .with(
            TypedRule::<Component>::node("container", |c| Ok(Node::new(&c.id).with_group(Group::Expanded)))
                .when(|c| c.container),
        )
        .with(
            TypedRule::<Component>::category("component-kind", |c| {
                let kind = c.kind.as_deref().unwrap_or_default();
                Ok(Category::new(kind).with_label(kind))
            })
            .when(|c| c.kind.is_some()),
        )
        .with(
            TypedRule::<Component>::link("containment", |c| {
                let parent = c
                    .parent
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("component {} has no parent", c.id))?;
                Ok(Link::new(parent, &c.id).with_category(CONTAINS))
            })
            .when(|c| c.parent.is_some()),
        )
        .with(TypedRule::<Call>::link("call", |c| {
            let mut link = Link::new(&c.from, &c.to).with_category(CALLS);
            if let Some(label) = &c.label {
                link = link.with_label(label);
            }
            Ok(link)
        }))
        .with(TypedRule::<Call>::category("call-kind", |_| {
            Ok(Category::new(CALLS).with_label(CALLS))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder::{build, Inputs};

    const SAMPLE: &str = r#"{
        "components": [
            {"id": "app", "container": true},
            {"id": "X", "label": "Parser", "kind": "service", "parent": "app"},
            {"id": "Y", "kind": "service", "parent": "app"},
            {"id": "Z"}
        ],
        "calls": [
            {"from": "X", "to": "Y", "label": "parse"},
            {"from": "Y", "to": "Z"}
        ]
    }"#;

    #[test]
    fn test_parse_defaults() {
        let input = Input::parse(r#"{"components": [{"id": "a"}]}"#).unwrap();
        assert_eq!(input.components.len(), 1);
        assert!(input.calls.is_empty());
        assert!(!input.components[0].container);
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(Input::parse("{").is_err());
    }

    #[test]
    fn test_rules_map_sample() {
        let input = Input::parse(SAMPLE).unwrap();
        let graph = build(
            &rules(),
            &Inputs::new()
                .collection(&input.components)
                .collection(&input.calls),
        )
        .unwrap();

        assert_eq!(graph.nodes().len(), 4);
        // two containment links + two calls
        assert_eq!(graph.links().len(), 4);
        assert_eq!(graph.categories().len(), 2);

        let app = graph.node("app").unwrap();
        assert_eq!(app.group, Some(Group::Expanded));
        assert_eq!(app.label.as_deref(), Some("app"));

        let x = graph.node("X").unwrap();
        assert_eq!(x.label.as_deref(), Some("Parser"));
        assert_eq!(x.category.as_deref(), Some("service"));

        assert!(graph.link("app", "X", Some(CONTAINS)).is_some());
        assert_eq!(
            graph.link("X", "Y", Some(CALLS)).unwrap().label.as_deref(),
            Some("parse")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Input::load(Path::new("/nonexistent/input.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
