use model::{Category, Link, Node, Style};
use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt::Debug;

/// Graph piece produced by one rule invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Node(Node),
    Link(Link),
    Category(Category),
    Style(Style),
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Node(_) => FragmentKind::Node,
            Fragment::Link(_) => FragmentKind::Link,
            Fragment::Category(_) => FragmentKind::Category,
            Fragment::Style(_) => FragmentKind::Style,
        }
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Fragment::Node(node)
    }
}

impl From<Link> for Fragment {
    fn from(link: Link) -> Self {
        Fragment::Link(link)
    }
}

impl From<Category> for Fragment {
    fn from(category: Category) -> Self {
        Fragment::Category(category)
    }
}

impl From<Style> for Fragment {
    fn from(style: Style) -> Self {
        Fragment::Style(style)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Node,
    Link,
    Category,
    Style,
    Property,
}

/// Transformation rule over objects of one declared type
///
/// Implemented by [`TypedRule`]; implement it directly for custom matching.
pub trait Rule {
    /// Rule identity used in errors and logs
    fn name(&self) -> &str;

    /// Kind of fragment the rule produces
    fn kind(&self) -> FragmentKind;

    /// Declared element type name
    fn element_type(&self) -> &'static str;

    /// Type check plus guard; `Ok(false)` means the rule is skipped
    fn matches(&self, object: &dyn Any) -> anyhow::Result<bool>;

    fn produce(&self, object: &dyn Any) -> anyhow::Result<Vec<Fragment>>;

    /// Human readable form of a matched object, for error reports
    fn describe(&self, object: &dyn Any) -> String;
}

type Guard<T> = Box<dyn Fn(&T) -> anyhow::Result<bool>>;
type Produce<T> = Box<dyn Fn(&T) -> anyhow::Result<Vec<Fragment>>>;

/// Rule bound to the concrete type `T`
pub struct TypedRule<T> {
    name: String,
    kind: FragmentKind,
    guards: Vec<Guard<T>>,
    produce: Produce<T>,
}

impl<T: Any + Debug> TypedRule<T> {
    fn with_kind<P>(name: impl Into<String>, kind: FragmentKind, produce: P) -> Self
    where
        P: Fn(&T) -> anyhow::Result<Vec<Fragment>> + 'static,
    {
        Self {
            name: name.into(),
            kind,
            guards: Vec::new(),
            produce: Box::new(produce),
        }
    }

    /// One node per object
    pub fn node<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<Node> + 'static,
    {
        Self::with_kind(name, FragmentKind::Node, move |t| Ok(vec![f(t)?.into()]))
    }

    /// Zero or more nodes per object
    pub fn nodes<F, I>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<I> + 'static,
        I: IntoIterator<Item = Node>,
    {
        Self::with_kind(
            name,
            FragmentKind::Node,
            move |t| Ok(f(t)?.into_iter().map(Fragment::Node).collect()),
        )
    }

    pub fn link<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<Link> + 'static,
    {
        Self::with_kind(name, FragmentKind::Link, move |t| Ok(vec![f(t)?.into()]))
    }

    pub fn links<F, I>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<I> + 'static,
        I: IntoIterator<Item = Link>,
    {
        Self::with_kind(
            name,
            FragmentKind::Link,
            move |t| Ok(f(t)?.into_iter().map(Fragment::Link).collect()),
        )
    }

    pub fn category<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<Category> + 'static,
    {
        Self::with_kind(name, FragmentKind::Category, move |t| Ok(vec![f(t)?.into()]))
    }

    pub fn style<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<Style> + 'static,
    {
        Self::with_kind(name, FragmentKind::Style, move |t| Ok(vec![f(t)?.into()]))
    }

    /// Restrict the rule to objects accepted by `guard`. Guards accumulate.
    pub fn when<G>(self, guard: G) -> Self
    where
        G: Fn(&T) -> bool + 'static,
    {
        self.try_when(move |t| Ok(guard(t)))
    }

    /// Fallible guard; an error aborts the build
    pub fn try_when<G>(mut self, guard: G) -> Self
    where
        G: Fn(&T) -> anyhow::Result<bool> + 'static,
    {
        self.guards.push(Box::new(guard));
        self
    }
}

impl<T: Any + Debug> Rule for TypedRule<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> FragmentKind {
        self.kind
    }

    fn element_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn matches(&self, object: &dyn Any) -> anyhow::Result<bool> {
        let Some(t) = object.downcast_ref::<T>() else {
            return Ok(false);
        };
        for guard in &self.guards {
            if !guard(t)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn produce(&self, object: &dyn Any) -> anyhow::Result<Vec<Fragment>> {
        let t = object
            .downcast_ref::<T>()
            .ok_or_else(|| anyhow::anyhow!("object is not a {}", type_name::<T>()))?;
        (self.produce)(t)
    }

    fn describe(&self, object: &dyn Any) -> String {
        match object.downcast_ref::<T>() {
            Some(t) => truncate(&format!("{:?}", t), 200),
            None => "<foreign object>".to_string(),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Rules in registration order
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: impl Rule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.add(rule);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
