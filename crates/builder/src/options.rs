use crate::rule::FragmentKind;
use serde::Serialize;

/// Build configuration
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Fail the build when a node or link property has no declaration
    pub require_declarations: bool,
    /// Log identity collisions at warn level instead of debug
    pub warn_on_collision: bool,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_require_declarations(mut self, require: bool) -> Self {
        self.require_declarations = require;
        self
    }

    pub fn with_warn_on_collision(mut self, warn: bool) -> Self {
        self.warn_on_collision = warn;
        self
    }
}

/// Two fragments shared an identity key; the later one refined the earlier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collision {
    pub kind: FragmentKind,
    pub identity: String,
    /// Rule or analysis whose fragment overwrote the existing element
    pub origin: String,
}

/// Non-fatal findings of a build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub collisions: Vec<Collision>,
    pub undeclared_properties: Vec<String>,
    pub dangling_links: Vec<String>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.collisions.is_empty() && self.undeclared_properties.is_empty() && self.dangling_links.is_empty()
    }

    pub(crate) fn record_collision(&mut self, collision: Collision, warn: bool) {
        if warn {
            tracing::warn!(
                "{:?} '{}' redefined by '{}'",
                collision.kind,
                collision.identity,
                collision.origin
            );
        } else {
            tracing::debug!(
                "{:?} '{}' redefined by '{}'",
                collision.kind,
                collision.identity,
                collision.origin
            );
        }
        self.collisions.push(collision);
    }
}
