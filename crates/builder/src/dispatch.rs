use crate::error::{BuildError, Result};
use crate::rule::{Fragment, Rule, RuleSet};
use std::any::Any;

/// Run every rule matching `object`, in registration order, and concatenate the fragments
///
/// An object no rule matches yields no fragments.
pub fn dispatch(object: &dyn Any, rules: &RuleSet) -> Result<Vec<Fragment>> {
    let mut fragments = Vec::new();
    dispatch_with(object, rules, |_, produced| {
        fragments.extend(produced);
        Ok(())
    })?;
    Ok(fragments)
}

/// Hand each matching rule's output to `sink` as soon as it is produced.
/// Returns the number of rules that fired.
pub(crate) fn dispatch_with<F>(object: &dyn Any, rules: &RuleSet, mut sink: F) -> Result<usize>
where
    F: FnMut(&dyn Rule, Vec<Fragment>) -> Result<()>,
{
    let mut fired = 0;
    for rule in rules.iter() {
        let applies = rule
            .matches(object)
            .map_err(|e| rule_error(rule, object, e))?;
        if !applies {
            continue;
        }
        let produced = rule
            .produce(object)
            .map_err(|e| rule_error(rule, object, e))?;
        fired += 1;
        sink(rule, produced)?;
    }
    Ok(fired)
}

pub(crate) fn rule_error(rule: &dyn Rule, object: &dyn Any, source: anyhow::Error) -> BuildError {
    BuildError::RuleExecution {
        rule: rule.name().to_string(),
        element_type: rule.element_type(),
        object: rule.describe(object),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::TypedRule;
    use model::{Category, Link, Node};

    #[derive(Debug)]
    struct Component {
        id: String,
    }

    #[derive(Debug)]
    struct Unmapped;

    fn rules() -> RuleSet {
        RuleSet::new()
            .with(TypedRule::<Component>::node("node", |c| Ok(Node::new(&c.id))))
            .with(TypedRule::<Component>::category("category", |c| {
                Ok(Category::new(format!("{}-kind", c.id)))
            }))
            .with(TypedRule::<Component>::link("self", |c| Ok(Link::new(&c.id, &c.id))))
    }

    #[test]
    fn test_dispatch_no_match_is_empty() {
        let fragments = dispatch(&Unmapped, &rules()).unwrap();
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_dispatch_fires_all_matching_in_order() {
        let c = Component { id: "X".to_string() };
        let fragments = dispatch(&c, &rules()).unwrap();
        assert_eq!(fragments.len(), 3);
        assert!(matches!(&fragments[0], Fragment::Node(n) if n.id == "X"));
        assert!(matches!(&fragments[1], Fragment::Category(cat) if cat.id == "X-kind"));
        assert!(matches!(&fragments[2], Fragment::Link(l) if l.source == "X"));
    }

    #[test]
    fn test_dispatch_reports_failing_rule() {
        let rules = RuleSet::new()
            .with(TypedRule::<Component>::node("ok", |c| Ok(Node::new(&c.id))))
            .with(TypedRule::<Component>::node("broken", |_| {
                Err(anyhow::anyhow!("cannot map"))
            }));
        let c = Component { id: "X".to_string() };

        match dispatch(&c, &rules) {
            Err(BuildError::RuleExecution { rule, object, .. }) => {
                assert_eq!(rule, "broken");
                assert!(object.contains("X"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_guard_error_propagates() {
        let rules = RuleSet::new().with(
            TypedRule::<Component>::node("guarded", |c| Ok(Node::new(&c.id)))
                .try_when(|_| Err(anyhow::anyhow!("guard blew up"))),
        );
        let c = Component { id: "X".to_string() };
        let err = dispatch(&c, &rules).unwrap_err();
        assert!(err.to_string().contains("guard blew up"));
    }

    #[test]
    fn test_dispatch_with_counts_fired_rules() {
        let c = Component { id: "X".to_string() };
        let fired = dispatch_with(&c, &rules(), |_, _| Ok(())).unwrap();
        assert_eq!(fired, 3);
        let fired = dispatch_with(&Unmapped, &rules(), |_, _| Ok(())).unwrap();
        assert_eq!(fired, 0);
    }
}
