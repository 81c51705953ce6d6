//! [`KnowledgeBase`]: the immutable rule set a session runs against.

use std::collections::HashMap;
use std::sync::Arc;

use tempo_core::{EngineError, Fact, Result};

use super::definition::Rule;

/// An ordered set of rules with unique ids.
///
/// Cloning is cheap: rules are reference counted, so several isolated
/// sessions can share one knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    rules: Vec<Arc<Rule>>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Result<Self> {
        let mut kb = Self::default();
        for rule in rules {
            kb.add(rule)?;
        }
        Ok(kb)
    }

    /// Add a rule. Fails on a duplicate id.
    pub fn add(&mut self, rule: Rule) -> Result<()> {
        if self.index.contains_key(rule.id()) {
            return Err(EngineError::DuplicateRule(rule.id().to_string()));
        }
        self.index.insert(rule.id().to_string(), self.rules.len());
        self.rules.push(Arc::new(rule));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Rule>> {
        self.index.get(id).map(|i| &self.rules[*i])
    }

    /// Rules in definition order.
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    /// Rules whose pattern matches `fact`, in definition order.
    pub fn matching<'a>(&'a self, fact: &'a Fact) -> impl Iterator<Item = &'a Arc<Rule>> + 'a {
        self.rules.iter().filter(move |rule| rule.pattern().matches(fact))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Pattern;

    fn noop(id: &str, fact_type: &str) -> Rule {
        Rule::builder(id, Pattern::of_type(fact_type)).then(|_| Ok(()))
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = KnowledgeBase::new([noop("a", "X"), noop("a", "Y")]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateRule(id) if id == "a"));
    }

    #[test]
    fn matching_preserves_definition_order() {
        let kb = KnowledgeBase::new([noop("first", "X"), noop("other", "Y"), noop("second", "X")]).unwrap();
        let fact = Fact::new("X");
        let ids: Vec<&str> = kb.matching(&fact).map(|r| r.id()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(kb.get("other").map(|r| r.id()), Some("other"));
        assert_eq!(kb.len(), 3);
    }
}
