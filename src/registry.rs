//! The rule registry: `id -> rule`, plus `name -> id` and `alias -> id`
//! secondary indices.

use std::collections::HashMap;
use std::sync::Arc;

use crate::rule::Rule;

#[derive(Default)]
pub struct RuleRegistry {
    by_id: HashMap<&'static str, Arc<dyn Rule>>,
    name_to_id: HashMap<&'static str, &'static str>,
    alias_to_id: HashMap<String, &'static str>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins on id collision; also (re)installs the name index.
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        let id = rule.id();
        let name = rule.name();
        self.name_to_id.insert(name, id);
        self.by_id.insert(id, rule);
    }

    /// Installs an alias even if no rule with `id` has been registered yet;
    /// resolution uses whichever rule later carries that id.
    pub fn register_alias(&mut self, alias: &str, id: &'static str) {
        self.alias_to_id.insert(alias.to_ascii_lowercase(), id);
    }

    pub fn get_by_id(&self, id: &str) -> Option<Arc<dyn Rule>> {
        self.by_id.get(id).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.name_to_id.get(name).and_then(|id| self.get_by_id(id))
    }

    /// id first, then name.
    pub fn get(&self, key: &str) -> Option<Arc<dyn Rule>> {
        self.get_by_id(key).or_else(|| self.get_by_name(key))
    }

    /// id, then name, then alias.
    pub fn resolve(&self, key: &str) -> Option<Arc<dyn Rule>> {
        self.get(key)
            .or_else(|| self.alias_to_id.get(&key.to_ascii_lowercase()).and_then(|id| self.get_by_id(id)))
    }

    /// Resolves a key to its canonical `MDNNN` id without requiring the
    /// rule itself to be registered yet (used by config normalization,
    /// which must normalize keys for rules it may not recognize).
    pub fn resolve_id(&self, key: &str) -> Option<&'static str> {
        if let Some((&id, _)) = self.by_id.get_key_value(key) {
            return Some(id);
        }
        if let Some(&id) = self.name_to_id.get(key) {
            return Some(id);
        }
        self.alias_to_id.get(&key.to_ascii_lowercase()).copied()
    }

    /// All rules, sorted by id (deterministic).
    pub fn rules(&self) -> Vec<Arc<dyn Rule>> {
        let mut ids: Vec<&&str> = self.by_id.keys().collect();
        ids.sort();
        ids.into_iter().map(|id| self.by_id[id].clone()).collect()
    }

    /// Sorted id list.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.by_id.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RuleContext;
    use crate::rule::{Diagnostic, RuleCategory, RuleError, Severity};

    struct Dummy;
    impl Rule for Dummy {
        fn id(&self) -> &'static str {
            "MD999"
        }
        fn name(&self) -> &'static str {
            "dummy-rule"
        }
        fn description(&self) -> &'static str {
            "a test rule"
        }
        fn tags(&self) -> &'static [&'static str] {
            &["test"]
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Structure
        }
        fn can_fix(&self) -> bool {
            false
        }
        fn apply(&self, _ctx: &RuleContext) -> Result<Vec<Diagnostic>, RuleError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn lookup_by_id_name_and_alias() {
        let mut reg = RuleRegistry::new();
        reg.register(Arc::new(Dummy));
        reg.register_alias("legacy-dummy", "MD999");

        assert!(reg.get_by_id("MD999").is_some());
        assert!(reg.get_by_name("dummy-rule").is_some());
        assert!(reg.resolve("legacy-dummy").is_some());
        assert_eq!(reg.resolve_id("legacy-dummy"), Some("MD999"));
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn ids_and_rules_are_sorted() {
        let _ = Severity::Error;
        let mut reg = RuleRegistry::new();
        reg.register(Arc::new(Dummy));
        assert_eq!(reg.ids(), vec!["MD999"]);
        assert_eq!(reg.rules().len(), 1);
    }
}
