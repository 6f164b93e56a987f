use crate::calc::wire::ResultEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variables the user has assigned so far, sent back with every request so
/// later expressions can refer to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableBindings {
    vars: BTreeMap<String, String>,
}

impl VariableBindings {
    /// Record every assignment entry in response order; later duplicates win.
    /// Returns how many entries were assignments.
    pub fn apply_results(&mut self, entries: &[ResultEntry]) -> usize {
        let mut applied = 0;
        for entry in entries.iter().filter(|e| e.assign) {
            self.vars.insert(entry.expr.clone(), entry.result.clone());
            applied += 1;
        }
        applied
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_entries_never_bind() {
        let mut bindings = VariableBindings::default();
        let applied = bindings.apply_results(&[ResultEntry::new("2+2", "4", false)]);
        assert_eq!(applied, 0);
        assert!(bindings.is_empty());
    }

    #[test]
    fn repeated_same_assignment_is_idempotent() {
        let mut bindings = VariableBindings::default();
        let entry = ResultEntry::new("x", "5", true);
        bindings.apply_results(&[entry.clone()]);
        bindings.apply_results(&[entry]);
        assert_eq!(bindings.get("x"), Some("5"));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn later_duplicate_in_batch_overwrites() {
        let mut bindings = VariableBindings::default();
        bindings.apply_results(&[
            ResultEntry::new("x", "1", true),
            ResultEntry::new("y", "2", true),
            ResultEntry::new("x", "3", true),
        ]);
        assert_eq!(bindings.get("x"), Some("3"));
        assert_eq!(bindings.get("y"), Some("2"));
    }

    #[test]
    fn bindings_accumulate_across_batches_until_cleared() {
        let mut bindings = VariableBindings::default();
        bindings.apply_results(&[ResultEntry::new("a", "1", true)]);
        bindings.apply_results(&[ResultEntry::new("b", "2", true)]);
        assert_eq!(bindings.len(), 2);
        assert_eq!(
            serde_json::to_string(&bindings).unwrap(),
            r#"{"a":"1","b":"2"}"#
        );

        bindings.clear();
        assert!(bindings.is_empty());
    }
}
