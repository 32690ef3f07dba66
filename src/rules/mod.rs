//! Rule registry: the set of named, independent checks psguard enforces.
//!
//! Each rule is a small struct implementing [`Rule`]. Rules are pure: they
//! read a [`ScriptSource`] and push findings; they never touch the
//! filesystem or the store. Registration order is id order, which is also
//! the order `rules list` prints.
//!
//! Every rule points at the guide section it enforces via `guide_anchor`;
//! `psguard validate` cross-checks that the anchor resolves in the embedded
//! document.

use crate::core::assets;
use crate::core::report::{Finding, Severity};
use crate::core::scanner::{ScriptLine, ScriptSource};
use rustc_hash::FxHashMap;

mod aliases;
mod catch_blocks;
mod comparisons;
mod computer_name;
mod credentials;
mod global_vars;
mod invoke_expression;
mod naming;
mod parameters;
mod quoting;
mod write_host;

pub trait Rule: Send + Sync {
    /// Stable id, e.g. `PSG006`.
    fn id(&self) -> &'static str;
    /// One-line summary shown by `rules list`.
    fn summary(&self) -> &'static str;
    /// Anchor slug of the guide section this rule enforces.
    fn guide_anchor(&self) -> &'static str;
    fn default_severity(&self) -> Severity;
    /// Scan one file and append findings.
    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>);

    /// Build a finding at `line` with this rule's identity attached.
    fn finding(&self, source: &ScriptSource, line: &ScriptLine, message: String) -> Finding {
        Finding {
            rule_id: self.id().to_string(),
            severity: self.default_severity(),
            file: source.path.clone(),
            line: line.number,
            excerpt: line.raw.trim().to_string(),
            message,
            help: format!("{}#{}", assets::GUIDE_DOC, self.guide_anchor()),
        }
    }
}

/// All built-in rules, in id order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(computer_name::AvoidHardcodedComputerName::new()),
        Box::new(catch_blocks::AvoidEmptyCatchBlocks::new()),
        Box::new(comparisons::NullOnLeftOfComparisons::new()),
        Box::new(global_vars::AvoidGlobalVariables::new()),
        Box::new(invoke_expression::AvoidInvokeExpression::new()),
        Box::new(write_host::AvoidWriteHost::new()),
        Box::new(quoting::SingleQuotesForConstantStrings::new()),
        Box::new(aliases::AvoidCmdletAliases::new()),
        Box::new(parameters::UseNamedParameters::new()),
        Box::new(credentials::AvoidPlainTextCredentials::new()),
        Box::new(naming::VerbNounFunctionNames::new()),
        Box::new(parameters::TypedParamBlocks::new()),
    ]
}

pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
    index: FxHashMap<&'static str, usize>,
}

impl Registry {
    pub fn builtin() -> Registry {
        let rules = builtin_rules();
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id(), i))
            .collect();
        Registry { rules, index }
    }

    pub fn all(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.index.get(id).map(|&i| self.rules[i].as_ref())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn schema(&self) -> serde_json::Value {
        let rules: Vec<serde_json::Value> = self
            .rules
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id(),
                    "summary": r.summary(),
                    "severity": r.default_severity(),
                    "guide": format!("{}#{}", assets::GUIDE_DOC, r.guide_anchor()),
                })
            })
            .collect();
        serde_json::json!({
            "name": "rules",
            "version": "1.0.0",
            "description": "Built-in rule registry",
            "rules": rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn rule_ids_are_unique_and_ordered() {
        let registry = Registry::builtin();
        let ids = registry.ids();
        let unique: FxHashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn lookup_by_id() {
        let registry = Registry::builtin();
        assert_eq!(registry.get("PSG006").unwrap().id(), "PSG006");
        assert!(registry.get("PSG999").is_none());
    }

    #[test]
    fn every_anchor_resolves_in_embedded_guide() {
        use crate::core::guide::GuideDoc;
        let doc = GuideDoc::parse(&assets::get_doc(assets::GUIDE_DOC).unwrap());
        let registry = Registry::builtin();
        for rule in registry.all() {
            assert!(
                doc.section_by_anchor(rule.guide_anchor()).is_some(),
                "rule {} points at missing guide section #{}",
                rule.id(),
                rule.guide_anchor()
            );
        }
    }

    #[test]
    fn schema_lists_all_rules() {
        let registry = Registry::builtin();
        let schema = registry.schema();
        assert_eq!(
            schema["rules"].as_array().unwrap().len(),
            registry.all().len()
        );
    }
}
