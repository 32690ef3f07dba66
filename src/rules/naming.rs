//! PSG011: function names are Verb-Noun with an approved verb.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;
use rustc_hash::FxHashSet;

pub struct VerbNounFunctionNames {
    declaration: Regex,
    approved: FxHashSet<&'static str>,
}

/// The subset of `Get-Verb` output that covers resource modules.
const APPROVED_VERBS: [&str; 34] = [
    "Add", "Clear", "Close", "Connect", "Convert", "ConvertFrom", "ConvertTo", "Copy",
    "Disable", "Disconnect", "Enable", "Enter", "Exit", "Export", "Find", "Format", "Get",
    "Import", "Initialize", "Install", "Invoke", "Join", "Move", "New", "Open", "Read",
    "Remove", "Rename", "Set", "Split", "Start", "Stop", "Test", "Write",
];

impl VerbNounFunctionNames {
    pub fn new() -> Self {
        VerbNounFunctionNames {
            declaration: Regex::new(r"(?i)^\s*function\s+([A-Za-z0-9_:-]+)").unwrap(),
            approved: APPROVED_VERBS.iter().copied().collect(),
        }
    }
}

impl Default for VerbNounFunctionNames {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for VerbNounFunctionNames {
    fn id(&self) -> &'static str {
        "PSG011"
    }

    fn summary(&self) -> &'static str {
        "Use Verb-Noun names with approved verbs"
    }

    fn guide_anchor(&self) -> &'static str {
        "use-verb-noun-names-with-approved-verbs"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            let Some(captures) = self.declaration.captures(&line.masked) else {
                continue;
            };
            let name = &captures[1];
            match name.split_once('-') {
                None => {
                    sink.push(self.finding(
                        source,
                        line,
                        format!("function '{}' is not Verb-Noun", name),
                    ));
                }
                Some((verb, noun)) => {
                    if !self.approved.iter().any(|v| v.eq_ignore_ascii_case(verb)) {
                        sink.push(self.finding(
                            source,
                            line,
                            format!(
                                "function '{}' uses unapproved verb '{}' (see Get-Verb)",
                                name, verb
                            ),
                        ));
                    } else if noun.is_empty() {
                        sink.push(self.finding(
                            source,
                            line,
                            format!("function '{}' is missing its noun", name),
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::ScriptSource;

    fn run(text: &str) -> Vec<Finding> {
        let source = ScriptSource::parse("t.ps1", text);
        let mut sink = Vec::new();
        VerbNounFunctionNames::new().check(&source, &mut sink);
        sink
    }

    #[test]
    fn flags_missing_hyphen() {
        let findings = run("function GrabSettings\n{\n}\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("not Verb-Noun"));
    }

    #[test]
    fn flags_unapproved_verb() {
        let findings = run("function Grab-Settings { }\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("unapproved verb"));
    }

    #[test]
    fn allows_approved_verbs() {
        assert!(run("function Get-TargetResource { }\n").is_empty());
        assert!(run("function Set-TargetResource { }\n").is_empty());
        assert!(run("function Test-TargetResource { }\n").is_empty());
    }

    #[test]
    fn ignores_function_mentions_in_prose() {
        assert!(run("# function GrabSettings\n").is_empty());
        assert!(run("$doc = 'function GrabSettings'\n").is_empty());
    }
}
