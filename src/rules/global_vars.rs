//! PSG004: flag `$global:` scope usage.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;

pub struct AvoidGlobalVariables {
    global_scope: Regex,
}

impl AvoidGlobalVariables {
    pub fn new() -> Self {
        AvoidGlobalVariables {
            global_scope: Regex::new(r"(?i)\$global:(\w+)").unwrap(),
        }
    }
}

impl Default for AvoidGlobalVariables {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidGlobalVariables {
    fn id(&self) -> &'static str {
        "PSG004"
    }

    fn summary(&self) -> &'static str {
        "Avoid global variables"
    }

    fn guide_anchor(&self) -> &'static str {
        "avoid-global-variables"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            if let Some(captures) = self.global_scope.captures(&line.masked) {
                sink.push(self.finding(
                    source,
                    line,
                    format!(
                        "global variable $global:{}; pass a parameter or use $script: scope",
                        &captures[1]
                    ),
                ));
            }
        }
    }
}
