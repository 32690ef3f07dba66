//! PSG007: constant strings belong in single quotes.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::{extract_strings, ScriptSource};
use crate::rules::Rule;

pub struct SingleQuotesForConstantStrings;

impl SingleQuotesForConstantStrings {
    pub fn new() -> Self {
        SingleQuotesForConstantStrings
    }
}

impl Default for SingleQuotesForConstantStrings {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SingleQuotesForConstantStrings {
    fn id(&self) -> &'static str {
        "PSG007"
    }

    fn summary(&self) -> &'static str {
        "Use single quotes for constant strings"
    }

    fn guide_anchor(&self) -> &'static str {
        "use-single-quotes-for-constant-strings"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            for lit in extract_strings(&line.raw) {
                // A double-quoted literal is constant when nothing in it
                // can expand: no variables, no subexpressions, no escapes,
                // and no embedded single quote that would need doubling.
                if lit.delim == '"'
                    && !lit.body.is_empty()
                    && !lit.body.contains('$')
                    && !lit.body.contains('`')
                    && !lit.body.contains('\'')
                {
                    sink.push(self.finding(
                        source,
                        line,
                        format!("\"{}\" expands nothing; use single quotes", lit.body),
                    ));
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
        SingleQuotesForConstantStrings::new().check(&source, &mut sink);
        sink
    }

    #[test]
    fn flags_constant_double_quoted() {
        let findings = run("$serviceName = \"MSSQLSERVER\"\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn allows_interpolation() {
        assert!(run("$msg = \"service $name stopped\"\n").is_empty());
        assert!(run("$tab = \"`t\"\n").is_empty());
    }

    #[test]
    fn allows_embedded_single_quote() {
        assert!(run("$msg = \"it's fine\"\n").is_empty());
    }

    #[test]
    fn allows_single_quoted() {
        assert!(run("$serviceName = 'MSSQLSERVER'\n").is_empty());
    }
}
