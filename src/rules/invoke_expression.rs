//! PSG005: flag `Invoke-Expression` (and its `iex` alias).

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;

pub struct AvoidInvokeExpression {
    invocation: Regex,
}

impl AvoidInvokeExpression {
    pub fn new() -> Self {
        AvoidInvokeExpression {
            invocation: Regex::new(r"(?i)\b(Invoke-Expression|iex)\b").unwrap(),
        }
    }
}

impl Default for AvoidInvokeExpression {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidInvokeExpression {
    fn id(&self) -> &'static str {
        "PSG005"
    }

    fn summary(&self) -> &'static str {
        "Avoid Invoke-Expression"
    }

    fn guide_anchor(&self) -> &'static str {
        "avoid-using-invoke-expression"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            if self.invocation.is_match(&line.masked) {
                sink.push(self.finding(
                    source,
                    line,
                    "Invoke-Expression evaluates strings as code; call the command directly"
                        .to_string(),
                ));
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
        AvoidInvokeExpression::new().check(&source, &mut sink);
        sink
    }

    #[test]
    fn flags_cmdlet_and_alias() {
        assert_eq!(run("Invoke-Expression -Command $cmd\n").len(), 1);
        assert_eq!(run("iex $cmd\n").len(), 1);
    }

    #[test]
    fn ignores_literals_and_comments() {
        assert!(run("$note = 'do not use Invoke-Expression'\n").is_empty());
        assert!(run("# iex $cmd\n").is_empty());
    }

    #[test]
    fn does_not_match_inside_words() {
        assert!(run("$pixels = 3\n").is_empty());
    }
}
