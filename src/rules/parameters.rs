//! PSG009 / PSG012: parameter discipline at call sites and declarations.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;

/// PSG009: command calls pass values by parameter name, not position.
pub struct UseNamedParameters {
    positional_call: Regex,
}

/// Commands whose first positional argument is idiomatic (scriptblocks and
/// property shorthand in pipelines).
const POSITIONAL_IDIOMS: [&str; 2] = ["foreach-object", "where-object"];

impl UseNamedParameters {
    pub fn new() -> Self {
        UseNamedParameters {
            // Verb-Noun command followed directly by a value: a quoted
            // literal, a number, or a variable. Named arguments start with
            // `-` and never match.
            positional_call: Regex::new(
                r#"(?i)\b([A-Za-z][A-Za-z0-9]*-[A-Za-z][A-Za-z0-9]*)\s+(['"0-9$])"#,
            )
            .unwrap(),
        }
    }
}

impl Default for UseNamedParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UseNamedParameters {
    fn id(&self) -> &'static str {
        "PSG009"
    }

    fn summary(&self) -> &'static str {
        "Use named parameters in function and cmdlet calls"
    }

    fn guide_anchor(&self) -> &'static str {
        "use-named-parameters-instead-of-positional-parameters"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            for captures in self.positional_call.captures_iter(&line.masked) {
                let command = captures[1].to_ascii_lowercase();
                if POSITIONAL_IDIOMS.contains(&command.as_str()) {
                    continue;
                }
                sink.push(self.finding(
                    source,
                    line,
                    format!("positional argument to {}; name the parameter", &captures[1]),
                ));
            }
        }
    }
}

/// PSG012: parameters are declared in a `param` block with explicit types.
pub struct TypedParamBlocks {
    inline_params: Regex,
    param_open: Regex,
    bare_param: Regex,
    attribute_line: Regex,
}

impl TypedParamBlocks {
    pub fn new() -> Self {
        TypedParamBlocks {
            inline_params: Regex::new(r"(?i)^\s*function\s+[\w-]+\s*\(").unwrap(),
            param_open: Regex::new(r"(?i)^\s*param\b\s*\(?").unwrap(),
            bare_param: Regex::new(r"^\s*\$\w+\s*(=[^,]*)?,?\s*$").unwrap(),
            attribute_line: Regex::new(r"\]\s*$").unwrap(),
        }
    }
}

impl Default for TypedParamBlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TypedParamBlocks {
    fn id(&self) -> &'static str {
        "PSG012"
    }

    fn summary(&self) -> &'static str {
        "Declare typed parameters in a param block"
    }

    fn guide_anchor(&self) -> &'static str {
        "declare-typed-parameters-in-a-param-block"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        let mut in_param_block = false;
        let mut depth = 0i32;
        let mut prev_ends_with_type = false;

        for line in &source.lines {
            let masked = &line.masked;

            if self.inline_params.is_match(masked) {
                sink.push(self.finding(
                    source,
                    line,
                    "inline parameter list; declare parameters in a param block".to_string(),
                ));
                continue;
            }

            if !in_param_block {
                if self.param_open.is_match(masked) {
                    in_param_block = true;
                    depth = 0;
                    prev_ends_with_type = false;
                    // Fall through so parens on this line are counted.
                } else {
                    continue;
                }
            }

            depth += masked.matches('(').count() as i32;
            depth -= masked.matches(')').count() as i32;

            if self.bare_param.is_match(masked) && !prev_ends_with_type {
                sink.push(self.finding(
                    source,
                    line,
                    format!(
                        "untyped parameter {}; add a .NET type annotation",
                        line.raw.trim().trim_end_matches(',')
                    ),
                ));
            }

            if !masked.trim().is_empty() {
                prev_ends_with_type = self.attribute_line.is_match(masked);
            }

            // Block ends once its parens are balanced again (depth can be
            // zero on the `param` line itself before the open paren).
            if depth <= 0 && masked.contains(')') {
                in_param_block = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::ScriptSource;

    fn run_named(text: &str) -> Vec<Finding> {
        let source = ScriptSource::parse("t.ps1", text);
        let mut sink = Vec::new();
        UseNamedParameters::new().check(&source, &mut sink);
        sink
    }

    fn run_typed(text: &str) -> Vec<Finding> {
        let source = ScriptSource::parse("t.ps1", text);
        let mut sink = Vec::new();
        TypedParamBlocks::new().check(&source, &mut sink);
        sink
    }

    #[test]
    fn flags_positional_literals() {
        let findings = run_named("Get-TargetResource 'Contoso.Web' 'Present' 8080\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("Get-TargetResource"));
    }

    #[test]
    fn flags_positional_variable() {
        assert_eq!(run_named("Set-SitePort $site\n").len(), 1);
    }

    #[test]
    fn allows_named_arguments() {
        assert!(run_named("Get-TargetResource -SiteName 'Contoso.Web' -Port 8080\n").is_empty());
    }

    #[test]
    fn allows_scriptblock_idioms() {
        assert!(run_named("$x | ForEach-Object $transform\n").is_empty());
        assert!(run_named("$x | Where-Object $filter\n").is_empty());
    }

    #[test]
    fn flags_inline_parameter_list() {
        let findings = run_typed("function Set-SitePort($site, $port)\n{\n}\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("inline parameter list"));
    }

    #[test]
    fn flags_untyped_param_block_entry() {
        let text = "function Set-SitePort\n{\n    param\n    (\n        $SiteName,\n\n        [System.Int32]\n        $Port\n    )\n}\n";
        let findings = run_typed(text);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("$SiteName"));
    }

    #[test]
    fn allows_fully_typed_param_block() {
        let text = "param\n(\n    [Parameter(Mandatory = $true)]\n    [System.String]\n    $SiteName,\n\n    [System.Int32]\n    $Port\n)\n";
        assert!(run_typed(text).is_empty());
    }
}
