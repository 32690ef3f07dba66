//! PSG008: spell out cmdlet names instead of aliases.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;
use rustc_hash::FxHashMap;

pub struct AvoidCmdletAliases {
    command_position: Regex,
    pipeline_symbol: Regex,
    expansions: FxHashMap<&'static str, &'static str>,
}

/// Aliases flagged in command position. `iex` is deliberately absent: it is
/// reported by PSG005 with a stronger message.
const ALIASES: [(&str, &str); 10] = [
    ("gci", "Get-ChildItem"),
    ("gcm", "Get-Command"),
    ("gwmi", "Get-WmiObject"),
    ("iwr", "Invoke-WebRequest"),
    ("irm", "Invoke-RestMethod"),
    ("sls", "Select-String"),
    ("ft", "Format-Table"),
    ("fl", "Format-List"),
    ("foreach", "ForEach-Object"),
    ("where", "Where-Object"),
];

impl AvoidCmdletAliases {
    pub fn new() -> Self {
        let names: Vec<&str> = ALIASES.iter().map(|(a, _)| *a).collect();
        AvoidCmdletAliases {
            // Alias must sit in command position: line start or right after
            // a pipe, semicolon, brace, paren, or assignment.
            command_position: Regex::new(&format!(
                r"(?i)(?:^|[|;{{(=])\s*({})\b",
                names.join("|")
            ))
            .unwrap(),
            pipeline_symbol: Regex::new(r"\|\s*([%?])[\s{]").unwrap(),
            expansions: ALIASES.iter().copied().collect(),
        }
    }
}

impl Default for AvoidCmdletAliases {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidCmdletAliases {
    fn id(&self) -> &'static str {
        "PSG008"
    }

    fn summary(&self) -> &'static str {
        "Avoid cmdlet aliases"
    }

    fn guide_anchor(&self) -> &'static str {
        "avoid-using-cmdlet-aliases"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            let masked = &line.masked;
            if let Some(captures) = self.command_position.captures(masked) {
                let alias_match = captures.get(1).unwrap();
                let alias = alias_match.as_str().to_ascii_lowercase();
                // A `-` right after the match means the full cmdlet name
                // (`Where-Object`), not the alias; the regex crate has no
                // lookahead, so check the next char by hand.
                let full_name = masked[alias_match.end()..].starts_with('-');
                // `foreach (...)` is the language keyword, not the alias.
                let keyword_form = alias == "foreach"
                    && masked.to_ascii_lowercase().contains("foreach (")
                    || alias == "where" && !masked.contains('|');
                if !full_name && !keyword_form {
                    let full = self.expansions.get(alias.as_str()).copied().unwrap_or("?");
                    sink.push(self.finding(
                        source,
                        line,
                        format!("alias '{}'; write {} instead", alias, full),
                    ));
                }
            }
            if let Some(captures) = self.pipeline_symbol.captures(masked) {
                let full = match &captures[1] {
                    "%" => "ForEach-Object",
                    _ => "Where-Object",
                };
                sink.push(self.finding(
                    source,
                    line,
                    format!("alias '{}'; write {} instead", &captures[1], full),
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
        AvoidCmdletAliases::new().check(&source, &mut sink);
        sink
    }

    #[test]
    fn flags_alias_in_command_position() {
        let findings = run("gci -Path $p -Recurse\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("Get-ChildItem"));
    }

    #[test]
    fn flags_alias_after_pipe() {
        assert_eq!(run("Get-Process | ft Name\n").len(), 1);
    }

    #[test]
    fn flags_percent_and_question_in_pipeline() {
        assert_eq!(run("$items | % { $_.Name }\n").len(), 1);
        assert_eq!(run("$items | ? { $_.Length -gt 0 }\n").len(), 1);
    }

    #[test]
    fn allows_foreach_keyword() {
        assert!(run("foreach ($item in $items) { }\n").is_empty());
    }

    #[test]
    fn allows_full_names_and_parameters() {
        assert!(run("Get-ChildItem -Path $p | Where-Object { $_.Length }\n").is_empty());
        // Alias text inside an argument is not command position.
        assert!(run("Write-Verbose -Message 'ft output'\n").is_empty());
    }
}
