//! PSG001: flag quoted machine names passed to `-ComputerName`.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::{extract_strings, ScriptSource};
use crate::rules::Rule;
use regex::Regex;

pub struct AvoidHardcodedComputerName {
    parameter: Regex,
}

/// Values that name the local machine rather than a concrete host.
const LOCAL_NAMES: [&str; 3] = ["localhost", "127.0.0.1", "."];

impl AvoidHardcodedComputerName {
    pub fn new() -> Self {
        AvoidHardcodedComputerName {
            parameter: Regex::new(r#"(?i)-ComputerName\s+["']"#).unwrap(),
        }
    }
}

impl Default for AvoidHardcodedComputerName {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidHardcodedComputerName {
    fn id(&self) -> &'static str {
        "PSG001"
    }

    fn summary(&self) -> &'static str {
        "Avoid using hardcoded computer names"
    }

    fn guide_anchor(&self) -> &'static str {
        "avoid-using-hardcoded-computer-names"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            // The masked view keeps string delimiters, so the parameter
            // match proves a literal (not a variable) follows it.
            let Some(m) = self.parameter.find(&line.masked) else {
                continue;
            };
            // Byte offsets differ between raw and masked once multibyte
            // text is blanked; re-align on char counts before slicing raw.
            let end_chars = line.masked[..m.end()].chars().count();
            let tail: String = line.raw.chars().skip(end_chars - 1).collect();
            let Some(lit) = extract_strings(&tail).into_iter().next() else {
                continue;
            };
            let name = lit.body.trim();
            if name.is_empty() || LOCAL_NAMES.iter().any(|l| name.eq_ignore_ascii_case(l)) {
                continue;
            }
            sink.push(self.finding(
                source,
                line,
                format!(
                    "hardcoded computer name '{}'; use $env:COMPUTERNAME or a parameter",
                    name
                ),
            ));
        }
    }
}
