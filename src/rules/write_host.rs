//! PSG006: flag `Write-Host`.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;

pub struct AvoidWriteHost {
    invocation: Regex,
}

impl AvoidWriteHost {
    pub fn new() -> Self {
        AvoidWriteHost {
            invocation: Regex::new(r"(?i)\bWrite-Host\b").unwrap(),
        }
    }
}

impl Default for AvoidWriteHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidWriteHost {
    fn id(&self) -> &'static str {
        "PSG006"
    }

    fn summary(&self) -> &'static str {
        "Avoid Write-Host"
    }

    fn guide_anchor(&self) -> &'static str {
        "avoid-using-write-host"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            if self.invocation.is_match(&line.masked) {
                sink.push(self.finding(
                    source,
                    line,
                    "Write-Host bypasses the output streams; use Write-Output or Write-Verbose"
                        .to_string(),
                ));
            }
        }
    }
}
