//! PSG010: flag plain-text credential conversion.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;

pub struct AvoidPlainTextCredentials {
    conversion: Regex,
    plain_text: Regex,
}

impl AvoidPlainTextCredentials {
    pub fn new() -> Self {
        AvoidPlainTextCredentials {
            conversion: Regex::new(r"(?i)\bConvertTo-SecureString\b").unwrap(),
            plain_text: Regex::new(r"(?i)-AsPlainText\b").unwrap(),
        }
    }
}

impl Default for AvoidPlainTextCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidPlainTextCredentials {
    fn id(&self) -> &'static str {
        "PSG010"
    }

    fn summary(&self) -> &'static str {
        "Avoid plain-text credential conversion"
    }

    fn guide_anchor(&self) -> &'static str {
        "avoid-plain-text-credential-conversion"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            if self.conversion.is_match(&line.masked) && self.plain_text.is_match(&line.masked) {
                sink.push(self.finding(
                    source,
                    line,
                    "plain-text secret converted to SecureString; acquire a PSCredential instead"
                        .to_string(),
                ));
            }
        }
    }
}
