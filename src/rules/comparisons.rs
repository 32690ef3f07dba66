//! PSG003: `$null` belongs on the left side of `-eq`/`-ne`.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;

pub struct NullOnLeftOfComparisons {
    right_null: Regex,
}

impl NullOnLeftOfComparisons {
    pub fn new() -> Self {
        NullOnLeftOfComparisons {
            // A value expression compared against $null on the right.
            right_null: Regex::new(
                r"(?i)\$[\w:]+(\.\w+|\[[^\]]*\]|\(\))*\s+-(eq|ne|ceq|cne)\s+\$null\b",
            )
            .unwrap(),
        }
    }
}

impl Default for NullOnLeftOfComparisons {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NullOnLeftOfComparisons {
    fn id(&self) -> &'static str {
        "PSG003"
    }

    fn summary(&self) -> &'static str {
        "Ensure $null is on the left side of comparisons"
    }

    fn guide_anchor(&self) -> &'static str {
        "ensure-null-is-on-the-left-side-of-comparisons"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        for line in &source.lines {
            if self.right_null.is_match(&line.masked) {
                sink.push(self.finding(
                    source,
                    line,
                    "$null on the right filters collections instead of testing them; \
                     write `$null -eq ...`"
                        .to_string(),
                ));
            }
        }
    }
}
