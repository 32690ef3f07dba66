//! PSG002: flag catch blocks with an empty body.

use crate::core::report::{Finding, Severity};
use crate::core::scanner::ScriptSource;
use crate::rules::Rule;
use regex::Regex;

pub struct AvoidEmptyCatchBlocks {
    catch_open: Regex,
}

impl AvoidEmptyCatchBlocks {
    pub fn new() -> Self {
        AvoidEmptyCatchBlocks {
            // `catch`, optional exception type filters, then the opening brace.
            catch_open: Regex::new(r"(?i)\bcatch\s*(\[[^\]]*\]\s*(,\s*\[[^\]]*\]\s*)*)?\{")
                .unwrap(),
        }
    }
}

impl Default for AvoidEmptyCatchBlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AvoidEmptyCatchBlocks {
    fn id(&self) -> &'static str {
        "PSG002"
    }

    fn summary(&self) -> &'static str {
        "Avoid empty catch blocks"
    }

    fn guide_anchor(&self) -> &'static str {
        "avoid-empty-catch-blocks"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, source: &ScriptSource, sink: &mut Vec<Finding>) {
        // The body test spans lines, so work on the joined masked text.
        // Comment text is already blanked, so a comment-only catch still
        // reads as empty: it swallows the error either way.
        let masked: Vec<&str> = source.lines.iter().map(|l| l.masked.as_str()).collect();
        let text = masked.join("\n");

        for m in self.catch_open.find_iter(&text) {
            let open = m.end(); // index just past `{`
            let Some(close) = find_matching_brace(&text, open) else {
                continue;
            };
            if text[open..close].trim().is_empty() {
                let line_idx = text[..m.start()].matches('\n').count();
                let line = &source.lines[line_idx];
                sink.push(self.finding(
                    source,
                    line,
                    "empty catch block swallows the error; handle it or rethrow".to_string(),
                ));
            }
        }
    }
}

/// Index of the `}` matching the block opened just before `open`.
fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}
