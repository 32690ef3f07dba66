//! Finding aggregation and rendering.
//!
//! The reporter is the tail of the check pipeline: rules emit findings, the
//! report sorts them, applies severity accounting, and renders either a
//! colored text listing or a deterministic JSON envelope.

use crate::core::time;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Severity> {
        match s {
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single rule violation at a site in a script.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub file: String,
    /// 1-indexed line number.
    pub line: usize,
    /// The offending source line, trimmed.
    pub excerpt: String,
    pub message: String,
    /// Guide pointer, e.g. `BEST_PRACTICES.md#avoid-using-write-host`.
    pub help: String,
}

impl Finding {
    /// Stable suppression key. Line numbers are deliberately excluded so
    /// unrelated edits above a finding do not invalidate its baseline entry.
    pub fn baseline_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.rule_id.as_bytes());
        hasher.update(b"|");
        hasher.update(self.file.as_bytes());
        hasher.update(b"|");
        hasher.update(self.excerpt.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}\n  --> {}:{}\n  |\n  | {}\n  |\n  = guide: {}",
            self.severity, self.rule_id, self.message, self.file, self.line, self.excerpt, self.help
        )
    }
}

/// Aggregated findings for one `check` run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub findings: Vec<Finding>,
    pub files_scanned: usize,
    pub suppressed: usize,
}

impl Report {
    pub fn new(mut findings: Vec<Finding>, files_scanned: usize, suppressed: usize) -> Report {
        findings.sort_by(|a, b| {
            (&a.file, a.line, &a.rule_id).cmp(&(&b.file, b.line, &b.rule_id))
        });
        Report {
            findings,
            files_scanned,
            suppressed,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Colored terminal rendering.
    pub fn render_text(&self) -> String {
        use colored::Colorize;

        let mut out = String::new();
        for finding in &self.findings {
            let label = match finding.severity {
                Severity::Error => format!("error[{}]", finding.rule_id).bright_red().bold(),
                Severity::Warning => format!("warning[{}]", finding.rule_id)
                    .bright_yellow()
                    .bold(),
                Severity::Info => format!("info[{}]", finding.rule_id).bright_cyan(),
            };
            out.push_str(&format!(
                "{}: {}\n  {} {}:{}\n  | {}\n  = guide: {}\n\n",
                label,
                finding.message.bright_white(),
                "-->".bright_black(),
                finding.file,
                finding.line,
                finding.excerpt,
                finding.help.bright_black()
            ));
        }
        out.push_str(&format!(
            "{} file(s) scanned: {} error(s), {} warning(s), {} info, {} baselined\n",
            self.files_scanned,
            self.count(Severity::Error),
            self.count(Severity::Warning),
            self.count(Severity::Info),
            self.suppressed
        ));
        out
    }

    /// JSON envelope. With `deterministic` the volatile envelope fields
    /// (timestamp, event id) are omitted so identical inputs produce
    /// identical output.
    pub fn to_json(&self, deterministic: bool) -> serde_json::Value {
        let body = serde_json::json!({
            "files_scanned": self.files_scanned,
            "suppressed": self.suppressed,
            "counts": {
                "error": self.count(Severity::Error),
                "warning": self.count(Severity::Warning),
                "info": self.count(Severity::Info),
            },
            "findings": self.findings,
        });
        if deterministic {
            body
        } else {
            let status = if self.has_errors() { "fail" } else { "ok" };
            time::command_envelope("check", status, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(rule: &str, file: &str, line: usize, severity: Severity) -> Finding {
        Finding {
            rule_id: rule.to_string(),
            severity,
            file: file.to_string(),
            line,
            excerpt: "Write-Host 'x'".to_string(),
            message: "test".to_string(),
            help: "BEST_PRACTICES.md#avoid-using-write-host".to_string(),
        }
    }

    #[test]
    fn report_sorts_by_file_then_line() {
        let report = Report::new(
            vec![
                finding("PSG006", "b.ps1", 3, Severity::Warning),
                finding("PSG006", "a.ps1", 9, Severity::Warning),
                finding("PSG002", "a.ps1", 2, Severity::Error),
            ],
            2,
            0,
        );
        let order: Vec<(String, usize)> = report
            .findings
            .iter()
            .map(|f| (f.file.clone(), f.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.ps1".to_string(), 2),
                ("a.ps1".to_string(), 9),
                ("b.ps1".to_string(), 3)
            ]
        );
    }

    #[test]
    fn severity_counts() {
        let report = Report::new(
            vec![
                finding("PSG002", "a.ps1", 1, Severity::Error),
                finding("PSG006", "a.ps1", 2, Severity::Warning),
            ],
            1,
            0,
        );
        assert_eq!(report.count(Severity::Error), 1);
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.count(Severity::Info), 0);
        assert!(report.has_errors());
    }

    #[test]
    fn baseline_hash_ignores_line_number() {
        let a = finding("PSG006", "a.ps1", 1, Severity::Warning);
        let mut b = a.clone();
        b.line = 99;
        assert_eq!(a.baseline_hash(), b.baseline_hash());
    }

    #[test]
    fn deterministic_json_has_no_envelope() {
        let report = Report::new(vec![], 0, 0);
        let v = report.to_json(true);
        assert!(v.get("ts").is_none());
        assert!(v.get("event_id").is_none());
        let v = report.to_json(false);
        assert!(v.get("ts").is_some());
        assert_eq!(v["status"], "ok");
    }

    #[test]
    fn severity_ordering_supports_thresholds() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
