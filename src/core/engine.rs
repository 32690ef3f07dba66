//! The check pipeline: scanner feeds candidate sites to each registered
//! rule, rules emit findings, the reporter aggregates.
//!
//! Files are scanned in parallel with rayon; everything a worker touches is
//! read-only (`Registry` and `Config` are shared by reference). Baseline
//! filtering happens after the scan so the suppressed count is exact.

use crate::core::config::Config;
use crate::core::error::PsguardError;
use crate::core::report::{Finding, Report};
use crate::core::scanner::{collect_script_files, ScriptSource};
use crate::rules::Registry;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Files or directories to scan; empty means the project root.
    pub paths: Vec<PathBuf>,
    /// Restrict the run to these rule ids (empty means all enabled rules).
    pub only_rules: Vec<String>,
}

/// Scan one parsed source with every applicable rule.
pub fn check_source(
    source: &ScriptSource,
    registry: &Registry,
    config: &Config,
    only_rules: &[String],
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for rule in registry.all() {
        if config.is_disabled(rule.id()) {
            continue;
        }
        if !only_rules.is_empty() && !only_rules.iter().any(|id| id == rule.id()) {
            continue;
        }
        rule.check(source, &mut findings);
    }

    // Inline suppressions and severity shaping are engine concerns; rules
    // stay oblivious to both.
    findings.retain(|f| {
        source
            .lines
            .get(f.line.saturating_sub(1))
            .map(|l| !l.suppressed)
            .unwrap_or(true)
    });
    for finding in &mut findings {
        if let Some(rule) = registry.get(&finding.rule_id) {
            finding.severity = config.severity_for(rule.id(), rule.default_severity());
        }
    }
    findings.retain(|f| f.severity >= config.check.severity_threshold);
    findings
}

/// Run the full pipeline over the requested paths.
///
/// `baseline` holds the suppression hashes already accepted for this
/// project; pass an empty set to disable baseline filtering.
pub fn run_check(
    registry: &Registry,
    config: &Config,
    opts: &CheckOptions,
    baseline: &FxHashSet<String>,
) -> Result<Report, PsguardError> {
    let mut files = Vec::new();
    for path in &opts.paths {
        if !path.exists() {
            return Err(PsguardError::NotFound(format!(
                "no such path: {}",
                path.display()
            )));
        }
        files.extend(collect_script_files(path, &config.check.exclude)?);
    }
    files.sort();
    files.dedup();

    let per_file: Result<Vec<Vec<Finding>>, PsguardError> = files
        .par_iter()
        .map(|path| {
            let source = match ScriptSource::read(path) {
                Ok(source) => source,
                // UTF-16 scripts are common on Windows; skip what we cannot
                // decode rather than failing the whole run.
                Err(PsguardError::IoError(e))
                    if e.kind() == std::io::ErrorKind::InvalidData =>
                {
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            };
            Ok(check_source(&source, registry, config, &opts.only_rules))
        })
        .collect();

    let mut findings: Vec<Finding> = per_file?.into_iter().flatten().collect();

    let before = findings.len();
    if !baseline.is_empty() {
        findings.retain(|f| !baseline.contains(&f.baseline_hash()));
    }
    let suppressed = before - findings.len();

    Ok(Report::new(findings, files.len(), suppressed))
}
