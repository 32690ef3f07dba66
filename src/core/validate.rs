//! Self-check harness.
//!
//! `psguard validate` runs the gates that keep the tool and its project
//! state coherent:
//!
//! - Guide consistency (TOC resolves, rule sections carry fences, no
//!   duplicate headings)
//! - Registry coherence (unique ids, every rule anchored to a real guide
//!   section)
//! - Schema determinism (stable registry schema output)
//! - Config integrity (parseable, no unknown rule ids)
//! - Store integrity (state scoped to .psguard/, baseline db consistent
//!   with its event log)
//!
//! Validation is deterministic: the same repo state always produces the
//! same results.

use crate::core::config::Config;
use crate::core::error;
use crate::core::guide::GuideDoc;
use crate::core::output;
use crate::core::store::Store;
use crate::core::{assets, db, time};
use crate::plugins::baseline;
use crate::rules::Registry;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::fs;
use std::path::Path;

thread_local! {
    static VALIDATION_FAILS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static VALIDATION_WARNS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn pass(message: &str, pass_count: &mut u32) {
    *pass_count += 1;
    let _ = message;
}

fn fail(message: &str, fail_count: &mut u32) {
    *fail_count += 1;
    VALIDATION_FAILS.with(|v| v.borrow_mut().push(message.to_string()));
}

fn skip(message: &str, skip_count: &mut u32) {
    *skip_count += 1;
    let _ = message;
}

fn warn(message: &str, warn_count: &mut u32) {
    *warn_count += 1;
    VALIDATION_WARNS.with(|v| v.borrow_mut().push(message.to_string()));
}

fn info(message: &str) {
    let _ = message;
}

fn validate_guide_consistency(
    pass_count: &mut u32,
    fail_count: &mut u32,
) -> Result<(), error::PsguardError> {
    info("Guide Consistency Gate");

    let Some(content) = assets::get_doc(assets::GUIDE_DOC) else {
        fail("Embedded guide document missing", fail_count);
        return Ok(());
    };
    let doc = GuideDoc::parse(&content);
    let issues = crate::core::guide::consistency_issues(&doc);

    if issues.is_empty() {
        pass(
            "Guide TOC, fences, and headings are consistent",
            pass_count,
        );
    } else {
        for issue in issues {
            fail(&format!("Guide consistency: {}", issue), fail_count);
        }
    }

    if doc.rule_sections().count() == 0 {
        fail("Guide contains no rule sections", fail_count);
    } else {
        pass("Guide contains rule sections", pass_count);
    }
    Ok(())
}

fn validate_registry_coherence(
    registry: &Registry,
    pass_count: &mut u32,
    fail_count: &mut u32,
) -> Result<(), error::PsguardError> {
    info("Registry Coherence Gate");

    let ids = registry.ids();
    let unique: FxHashSet<&str> = ids.iter().copied().collect();
    if unique.len() == ids.len() {
        pass("Rule ids are unique", pass_count);
    } else {
        fail("Duplicate rule ids in registry", fail_count);
    }

    let mut sorted = ids.clone();
    sorted.sort();
    if sorted == ids {
        pass("Rules register in id order", pass_count);
    } else {
        fail("Rules are not registered in id order", fail_count);
    }

    let Some(content) = assets::get_doc(assets::GUIDE_DOC) else {
        fail(
            "Embedded guide document missing (cannot anchor rules)",
            fail_count,
        );
        return Ok(());
    };
    let doc = GuideDoc::parse(&content);
    for rule in registry.all() {
        if doc.section_by_anchor(rule.guide_anchor()).is_some() {
            pass(
                &format!("Rule {} anchored in guide", rule.id()),
                pass_count,
            );
        } else {
            fail(
                &format!(
                    "Rule {} points at missing guide section #{}",
                    rule.id(),
                    rule.guide_anchor()
                ),
                fail_count,
            );
        }
    }
    Ok(())
}

fn validate_schema_determinism(
    registry: &Registry,
    pass_count: &mut u32,
    fail_count: &mut u32,
) -> Result<(), error::PsguardError> {
    info("Schema Determinism Gate");

    let s1 = serde_json::to_string(&registry.schema()).unwrap();
    let s2 = serde_json::to_string(&registry.schema()).unwrap();

    if s1 == s2 && !s1.is_empty() {
        pass("Registry schema output is deterministic", pass_count);
    } else {
        fail(
            "Registry schema output is non-deterministic or empty",
            fail_count,
        );
    }
    Ok(())
}

fn validate_config_integrity(
    registry: &Registry,
    project_root: &Path,
    pass_count: &mut u32,
    fail_count: &mut u32,
) -> Result<(), error::PsguardError> {
    info("Config Integrity Gate");

    match Config::load(project_root) {
        Ok(config) => {
            pass("Config parses", pass_count);
            match config.validate_rule_ids(&registry.ids()) {
                Ok(()) => pass("Config references only known rule ids", pass_count),
                Err(e) => fail(&format!("Config rule ids invalid: {}", e), fail_count),
            }
        }
        Err(e) => fail(&format!("Config failed to parse: {}", e), fail_count),
    }

    match Config::parse(assets::TEMPLATE_CONFIG) {
        Ok(_) => pass("Embedded config template parses", pass_count),
        Err(e) => fail(
            &format!("Embedded config template invalid: {}", e),
            fail_count,
        ),
    }
    Ok(())
}

fn validate_project_scoped_state(
    project_root: &Path,
    pass_count: &mut u32,
    fail_count: &mut u32,
) -> Result<(), error::PsguardError> {
    info("Project-Scoped State Gate");

    // psguard state files must not leak outside .psguard/.
    let mut offenders = Vec::new();
    for entry in fs::read_dir(project_root).map_err(error::PsguardError::IoError)? {
        let entry = entry.map_err(error::PsguardError::IoError)?;
        let path = entry.path();
        if path.is_file() {
            let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
            if matches!(ext, "db" | "jsonl") {
                offenders.push(path);
            }
        }
    }

    if offenders.is_empty() {
        pass("All state is correctly scoped within .psguard/", pass_count);
    } else {
        fail(
            &format!("Found psguard state files outside .psguard/: {:?}", offenders),
            fail_count,
        );
    }
    Ok(())
}

fn validate_baseline_integrity(
    store: &Store,
    pass_count: &mut u32,
    fail_count: &mut u32,
) -> Result<(), error::PsguardError> {
    info("Baseline Integrity Gate");

    let db_path = db::baseline_db_path(&store.root);
    if !db_path.exists() {
        skip("baseline.db not found; skipping baseline check", pass_count);
        return Ok(());
    }

    let entries = baseline::list_entries(store)?;
    pass(
        &format!("Baseline database opens ({} entry(ies))", entries.len()),
        pass_count,
    );

    let mut hashes = FxHashSet::default();
    let mut duplicate = false;
    for entry in &entries {
        if !hashes.insert(entry.hash.as_str()) {
            duplicate = true;
        }
    }
    if duplicate {
        fail("Baseline contains duplicate hashes", fail_count);
    } else {
        pass("Baseline hashes are unique", pass_count);
    }

    let events = baseline::baseline_events_path(&store.root);
    if !entries.is_empty() && !events.exists() {
        fail(
            "baseline.db has entries but baseline.events.jsonl is missing",
            fail_count,
        );
    } else {
        pass("Baseline mutations have an audit trail", pass_count);
    }
    Ok(())
}

pub fn run_validation(
    store: &Store,
    project_root: &Path,
    format: &str,
) -> Result<(), error::PsguardError> {
    VALIDATION_FAILS.with(|v| v.borrow_mut().clear());
    VALIDATION_WARNS.with(|v| v.borrow_mut().clear());

    let registry = Registry::builtin();

    let mut pass_count = 0;
    let mut fail_count = 0;
    let mut warn_count = 0;

    validate_guide_consistency(&mut pass_count, &mut fail_count)?;
    validate_registry_coherence(&registry, &mut pass_count, &mut fail_count)?;
    validate_schema_determinism(&registry, &mut pass_count, &mut fail_count)?;
    validate_config_integrity(&registry, project_root, &mut pass_count, &mut fail_count)?;
    validate_project_scoped_state(project_root, &mut pass_count, &mut fail_count)?;
    validate_baseline_integrity(store, &mut pass_count, &mut fail_count)?;

    if !store.root.exists() {
        warn(
            "Store directory missing (run `psguard init`)",
            &mut warn_count,
        );
    }

    let fail_total = VALIDATION_FAILS
        .with(|v| v.borrow().len() as u32)
        .max(fail_count);
    let warn_total = VALIDATION_WARNS
        .with(|v| v.borrow().len() as u32)
        .max(warn_count);

    if format == "json" {
        let fails = VALIDATION_FAILS.with(|v| v.borrow().clone());
        let warns = VALIDATION_WARNS.with(|v| v.borrow().clone());
        let status = if fail_total > 0 { "fail" } else { "ok" };
        let envelope = time::command_envelope(
            "validate",
            status,
            serde_json::json!({
                "pass": pass_count,
                "fail": fail_total,
                "warn": warn_total,
                "failures": fails,
                "warnings": warns,
            }),
        );
        println!("{}", serde_json::to_string_pretty(&envelope).unwrap());
    } else {
        println!(
            "validate: summary pass={} fail={} warn={}",
            pass_count, fail_total, warn_total
        );

        VALIDATION_FAILS.with(|v| {
            let fails = v.borrow();
            if !fails.is_empty() {
                println!(
                    "validate: failures {}: {}",
                    fails.len(),
                    output::preview_messages(&fails, 4, 110)
                );
            }
        });

        VALIDATION_WARNS.with(|v| {
            let warns = v.borrow();
            if !warns.is_empty() {
                println!(
                    "validate: warnings {}: {}",
                    warns.len(),
                    output::preview_messages(&warns, 2, 110)
                );
            }
        });
    }

    if fail_total > 0 {
        Err(error::PsguardError::ValidationError(format!(
            "{} check(s) failed.",
            fail_total
        )))
    } else {
        Ok(())
    }
}
