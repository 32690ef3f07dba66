//! psguard: the PowerShell style guide, carried and enforced.
//!
//! **psguard is a local-first CLI for PowerShell / DSC resource hygiene.**
//!
//! The best-practices guide ships inside the binary; a registry of rules
//! enforces the mechanically-checkable subset of it over script text.
//!
//! # Core Principles
//!
//! - **Local-first**: All state is project-scoped under `.psguard/`
//! - **Deterministic**: Same inputs always produce the same report
//! - **Guide-driven**: Every rule points at the guide section it enforces
//! - **Pattern-matching only**: Script text is scanned, never executed
//!
//! # Pipeline
//!
//! The check pipeline is linear: the source scanner yields candidate sites
//! per file, each registered rule emits zero or more findings, and the
//! reporter aggregates them into a text or JSON report. Baseline filtering
//! drops findings that were previously accepted with `baseline record`.
//!
//! # Examples
//!
//! ```bash
//! # Initialize a project
//! psguard init
//!
//! # Lint the repository
//! psguard check
//!
//! # Read one rule of the embedded guide
//! psguard guide show BEST_PRACTICES.md#avoid-using-write-host
//!
//! # Accept current findings, then only report new debt
//! psguard baseline record
//! psguard check
//!
//! # Run the self-check harness
//! psguard validate
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: scanner, guide model, reporter, config, store, validation
//! - [`rules`]: the rule registry and the built-in rules
//! - [`plugins`]: stateful subsystems (baseline)

pub mod core;
pub mod plugins;
pub mod rules;

use core::engine::{run_check, CheckOptions};
use core::store::Store;
use core::{config::Config, docs, docs_cli, error, scaffold, tui, validate};
use plugins::baseline;
use rules::Registry;

use clap::{Parser, Subcommand};
use rustc_hash::FxHashSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "psguard",
    version = env!("CARGO_PKG_VERSION"),
    about = "The PowerShell style guide, carried and enforced"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct InitCli {
    /// Directory to initialize (defaults to current working directory).
    #[clap(short, long)]
    dir: Option<PathBuf>,
    /// Overwrite existing scaffold files.
    #[clap(long)]
    force: bool,
    /// Show what would change without writing files.
    #[clap(long)]
    dry_run: bool,
}

#[derive(clap::Args, Debug)]
struct CheckCli {
    /// Files or directories to scan (defaults to the project root).
    paths: Vec<PathBuf>,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    format: String,
    /// Restrict the run to specific rule ids (repeatable).
    #[clap(long = "rule")]
    rules: Vec<String>,
    /// Exit nonzero on any finding, not just errors.
    #[clap(long)]
    strict: bool,
    /// Skip baseline filtering.
    #[clap(long)]
    no_baseline: bool,
    /// Force deterministic JSON output (removes volatile envelope fields).
    #[clap(long)]
    deterministic: bool,
}

#[derive(clap::Args, Debug)]
struct RulesCli {
    #[clap(subcommand)]
    command: RulesCommand,
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// List the rule registry.
    List {
        /// Format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Show one rule and the guide section behind it.
    Show {
        #[clap(long)]
        id: String,
    },
}

#[derive(clap::Args, Debug)]
struct ValidateCli {
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    format: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bootstrap .psguard/ in a repository
    #[clap(name = "init", visible_alias = "i")]
    Init(InitCli),

    /// Lint scripts against the rule registry
    #[clap(name = "check", visible_alias = "c")]
    Check(CheckCli),

    /// Inspect the rule registry
    #[clap(name = "rules", visible_alias = "r")]
    Rules(RulesCli),

    /// Access the embedded best-practices guide
    #[clap(name = "guide", visible_alias = "g")]
    Guide(docs_cli::GuideCli),

    /// Accepted-findings baseline
    #[clap(name = "baseline", visible_alias = "b")]
    Baseline(baseline::BaselineCli),

    /// Run the self-check harness
    #[clap(name = "validate", visible_alias = "v")]
    Validate(ValidateCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}

pub fn run() -> Result<(), error::PsguardError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Version => {
            // Simple output for scripts/parsing.
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Init(init_cli) => {
            let target_dir = match init_cli.dir {
                Some(d) => d,
                None => current_dir,
            };
            let target_dir =
                std::fs::canonicalize(&target_dir).map_err(error::PsguardError::IoError)?;

            let psguard_root = target_dir.join(".psguard");
            if psguard_root.exists() && !init_cli.force {
                tui::render_box(
                    "⚠  ALREADY INITIALIZED",
                    "Use --force to re-scaffold",
                    tui::BoxStyle::Warning,
                );
                return Ok(());
            }

            tui::render_box("PSGUARD", "Style Guide Enforcement", tui::BoxStyle::Cyan);
            println!();

            scaffold::scaffold_project(&scaffold::ScaffoldOptions {
                target_dir: target_dir.clone(),
                force: init_cli.force,
                dry_run: init_cli.dry_run,
            })?;

            if !init_cli.dry_run {
                let store = Store::for_project(&target_dir);
                baseline::initialize_baseline_db(&store.root)?;
                println!("  wrote: {}", store.root.join("baseline.db").display());
                println!();
                tui::render_box("✓ READY", "Run `psguard check`", tui::BoxStyle::Success);
            }
            Ok(())
        }
        Command::Guide(guide_cli) => docs_cli::run_guide_cli(guide_cli),
        Command::Rules(rules_cli) => run_rules_cli(rules_cli),
        Command::Check(check_cli) => {
            // `check` runs anywhere; project state (config, baseline) is
            // honored when a .psguard root is found above us.
            let project_root = docs_cli::find_project_root(&current_dir).ok();
            let config_root = project_root.clone().unwrap_or_else(|| current_dir.clone());

            let registry = Registry::builtin();
            let config = Config::load(&config_root)?;
            config.validate_rule_ids(&registry.ids())?;
            for id in &check_cli.rules {
                if registry.get(id).is_none() {
                    return Err(error::PsguardError::NotFound(format!(
                        "unknown rule id: {}",
                        id
                    )));
                }
            }

            let hashes = match (&project_root, check_cli.no_baseline) {
                (Some(root), false) => baseline::load_hashes(&Store::for_project(root))?,
                _ => FxHashSet::default(),
            };

            let opts = CheckOptions {
                paths: if check_cli.paths.is_empty() {
                    vec![config_root]
                } else {
                    check_cli.paths.clone()
                },
                only_rules: check_cli.rules.clone(),
            };

            let report = run_check(&registry, &config, &opts, &hashes)?;

            if check_cli.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report.to_json(check_cli.deterministic))
                        .unwrap()
                );
            } else {
                print!("{}", report.render_text());
            }

            if report.has_errors() {
                Err(error::PsguardError::ValidationError(format!(
                    "{} error finding(s)",
                    report.count(core::report::Severity::Error)
                )))
            } else if check_cli.strict && !report.findings.is_empty() {
                Err(error::PsguardError::ValidationError(format!(
                    "{} finding(s) in strict mode",
                    report.findings.len()
                )))
            } else {
                Ok(())
            }
        }
        Command::Baseline(baseline_cli) => {
            let project_root = docs_cli::find_project_root(&current_dir)?;
            let store = Store::for_project(&project_root);
            let registry = Registry::builtin();
            let config = Config::load(&project_root)?;
            config.validate_rule_ids(&registry.ids())?;
            baseline::run_baseline_cli(&store, &project_root, &registry, &config, baseline_cli)
        }
        Command::Validate(validate_cli) => {
            let project_root = docs_cli::find_project_root(&current_dir)?;
            let store = Store::for_project(&project_root);
            validate::run_validation(&store, &project_root, &validate_cli.format)
        }
    }
}

fn run_rules_cli(cli: RulesCli) -> Result<(), error::PsguardError> {
    let registry = Registry::builtin();
    match cli.command {
        RulesCommand::List { format } => {
            if format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&registry.schema()).unwrap()
                );
            } else {
                for rule in registry.all() {
                    println!(
                        "{}  {:<7}  {}",
                        rule.id(),
                        rule.default_severity().to_string(),
                        rule.summary()
                    );
                }
            }
            Ok(())
        }
        RulesCommand::Show { id } => {
            let rule = registry
                .get(&id)
                .ok_or_else(|| error::PsguardError::NotFound(format!("unknown rule id: {}", id)))?;
            println!("{}: {}", rule.id(), rule.summary());
            println!("severity: {}", rule.default_severity());
            println!();
            match docs::get_fragment(core::assets::GUIDE_DOC, Some(rule.guide_anchor())) {
                Some(fragment) => println!("{}", fragment.body),
                None => println!(
                    "guide: {}#{}",
                    core::assets::GUIDE_DOC,
                    rule.guide_anchor()
                ),
            }
            Ok(())
        }
    }
}
