//! Guide CLI for accessing the embedded best-practices document.
//!
//! `psguard guide` serves the document the binary carries: list the
//! embedded files, show a document or a single rule section by anchor,
//! print the table of contents, and verify the document's own consistency.

use crate::core::{assets, docs, error, guide};
use clap::Subcommand;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(clap::Args, Debug)]
pub struct GuideCli {
    #[clap(subcommand)]
    pub command: GuideCommand,
}

#[derive(Subcommand, Debug)]
pub enum GuideCommand {
    /// List all embedded guide documents.
    List,
    /// Display an embedded document, or one section via `path#anchor`.
    Show {
        #[clap(value_parser)]
        path: String,
    },
    /// Print the table of contents of the best-practices document.
    Toc,
    /// Run the document-consistency checks and cache the guide checksum.
    Verify {
        /// Force re-cache even if unchanged.
        #[clap(long, short)]
        force: bool,
    },
}

pub fn run_guide_cli(cli: GuideCli) -> Result<(), error::PsguardError> {
    match cli.command {
        GuideCommand::List => {
            let docs = assets::list_docs();
            println!("Embedded guide documents:");
            for doc in docs {
                println!("- {}", doc);
            }
            Ok(())
        }
        GuideCommand::Show { path } => {
            let (relative_path, anchor) = match path.find('#') {
                Some(pos) => (&path[..pos], Some(&path[pos + 1..])),
                None => (path.as_str(), None),
            };
            let relative_path = if relative_path.is_empty() {
                assets::GUIDE_DOC
            } else {
                relative_path
            };

            match docs::get_fragment(relative_path, anchor) {
                Some(fragment) => {
                    if anchor.is_some() {
                        println!("--- {} ---", fragment.title);
                    }
                    println!("{}", fragment.body);
                    Ok(())
                }
                None => Err(error::PsguardError::NotFound(format!(
                    "document or section not found: {}",
                    path
                ))),
            }
        }
        GuideCommand::Toc => {
            let content = assets::get_doc(assets::GUIDE_DOC)
                .ok_or_else(|| error::PsguardError::NotFound(assets::GUIDE_DOC.to_string()))?;
            let doc = guide::GuideDoc::parse(&content);
            println!("{}", doc.title);
            for section in &doc.sections {
                let indent = "  ".repeat(section.level.saturating_sub(2) as usize);
                println!(
                    "{}- {} (#{})",
                    indent,
                    section.title,
                    guide::slugify(&section.title)
                );
            }
            Ok(())
        }
        GuideCommand::Verify { force } => run_guide_verify(force),
    }
}

fn run_guide_verify(force: bool) -> Result<(), error::PsguardError> {
    use colored::Colorize;

    let content = assets::get_doc(assets::GUIDE_DOC)
        .ok_or_else(|| error::PsguardError::NotFound(assets::GUIDE_DOC.to_string()))?;
    let doc = guide::GuideDoc::parse(&content);
    let issues = guide::consistency_issues(&doc);

    let rule_count = doc.rule_sections().count();
    let unfinished = doc
        .rule_sections()
        .filter(|s| s.empty_fence_count > 0)
        .count();
    println!(
        "guide: {} section(s), {} rule section(s), {} unfinished entr(ies)",
        doc.sections.len(),
        rule_count,
        unfinished
    );

    for issue in &issues {
        println!("{} {}", "✗".bright_red(), issue);
    }

    if issues.is_empty() {
        println!("{} document consistency checks pass", "✓".bright_green());
    }

    // Checksum cache lives in the project store when one exists; the
    // consistency result itself never depends on it.
    if let Ok(repo_root) = find_project_root(&std::env::current_dir()?) {
        let checksum = {
            let hash = Sha256::digest(content.as_bytes());
            format!("{:x}", hash)
        };
        match cached_checksum(&repo_root) {
            Some(cached) if cached == checksum && !force => {
                println!("✓ guide checksum unchanged");
            }
            Some(_) => {
                cache_checksum(&repo_root, &checksum)?;
                println!("✓ guide checksum updated: {}", checksum);
            }
            None => {
                cache_checksum(&repo_root, &checksum)?;
                println!("✓ guide checksum cached: {}", checksum);
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(error::PsguardError::ValidationError(format!(
            "{} guide consistency issue(s)",
            issues.len()
        )))
    }
}

/// Walk upward until a `.psguard` directory is found.
pub fn find_project_root(start_dir: &Path) -> Result<PathBuf, error::PsguardError> {
    let mut current_dir = start_dir.to_path_buf();
    loop {
        if current_dir.join(".psguard").exists() {
            return Ok(current_dir);
        }
        if !current_dir.pop() {
            return Err(error::PsguardError::NotFound(
                "'.psguard' directory not found in current or parent directories. Run `psguard init` first.".to_string(),
            ));
        }
    }
}

fn cached_checksum(repo_root: &Path) -> Option<String> {
    let checksum_path = repo_root
        .join(".psguard")
        .join("generated")
        .join("guide.checksum");
    std::fs::read_to_string(checksum_path).ok()
}

fn cache_checksum(repo_root: &Path, checksum: &str) -> Result<(), error::PsguardError> {
    let checksum_path = repo_root
        .join(".psguard")
        .join("generated")
        .join("guide.checksum");
    if let Some(parent) = checksum_path.parent() {
        std::fs::create_dir_all(parent).map_err(error::PsguardError::IoError)?;
    }
    std::fs::write(checksum_path, checksum).map_err(error::PsguardError::IoError)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "guide",
        "type": "object",
        "properties": {
            "list": {
                "type": "null",
                "description": "List all embedded guide documents"
            },
            "show": {
                "type": "string",
                "description": "Display a document or a section via path#anchor"
            },
            "toc": {
                "type": "null",
                "description": "Print the table of contents"
            },
            "verify": {
                "type": "object",
                "description": "Run document-consistency checks",
                "properties": {
                    "force": {
                        "type": "boolean",
                        "description": "Force checksum re-cache even if unchanged"
                    }
                }
            }
        }
    })
}
