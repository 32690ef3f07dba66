//! Project scaffolding for psguard initialization.
//!
//! `psguard init` creates the `.psguard/` tree: the configuration file from
//! the embedded template, the store directories, and the baseline database.
//! Scaffolding never overwrites an existing file without `--force`, and
//! `--dry-run` previews without writing.

use crate::core::assets;
use crate::core::error;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ScaffoldOptions {
    /// Target directory for scaffold output (usually project root).
    pub target_dir: PathBuf,
    /// Force overwrite of existing files.
    pub force: bool,
    /// Preview mode - log actions without writing files.
    pub dry_run: bool,
}

fn ensure_parent(path: &Path) -> Result<(), error::PsguardError> {
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).map_err(error::PsguardError::IoError)?;
    }
    Ok(())
}

fn write_file(
    opts: &ScaffoldOptions,
    rel_path: &str,
    content: &str,
) -> Result<(), error::PsguardError> {
    let dest = opts.target_dir.join(rel_path);

    if dest.exists() && !opts.force {
        println!(
            "  skip: {} (exists; pass --force to overwrite)",
            dest.display()
        );
        return Ok(());
    }

    if opts.dry_run {
        println!("  would-write: {}", dest.display());
        return Ok(());
    }

    ensure_parent(&dest)?;
    fs::write(&dest, content).map_err(error::PsguardError::IoError)?;
    println!("  wrote: {}", dest.display());
    Ok(())
}

pub fn scaffold_project(opts: &ScaffoldOptions) -> Result<(), error::PsguardError> {
    println!("Scaffolding psguard into {}", opts.target_dir.display());

    if !opts.dry_run {
        fs::create_dir_all(opts.target_dir.join(".psguard/data"))
            .map_err(error::PsguardError::IoError)?;
        fs::create_dir_all(opts.target_dir.join(".psguard/generated"))
            .map_err(error::PsguardError::IoError)?;
    }

    let config = assets::get_template("psguard.toml").expect("Missing template: psguard.toml");
    let readme = assets::get_template("README.md").expect("Missing template: README.md");

    write_file(opts, ".psguard/psguard.toml", &config)?;
    write_file(opts, ".psguard/README.md", &readme)?;

    // The guide is embedded in the binary - nothing to scaffold for it.
    Ok(())
}
