//! Store abstraction for psguard's project-scoped state.
//!
//! All mutable state (baseline database, event logs, generated artifacts)
//! lives under `<repo>/.psguard/`. A `Store` is a handle to the `data/`
//! directory inside it.

use std::path::{Path, PathBuf};

/// Handle to a psguard state workspace.
///
/// Subsystem state (baseline entries, event logs) is scoped to a store.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the store root directory (`.psguard/data`).
    pub root: PathBuf,
}

impl Store {
    /// Store rooted inside a project's `.psguard` directory.
    pub fn for_project(project_root: &Path) -> Self {
        Store {
            root: project_root.join(".psguard").join("data"),
        }
    }
}
