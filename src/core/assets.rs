//! Embedded guide and template assets.
//!
//! This module provides compile-time embedded access to the best-practices
//! guide. The document is baked into the binary for hermetic deployment -
//! no external files required.

/// Macro to embed guide documents at compile time as text.
///
/// Generates:
/// - Public constants for each embedded document
/// - `get_embedded_doc(path)` function for lookup
/// - `list_docs()` function for discovery
macro_rules! embedded_docs {
    ($($path:expr => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str =
                include_str!(concat!("../../guide/", $path));
        )*

        pub fn get_embedded_doc(path: &str) -> Option<String> {
            // Support both bare paths and a legacy "guide/" prefix
            let key = path.strip_prefix("guide/").unwrap_or(path);
            match key {
                $( $path => Some($const_name.to_string()), )*
                _ => None,
            }
        }

        pub fn list_docs() -> Vec<String> {
            vec![ $( $path.to_string(), )* ]
        }
    };
}

embedded_docs! {
    "BEST_PRACTICES.md" => EMBEDDED_BEST_PRACTICES,
}

/// Canonical path of the main guide document.
pub const GUIDE_DOC: &str = "BEST_PRACTICES.md";

pub fn get_doc(path: &str) -> Option<String> {
    get_embedded_doc(path)
}

// Scaffolding templates for `psguard init`.
pub const TEMPLATE_CONFIG: &str = include_str!("../../templates/psguard.toml");
pub const TEMPLATE_README: &str = include_str!("../../templates/README.md");

pub fn get_template(name: &str) -> Option<String> {
    match name {
        "psguard.toml" => Some(TEMPLATE_CONFIG.to_string()),
        "README.md" => Some(TEMPLATE_README.to_string()),
        _ => None,
    }
}
