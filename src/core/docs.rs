use crate::core::assets;
use crate::core::guide::slugify;
use sha2::{Digest, Sha256};

/// A fragment of the embedded guide.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DocFragment {
    pub kind: String,
    pub r#ref: String,
    pub title: String,
    pub body: String,
    pub hash: String,
}

/// Extract a markdown fragment by anchor (heading).
/// If anchor is None, returns the whole file.
pub fn get_fragment(path: &str, anchor: Option<&str>) -> Option<DocFragment> {
    let content = assets::get_doc(path)?;

    let (fragment_content, title) = if let Some(a) = anchor {
        extract_section(&content, a)?
    } else {
        let title = content
            .lines()
            .next()
            .unwrap_or("Untitled")
            .trim_start_matches("# ")
            .to_string();
        (content.clone(), title)
    };

    let mut hasher = Sha256::new();
    hasher.update(fragment_content.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Some(DocFragment {
        kind: "guide".to_string(),
        r#ref: if let Some(a) = anchor {
            format!("{}#{}", path, a)
        } else {
            path.to_string()
        },
        title,
        body: fragment_content,
        hash,
    })
}

/// Pull the lines of one heading's section, up to the next heading of the
/// same or higher level.
fn extract_section(content: &str, anchor: &str) -> Option<(String, String)> {
    let slug = slugify(anchor);
    let mut section_lines = Vec::new();
    let mut in_section = false;
    let mut in_fence = false;
    let mut section_title = String::new();
    let mut section_level = 0;

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if !in_fence && line.starts_with('#') {
            let level = line.chars().take_while(|&c| c == '#').count();
            let title = line.trim_start_matches('#').trim();
            let current_slug = slugify(title);

            if in_section {
                if level <= section_level {
                    break;
                }
            } else if current_slug == slug || title.eq_ignore_ascii_case(anchor) {
                in_section = true;
                section_title = title.to_string();
                section_level = level;
            }
        }

        if in_section {
            section_lines.push(line);
        }
    }

    if in_section {
        Some((section_lines.join("\n"), section_title))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::GUIDE_DOC;

    #[test]
    fn whole_doc_fragment() {
        let frag = get_fragment(GUIDE_DOC, None).unwrap();
        assert_eq!(frag.title, "PowerShell Best Practices");
        assert_eq!(frag.r#ref, GUIDE_DOC);
        assert_eq!(frag.hash.len(), 64);
    }

    #[test]
    fn anchored_fragment_is_bounded() {
        let frag = get_fragment(GUIDE_DOC, Some("avoid-empty-catch-blocks")).unwrap();
        assert_eq!(frag.title, "Avoid Empty Catch Blocks");
        assert!(frag.body.contains("**Bad:**"));
        assert!(!frag.body.contains("Ensure Null"));
    }

    #[test]
    fn missing_anchor_is_none() {
        assert!(get_fragment(GUIDE_DOC, Some("no-such-rule")).is_none());
    }
}
