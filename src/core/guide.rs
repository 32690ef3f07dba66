//! Structural model of the embedded best-practices guide.
//!
//! The guide is a single Markdown document: a table of contents followed by
//! rule sections, each with a rationale paragraph and paired Bad/Good
//! fenced code blocks. This module parses that structure and implements the
//! document-consistency checks surfaced by `psguard guide verify`:
//!
//! - every anchor linked from the table of contents resolves to a heading
//! - every rule section carries at least one fenced code block (an empty
//!   block body is allowed and marks an unfinished entry)
//! - no rule section duplicates another section's heading text
//! - every rule section is reachable from the table of contents

use pulldown_cmark::{CodeBlockKind, Event, Parser as MdParser, Tag, TagEnd};
use rustc_hash::{FxHashMap, FxHashSet};

/// A `##`/`###` section of the guide.
#[derive(Debug, Clone)]
pub struct GuideSection {
    pub title: String,
    pub level: u32,
    /// 1-indexed line of the heading in the source document.
    pub line: usize,
    /// Fenced code blocks attached to this section.
    pub fence_count: usize,
    /// Fenced blocks whose body is empty (unfinished entries).
    pub empty_fence_count: usize,
}

/// An in-document link collected from the table of contents.
#[derive(Debug, Clone)]
pub struct TocEntry {
    pub text: String,
    /// Anchor without the leading `#`.
    pub anchor: String,
    pub line: usize,
}

/// Parsed shape of the guide document.
#[derive(Debug, Clone)]
pub struct GuideDoc {
    pub title: String,
    pub sections: Vec<GuideSection>,
    pub toc: Vec<TocEntry>,
}

/// Anchor slug for a heading, GitHub-style: lowercase, alphanumerics and
/// hyphens kept, spaces collapsed to hyphens, everything else dropped.
pub fn slugify(heading: &str) -> String {
    let mut slug = String::with_capacity(heading.len());
    for c in heading.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if c == ' ' || c == '-' {
            slug.push('-');
        }
    }
    // Collapse runs introduced by adjacent space+hyphen sequences.
    let mut out = String::with_capacity(slug.len());
    let mut prev_dash = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_dash {
                out.push(c);
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }
    out.trim_matches('-').to_string()
}

impl GuideDoc {
    pub fn parse(content: &str) -> GuideDoc {
        // Byte offset of each line start, for offset -> line conversion.
        let line_offsets: Vec<usize> = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let byte_to_line = |byte_offset: usize| -> usize {
            line_offsets
                .iter()
                .position(|&offset| offset > byte_offset)
                .unwrap_or(line_offsets.len())
        };

        let mut title = String::new();
        let mut sections: Vec<GuideSection> = Vec::new();
        let mut toc: Vec<TocEntry> = Vec::new();

        let mut in_heading: Option<(u32, usize)> = None;
        let mut heading_text = String::new();
        let mut in_link: Option<(String, usize)> = None;
        let mut link_text = String::new();
        let mut in_fence = false;
        let mut fence_body = String::new();

        for (event, range) in MdParser::new(content).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    in_heading = Some((level as u32, byte_to_line(range.start)));
                    heading_text.clear();
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, line)) = in_heading.take() {
                        let text = heading_text.trim().to_string();
                        if level == 1 && title.is_empty() {
                            title = text;
                        } else if level >= 2 && text != "Table of Contents" {
                            sections.push(GuideSection {
                                title: text,
                                level,
                                line,
                                fence_count: 0,
                                empty_fence_count: 0,
                            });
                        }
                    }
                }
                Event::Start(Tag::Link { dest_url, .. }) => {
                    if let Some(anchor) = dest_url.strip_prefix('#') {
                        in_link = Some((anchor.to_string(), byte_to_line(range.start)));
                        link_text.clear();
                    }
                }
                Event::End(TagEnd::Link) => {
                    if let Some((anchor, line)) = in_link.take() {
                        toc.push(TocEntry {
                            text: link_text.trim().to_string(),
                            anchor,
                            line,
                        });
                    }
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                    in_fence = true;
                    fence_body.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    if in_fence {
                        in_fence = false;
                        if let Some(section) = sections.last_mut() {
                            section.fence_count += 1;
                            if fence_body.trim().is_empty() {
                                section.empty_fence_count += 1;
                            }
                        }
                    }
                }
                Event::Text(text) => {
                    if in_fence {
                        fence_body.push_str(&text);
                    } else if in_heading.is_some() {
                        heading_text.push_str(&text);
                    } else if in_link.is_some() {
                        link_text.push_str(&text);
                    }
                }
                Event::Code(code) => {
                    if in_heading.is_some() {
                        heading_text.push_str(&code);
                    } else if in_link.is_some() {
                        link_text.push_str(&code);
                    }
                }
                _ => {}
            }
        }

        GuideDoc {
            title,
            sections,
            toc,
        }
    }

    /// Rule sections are the `###` entries; `##` headings are category
    /// groupings.
    pub fn rule_sections(&self) -> impl Iterator<Item = &GuideSection> {
        self.sections.iter().filter(|s| s.level == 3)
    }

    pub fn heading_slugs(&self) -> FxHashSet<String> {
        self.sections
            .iter()
            .map(|s| slugify(&s.title))
            .collect()
    }

    /// Find a section by anchor slug.
    pub fn section_by_anchor(&self, anchor: &str) -> Option<&GuideSection> {
        self.sections.iter().find(|s| slugify(&s.title) == anchor)
    }
}

/// Run the document-consistency checks. Returns human-readable issue
/// descriptions; an empty vector means the document is consistent.
pub fn consistency_issues(doc: &GuideDoc) -> Vec<String> {
    let mut issues = Vec::new();

    let slugs = doc.heading_slugs();
    for entry in &doc.toc {
        if !slugs.contains(&entry.anchor) {
            issues.push(format!(
                "TOC entry '{}' (line {}) links to missing section #{}",
                entry.text, entry.line, entry.anchor
            ));
        }
    }

    for section in doc.rule_sections() {
        if section.fence_count == 0 {
            issues.push(format!(
                "rule section '{}' (line {}) has no fenced code block",
                section.title, section.line
            ));
        }
    }

    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    for section in &doc.sections {
        if let Some(first_line) = seen.insert(section.title.clone(), section.line) {
            issues.push(format!(
                "duplicate heading '{}' (lines {} and {})",
                section.title, first_line, section.line
            ));
        }
    }

    let toc_anchors: FxHashSet<&str> = doc.toc.iter().map(|e| e.anchor.as_str()).collect();
    for section in doc.rule_sections() {
        if !toc_anchors.contains(slugify(&section.title).as_str()) {
            issues.push(format!(
                "rule section '{}' (line {}) is missing from the table of contents",
                section.title, section.line
            ));
        }
    }

    issues
}
