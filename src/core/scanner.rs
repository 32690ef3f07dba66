//! Source scanner: turns PowerShell script text into candidate sites.
//!
//! Rules do not see raw files. The scanner walks the requested paths,
//! filters to script extensions, and produces one `ScriptSource` per file:
//! the raw lines plus a *masked* view in which comment text and string
//! interiors are blanked out. Code-pattern rules match against the masked
//! view so that prose in comments and literals cannot trigger them; rules
//! that inspect literal content (quoting, hardcoded names) read the raw
//! line and re-extract strings with `extract_strings`.
//!
//! The masker is a character state machine, not a parser: it tracks line
//! comments, `<# #>` block comments, single/double quoted strings (backtick
//! and doubled-quote escapes), and `@"`/`@'` here-strings. It never
//! evaluates script text.

use crate::core::error::PsguardError;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCRIPT_EXTENSIONS: [&str; 3] = ["ps1", "psm1", "psd1"];

/// Inline suppression marker, e.g. `Write-Host 'x'  # psguard: ignore`.
pub const SUPPRESS_MARKER: &str = "psguard: ignore";

#[derive(Debug, Clone)]
pub struct ScriptLine {
    /// 1-indexed line number.
    pub number: usize,
    pub raw: String,
    /// Raw line with comment text and string interiors blanked to spaces;
    /// string delimiters are kept so rules can still see where literals sit.
    pub masked: String,
    /// Line carries a `# psguard: ignore` comment.
    pub suppressed: bool,
}

#[derive(Debug, Clone)]
pub struct ScriptSource {
    pub path: String,
    pub lines: Vec<ScriptLine>,
}

#[derive(Clone, Copy, PartialEq)]
enum MaskState {
    Normal,
    LineComment,
    BlockComment,
    Single,
    Double,
    HereSingle,
    HereDouble,
}

impl ScriptSource {
    pub fn parse(path: &str, content: &str) -> ScriptSource {
        let mut lines: Vec<ScriptLine> = Vec::new();
        let mut state = MaskState::Normal;

        for (idx, raw_line) in content.lines().enumerate() {
            let chars: Vec<char> = raw_line.chars().collect();
            let mut masked = String::with_capacity(raw_line.len());
            let mut comment_text = String::new();
            let mut i = 0usize;

            // Line comments never carry across lines.
            if state == MaskState::LineComment {
                state = MaskState::Normal;
            }
            // A here-string terminator must be the first thing on a line.
            if state == MaskState::HereSingle && raw_line.starts_with("'@") {
                masked.push_str("'@");
                for _ in 2..chars.len() {
                    masked.push(' ');
                }
                state = MaskState::Normal;
                push_line(&mut lines, idx, raw_line, masked, &comment_text);
                continue;
            }
            if state == MaskState::HereDouble && raw_line.starts_with("\"@") {
                masked.push_str("\"@");
                for _ in 2..chars.len() {
                    masked.push(' ');
                }
                state = MaskState::Normal;
                push_line(&mut lines, idx, raw_line, masked, &comment_text);
                continue;
            }

            while i < chars.len() {
                let c = chars[i];
                let next = chars.get(i + 1).copied();
                match state {
                    MaskState::Normal => match c {
                        '#' => {
                            state = MaskState::LineComment;
                            masked.push(' ');
                            comment_text.extend(&chars[i..]);
                            for _ in i + 1..chars.len() {
                                masked.push(' ');
                            }
                            i = chars.len();
                            continue;
                        }
                        '<' if next == Some('#') => {
                            state = MaskState::BlockComment;
                            masked.push(' ');
                            masked.push(' ');
                            i += 2;
                            continue;
                        }
                        '@' if next == Some('\'') => {
                            state = MaskState::HereSingle;
                            masked.push('@');
                            masked.push('\'');
                            i += 2;
                            continue;
                        }
                        '@' if next == Some('"') => {
                            state = MaskState::HereDouble;
                            masked.push('@');
                            masked.push('"');
                            i += 2;
                            continue;
                        }
                        '\'' => {
                            state = MaskState::Single;
                            masked.push('\'');
                        }
                        '"' => {
                            state = MaskState::Double;
                            masked.push('"');
                        }
                        _ => masked.push(c),
                    },
                    MaskState::LineComment => {
                        masked.push(' ');
                    }
                    MaskState::BlockComment => {
                        if c == '#' && next == Some('>') {
                            state = MaskState::Normal;
                            masked.push(' ');
                            masked.push(' ');
                            i += 2;
                            continue;
                        }
                        masked.push(' ');
                    }
                    MaskState::Single => {
                        if c == '\'' {
                            if next == Some('\'') {
                                masked.push(' ');
                                masked.push(' ');
                                i += 2;
                                continue;
                            }
                            state = MaskState::Normal;
                            masked.push('\'');
                        } else {
                            masked.push(' ');
                        }
                    }
                    MaskState::Double => {
                        if c == '`' {
                            masked.push(' ');
                            if next.is_some() {
                                masked.push(' ');
                                i += 2;
                                continue;
                            }
                        } else if c == '"' {
                            if next == Some('"') {
                                masked.push(' ');
                                masked.push(' ');
                                i += 2;
                                continue;
                            }
                            state = MaskState::Normal;
                            masked.push('"');
                        } else {
                            masked.push(' ');
                        }
                    }
                    MaskState::HereSingle | MaskState::HereDouble => {
                        masked.push(' ');
                    }
                }
                i += 1;
            }

            // Ordinary strings do not survive the end of a line here; an
            // unterminated quote would otherwise poison the rest of the file.
            if state == MaskState::Single || state == MaskState::Double {
                state = MaskState::Normal;
            }

            push_line(&mut lines, idx, raw_line, masked, &comment_text);
        }

        ScriptSource {
            path: path.to_string(),
            lines,
        }
    }

    pub fn read(path: &Path) -> Result<ScriptSource, PsguardError> {
        let content = fs::read_to_string(path).map_err(PsguardError::IoError)?;
        // Editors on Windows love to prepend a BOM; it is not part of line 1.
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        Ok(ScriptSource::parse(&path.display().to_string(), content))
    }
}

fn push_line(
    lines: &mut Vec<ScriptLine>,
    idx: usize,
    raw: &str,
    masked: String,
    comment_text: &str,
) {
    lines.push(ScriptLine {
        number: idx + 1,
        raw: raw.to_string(),
        masked,
        suppressed: comment_text.contains(SUPPRESS_MARKER),
    });
}

/// A string literal found on a single line.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    pub delim: char,
    pub body: String,
}

/// Extract single-line quoted literals from a raw line. Comment text is
/// honored: literals after a `#` are not returned.
pub fn extract_strings(raw: &str) -> Vec<StringLit> {
    let mut out = Vec::new();
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        match chars[i] {
            '#' => break,
            '<' if chars.get(i + 1) == Some(&'#') => break,
            delim @ ('\'' | '"') => {
                let mut body = String::new();
                let mut j = i + 1;
                let mut closed = false;
                while j < chars.len() {
                    let c = chars[j];
                    if delim == '"' && c == '`' && j + 1 < chars.len() {
                        body.push(c);
                        body.push(chars[j + 1]);
                        j += 2;
                        continue;
                    }
                    if c == delim {
                        if chars.get(j + 1) == Some(&delim) {
                            body.push(delim);
                            j += 2;
                            continue;
                        }
                        closed = true;
                        break;
                    }
                    body.push(c);
                    j += 1;
                }
                if closed {
                    out.push(StringLit { delim, body });
                    i = j + 1;
                    continue;
                }
                break;
            }
            _ => {}
        }
        i += 1;
    }
    out
}

pub fn is_script_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SCRIPT_EXTENSIONS.iter().any(|known| *known == e)
        })
        .unwrap_or(false)
}

/// Recursively collect script files under `root`, skipping `.git`,
/// `.psguard`, `target`, and any path containing an exclusion substring.
pub fn collect_script_files(
    root: &Path,
    exclude: &[String],
) -> Result<Vec<PathBuf>, PsguardError> {
    fn recurse(
        dir: &Path,
        exclude: &[String],
        out: &mut Vec<PathBuf>,
    ) -> Result<(), PsguardError> {
        if !dir.is_dir() {
            return Ok(());
        }

        let name = dir.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if name == ".git" || name == ".psguard" || name == "target" {
            return Ok(());
        }

        for entry in fs::read_dir(dir).map_err(PsguardError::IoError)? {
            let entry = entry.map_err(PsguardError::IoError)?;
            let path = entry.path();
            if path.is_dir() {
                recurse(&path, exclude, out)?;
            } else if path.is_file() && is_script_file(&path) {
                let display = path.display().to_string();
                if !exclude.iter().any(|e| display.contains(e.as_str())) {
                    out.push(path);
                }
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    if root.is_file() {
        if is_script_file(root) {
            out.push(root.to_path_buf());
        }
        return Ok(out);
    }
    recurse(root, exclude, &mut out)?;
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_line_comments() {
        let source = ScriptSource::parse("t.ps1", "Get-Service # uses iex inside prose\n");
        assert!(source.lines[0].masked.starts_with("Get-Service"));
        assert!(!source.lines[0].masked.contains("iex"));
    }

    #[test]
    fn masks_string_interiors_but_keeps_delims() {
        let source = ScriptSource::parse("t.ps1", "$x = 'Write-Host'\n");
        let masked = &source.lines[0].masked;
        assert!(!masked.contains("Write-Host"));
        assert!(masked.contains('\''));
        assert!(masked.starts_with("$x = "));
    }

    #[test]
    fn masks_block_comments_across_lines() {
        let source = ScriptSource::parse("t.ps1", "<# first\niex $x\n#>\nGet-Item\n");
        assert!(!source.lines[1].masked.contains("iex"));
        assert!(source.lines[3].masked.contains("Get-Item"));
    }

    #[test]
    fn masks_here_strings() {
        let text = "$doc = @\"\nWrite-Host inside\n\"@\nWrite-Host 'after'\n";
        let source = ScriptSource::parse("t.ps1", text);
        assert!(!source.lines[1].masked.contains("Write-Host"));
        assert!(source.lines[3].masked.contains("Write-Host"));
    }

    #[test]
    fn doubled_quote_escape_stays_in_string() {
        let source = ScriptSource::parse("t.ps1", "$x = 'it''s iex' ; Get-Item\n");
        let masked = &source.lines[0].masked;
        assert!(!masked.contains("iex"));
        assert!(masked.contains("Get-Item"));
    }

    #[test]
    fn suppression_marker_is_detected() {
        let source = ScriptSource::parse("t.ps1", "iex $x # psguard: ignore\niex $y\n");
        assert!(source.lines[0].suppressed);
        assert!(!source.lines[1].suppressed);
    }

    #[test]
    fn extract_strings_returns_bodies() {
        let lits = extract_strings("Invoke-Command -ComputerName 'SQLPROD-04' -Port \"80\"");
        assert_eq!(lits.len(), 2);
        assert_eq!(lits[0].delim, '\'');
        assert_eq!(lits[0].body, "SQLPROD-04");
        assert_eq!(lits[1].delim, '"');
    }

    #[test]
    fn extract_strings_ignores_comment_tail() {
        let lits = extract_strings("Get-Item # 'not a literal'");
        assert!(lits.is_empty());
    }

    #[test]
    fn script_file_filter() {
        assert!(is_script_file(Path::new("a/resource.psm1")));
        assert!(is_script_file(Path::new("Deploy.PS1")));
        assert!(!is_script_file(Path::new("notes.md")));
    }
}
