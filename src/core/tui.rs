use std::env;

const MIN_BOX_WIDTH: usize = 40;
const MAX_BOX_WIDTH: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoxStyle {
    Success,
    Warning,
    Cyan,
}

pub fn terminal_width() -> usize {
    env::var("TERM_WIDTH")
        .ok()
        .and_then(|w| w.parse().ok())
        .or_else(|| env::var("COLUMNS").ok().and_then(|c| c.parse().ok()))
        .unwrap_or(80)
}

fn effective_width() -> usize {
    terminal_width().max(MIN_BOX_WIDTH).min(MAX_BOX_WIDTH)
}

pub fn box_top(width: usize) -> String {
    let w = width.max(MIN_BOX_WIDTH).min(effective_width());
    format!("╔{}╗", "═".repeat(w.saturating_sub(2)))
}

pub fn box_bottom(width: usize) -> String {
    let w = width.max(MIN_BOX_WIDTH).min(effective_width());
    format!("╚{}╝", "═".repeat(w.saturating_sub(2)))
}

pub fn box_row(left: &str, content: &str, right: &str, width: usize) -> String {
    let w = width.max(MIN_BOX_WIDTH).min(effective_width());
    let content_len = content.chars().count();
    let padding = w.saturating_sub(2).saturating_sub(content_len);
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;
    format!(
        "{}{}{}{}{}",
        left,
        " ".repeat(left_pad),
        content,
        " ".repeat(right_pad),
        right
    )
}

pub fn render_box(title: &str, subtitle: &str, style: BoxStyle) {
    use colored::Colorize;

    let width = effective_width();

    match style {
        BoxStyle::Success => {
            println!("{}", box_top(width).bright_green());
            println!("{}", box_row("║", title, "║", width).bright_green().bold());
            if !subtitle.is_empty() {
                println!("{}", box_row("║", subtitle, "║", width).green());
            }
            println!("{}", box_bottom(width).bright_green());
        }
        BoxStyle::Warning => {
            println!("{}", box_top(width).bright_yellow());
            println!("{}", box_row("║", title, "║", width).bright_yellow().bold());
            if !subtitle.is_empty() {
                println!("{}", box_row("║", subtitle, "║", width).yellow());
            }
            println!("{}", box_bottom(width).bright_yellow());
        }
        BoxStyle::Cyan => {
            println!("{}", box_top(width).bright_cyan());
            println!("{}", box_row("║", title, "║", width).bright_cyan().bold());
            if !subtitle.is_empty() {
                println!("{}", box_row("║", subtitle, "║", width).cyan());
            }
            println!("{}", box_bottom(width).bright_cyan());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_row_pads_to_width() {
        let row = box_row("║", "hi", "║", 40);
        assert!(row.starts_with('║') && row.ends_with('║'));
        assert_eq!(row.chars().count(), 40);
    }
}
