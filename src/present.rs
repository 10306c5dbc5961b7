//! Terminal presenter
//!
//! Draws one single-line box per host with the host name in the top border,
//! wrapping content to the terminal width, then a footer with hit counts.
//!
//! Width is approximate: only the emoji block (U+1F300..U+1FAFF) counts as two
//! columns. CJK and other wide characters count as one, so boxes holding them
//! render with a ragged right border.

use crate::pipeline::Report;
use crossterm::style::{style, Stylize};

const PAD_X: usize = 2;
const PAD_Y: usize = 1;
/// Columns kept free between the wrapped content and the terminal edge
const WRAP_MARGIN: usize = 10;
const MIN_WRAP: usize = 20;

/// Current terminal width, or the fallback when it cannot be read
pub fn terminal_width(fallback: u16) -> u16 {
    match crossterm::terminal::size() {
        Ok((width, _)) if width > 0 => width,
        _ => fallback,
    }
}

/// Renders a [`Report`] as boxes
#[derive(Debug, Clone)]
pub struct BoxPresenter {
    width: usize,
    color: bool,
}

impl BoxPresenter {
    pub fn new(width: u16) -> Self {
        Self {
            width: width as usize,
            color: true,
        }
    }

    /// Disable border coloring
    pub fn plain(mut self) -> Self {
        self.color = false;
        self
    }

    fn wrap_limit(&self) -> usize {
        self.width.saturating_sub(WRAP_MARGIN).max(MIN_WRAP)
    }

    fn border(&self, s: &str) -> String {
        if self.color {
            style(s).cyan().to_string()
        } else {
            s.to_string()
        }
    }

    /// Box for one host
    pub fn render_box(&self, title: &str, lines: &[String]) -> String {
        let limit = self.wrap_limit();
        let content = lines.join("\n");
        let rows: Vec<String> = content
            .trim_end_matches('\n')
            .split('\n')
            .flat_map(|row| wrap(row, limit))
            .collect();

        let inner = rows
            .iter()
            .map(|r| visible_width(r))
            .chain(std::iter::once(visible_width(title) + 2))
            .max()
            .unwrap_or(0)
            + 2 * PAD_X;

        let mut out = String::new();

        let title_part = format!(" {title} ");
        let rest = inner.saturating_sub(visible_width(&title_part) + 1);
        out.push_str(&self.border(&format!("┌─{title_part}{}┐", "─".repeat(rest))));
        out.push('\n');

        let blank = format!(
            "{}{}{}\n",
            self.border("│"),
            " ".repeat(inner),
            self.border("│")
        );
        for _ in 0..PAD_Y {
            out.push_str(&blank);
        }
        for row in &rows {
            let fill = inner - PAD_X - visible_width(row);
            out.push_str(&format!(
                "{}{}{}{}{}\n",
                self.border("│"),
                " ".repeat(PAD_X),
                row,
                " ".repeat(fill),
                self.border("│")
            ));
        }
        for _ in 0..PAD_Y {
            out.push_str(&blank);
        }

        out.push_str(&self.border(&format!("└{}┘", "─".repeat(inner))));
        out.push('\n');
        out
    }

    /// All boxes followed by the footer
    pub fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        for (host, lines) in &report.groups {
            out.push_str(&self.render_box(host, lines));
        }
        out.push_str(&footer(report));
        out
    }
}

/// Summary line printed after the boxes
pub fn footer(report: &Report) -> String {
    let relation = if report.total.relation.is_empty() {
        String::new()
    } else {
        format!(" ({})", report.total.relation)
    };

    let mut out = format!(
        "Total found records: {}{}, Max cfg records: {}\n",
        report.total.value, relation, report.max_records
    );
    if report.suppressed > 0 {
        out.push_str(&format!(
            "Suppressed by ignore rules: {} of {}\n",
            report.suppressed, report.retrieved
        ));
    }
    out.push('\n');
    out
}

fn char_width(c: char) -> usize {
    if ('\u{1F300}'..='\u{1FAFF}').contains(&c) {
        2
    } else {
        1
    }
}

/// Display width, ignoring ANSI escape sequences
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            width += char_width(c);
        }
    }
    width
}

/// Split a row into chunks no wider than `limit` columns.
/// Escape sequences stay attached to the following character.
fn wrap(row: &str, limit: usize) -> Vec<String> {
    if visible_width(row) <= limit {
        return vec![row.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut width = 0;
    let mut in_escape = false;

    for c in row.chars() {
        if in_escape {
            current.push(c);
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
            continue;
        }
        if c == '\x1b' {
            in_escape = true;
            current.push(c);
            continue;
        }

        let w = char_width(c);
        if width + w > limit {
            chunks.push(std::mem::take(&mut current));
            width = 0;
        }
        current.push(c);
        width += w;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
