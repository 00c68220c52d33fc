//! Document export preparation.
//!
//! Turns generated resume or cover letter text into paginated plain-text
//! pages. Rendering those pages into a PDF happens elsewhere.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^\x20-\x7E\n\r\t•]").unwrap();
}

/// Replace every character outside printable ASCII, line breaks, tabs and
/// the bullet `•` with a space.
pub fn sanitize(text: &str) -> String {
    DISALLOWED.replace_all(text, " ").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub max_columns: usize,
    pub lines_per_page: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_columns: 90,
            lines_per_page: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based
    pub number: usize,
    pub lines: Vec<String>,
}

/// Word-wrap `text` and split it into pages.
///
/// Existing line breaks are kept. Words longer than a line are split.
/// The result always has at least one page.
pub fn layout(text: &str, options: LayoutOptions) -> Vec<Page> {
    let columns = options.max_columns.max(1);
    let per_page = options.lines_per_page.max(1);

    let lines: Vec<String> = text
        .split('\n')
        .flat_map(|paragraph| wrap(paragraph.trim_end_matches('\r'), columns))
        .collect();

    if lines.is_empty() {
        return vec![Page {
            number: 1,
            lines: Vec::new(),
        }];
    }

    lines
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            lines: chunk.to_vec(),
        })
        .collect()
}

fn wrap(paragraph: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in paragraph.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > columns {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + needed > columns && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    fn file_stem(self) -> &'static str {
        match self {
            DocumentKind::Resume => "Resume",
            DocumentKind::CoverLetter => "CoverLetter",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A sanitized, paginated document ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub kind: DocumentKind,
    pub pages: Vec<Page>,
}

impl ExportDocument {
    pub fn new(kind: DocumentKind, text: &str, options: LayoutOptions) -> Self {
        Self {
            kind,
            pages: layout(&sanitize(text), options),
        }
    }

    pub fn resume(text: &str, options: LayoutOptions) -> Self {
        Self::new(DocumentKind::Resume, text, options)
    }

    pub fn cover_letter(text: &str, options: LayoutOptions) -> Self {
        Self::new(DocumentKind::CoverLetter, text, options)
    }

    /// `<kind>_JobHero.<ext>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}_JobHero.{}", self.kind, extension.trim_start_matches('.'))
    }

    /// Plain text with a form feed between pages.
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\u{000C}\n")
    }
}
