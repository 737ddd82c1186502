//! Post-processing of free-form model replies.

use std::collections::HashSet;

use serde::Serialize;

pub const MAX_KEY_POINTS: usize = 10;
pub const MAX_SUGGESTED_POSITIONS: usize = 8;
pub const FALLBACK_CATEGORY: &str = "General";
const MAX_CATEGORY_CHARS: usize = 50;
const MAX_POSITION_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub number: u32,
    pub title: String,
    pub content: String,
}

/// Bullet lines (`- `, `• `, `* `) and lines that mention a key point,
/// something important or something to remember.
pub fn extract_key_points(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            for bullet in ["- ", "• ", "* "] {
                if let Some(rest) = line.strip_prefix(bullet) {
                    return Some(rest.trim().to_string());
                }
            }
            let lower = line.to_lowercase();
            ["key point", "important", "remember"]
                .iter()
                .any(|marker| lower.contains(marker))
                .then(|| line.to_string())
        })
        .filter(|point| !point.is_empty())
        .take(MAX_KEY_POINTS)
        .collect()
}

/// Parses `Chapter N: Title` (also `N.` / `N -`), tolerating markdown heading
/// and bold markers around it.
fn parse_chapter_heading(line: &str) -> Option<(u32, String)> {
    let line = line
        .trim()
        .trim_start_matches('#')
        .trim_matches('*')
        .trim();
    let rest = line.get(..8).filter(|p| p.eq_ignore_ascii_case("chapter "))?;
    let rest = &line[rest.len()..];

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let number: u32 = digits.parse().ok()?;
    let title = rest[digits.len()..]
        .trim_start_matches([':', '.', '-', ' '])
        .trim_matches('*')
        .trim();
    Some((number, title.to_string()))
}

/// Splits a reply into ordered chapters. Text before the first heading is
/// dropped; a reply without any heading becomes one "Overview" chapter.
pub fn parse_chapters(reply: &str) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();

    for line in reply.lines() {
        if let Some((number, title)) = parse_chapter_heading(line) {
            let title = if title.is_empty() {
                format!("Chapter {number}")
            } else {
                title
            };
            chapters.push(Chapter {
                number,
                title,
                content: String::new(),
            });
        } else if let Some(current) = chapters.last_mut() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !current.content.is_empty() {
                current.content.push('\n');
            }
            current.content.push_str(line);
        }
    }

    if chapters.is_empty() {
        return vec![Chapter {
            number: 1,
            title: "Overview".to_string(),
            content: reply.trim().to_string(),
        }];
    }

    chapters.sort_by_key(|c| c.number);
    chapters
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')', ':']) {
            return rest.trim_start();
        }
    }
    line
}

/// Removes surrounding quotes, emphasis markers and trailing punctuation.
fn strip_decorations(text: &str) -> &str {
    let is_quote = |c: char| matches!(c, '"' | '\'' | '*' | '`');
    text.trim()
        .trim_end_matches(['.', ';'])
        .trim_matches(is_quote)
        .trim_end_matches(['.', ';'])
        .trim()
}

/// Up to eight distinct position titles from a one-per-line (or comma
/// separated) reply. Intro lines ending in `:` are skipped.
pub fn parse_position_list(reply: &str) -> Vec<String> {
    let lines: Vec<&str> = reply.lines().filter(|l| !l.trim().is_empty()).collect();
    let candidates: Vec<&str> = if lines.len() == 1 && lines[0].contains(',') {
        lines[0].split(',').collect()
    } else {
        lines
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|raw| !raw.trim_end().ends_with(':'))
        .map(|raw| strip_decorations(strip_list_marker(raw)).to_string())
        .filter(|p| !p.is_empty() && p.chars().count() <= MAX_POSITION_CHARS)
        .filter(|p| seen.insert(p.to_lowercase()))
        .take(MAX_SUGGESTED_POSITIONS)
        .collect()
}

/// First non-empty line, without a `Category:` label, quotes or a trailing
/// period. Falls back to "General".
pub fn clean_category(reply: &str) -> String {
    let Some(line) = reply.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return FALLBACK_CATEGORY.to_string();
    };
    let line = match line.get(..9) {
        Some(prefix) if prefix.eq_ignore_ascii_case("category:") => &line[9..],
        _ => line,
    };
    let cleaned: String = strip_decorations(line)
        .chars()
        .take(MAX_CATEGORY_CHARS)
        .collect();

    if cleaned.is_empty() {
        FALLBACK_CATEGORY.to_string()
    } else {
        cleaned
    }
}
