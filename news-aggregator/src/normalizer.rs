//! Headline neutralization and summary truncation.
//!
//! Everything here is pure text processing: no I/O, no language detection.
//! Each function accepts empty input and returns non-empty output.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_BODY_CHARS: usize = 50;
pub const SUMMARY_CHARS: usize = 200;
pub const SENTENCE_FLOOR: usize = 100;
pub const DEFAULT_HEADLINE: &str = "News update";

static LEADING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(bbc\s*-\s*|(live|watch)\s*:\s*)").unwrap());

static MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(breaking news|breaking|urgent|exclusive|just in)\b:?").unwrap()
});

static REPEATED_EXCLAMATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{2,}").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").unwrap());

static SUBSTITUTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"(?i)\b(slams|blasts|destroys|rips|tears into|lashes out|crushes)\b",
            "criticizes",
        ),
        (r"(?i)\b(fury|outrage|chaos|mayhem)\b", "concern"),
        (
            r"(?i)\b(shocking|stunning|incredible|amazing|perfect|terrible|awful)\b",
            "notable",
        ),
        (r"(?i)\b(disaster|catastrophe)\b", "incident"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Strip sensational markers and swap charged vocabulary for neutral words.
///
/// Order: markers, then exclamation/whitespace collapse, then trim, then
/// lexical substitution.
pub fn neutralize_headline(title: &str) -> String {
    let stripped = LEADING_LABEL.replace(title, "");
    let stripped = MARKERS.replace_all(&stripped, "");
    let collapsed = REPEATED_EXCLAMATION.replace_all(&stripped, "");
    let collapsed = collapse_whitespace(&collapsed);
    let trimmed = collapsed
        .trim_start_matches(|c: char| matches!(c, ':' | '-' | '|' | ',') || c.is_whitespace())
        .trim();

    let neutral = SUBSTITUTIONS
        .iter()
        .fold(trimmed.to_string(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, *replacement).into_owned()
        });

    if neutral.is_empty() {
        DEFAULT_HEADLINE.to_string()
    } else {
        neutral
    }
}

/// Build a summary of at most ~200 characters, cut at a sentence end when
/// one exists past the floor.
pub fn summarize(body: Option<&str>, title: &str) -> String {
    let body = body.map(str::trim).unwrap_or_default();
    if body.chars().count() < MIN_BODY_CHARS {
        return placeholder_summary(title);
    }

    let truncated = body.chars().count() > SUMMARY_CHARS;
    let head: String = body.chars().take(SUMMARY_CHARS).collect();
    let summary = collapse_whitespace(&head);

    if let Some(end) = summary.rfind('.') {
        if summary[..end].chars().count() > SENTENCE_FLOOR {
            return summary[..=end].to_string();
        }
    }

    let kept = if truncated {
        match summary.rfind(' ') {
            Some(space) if space > 0 => &summary[..space],
            _ => summary.as_str(),
        }
    } else {
        summary.as_str()
    };

    format!("{}...", kept.trim_end())
}

fn placeholder_summary(title: &str) -> String {
    let title = title.trim();
    let subject = if title.is_empty() {
        "this story".to_string()
    } else {
        title.to_lowercase()
    };
    format!("News about {}. More details available from the source.", subject)
}

/// Drop markup tags and entities from a feed description.
pub fn strip_markup(html: &str) -> String {
    let text = html
        .chars()
        .fold((String::new(), false), |(mut text, in_tag), c| match c {
            '<' => (text, true),
            '>' => {
                text.push(' ');
                (text, false)
            }
            _ if !in_tag => {
                text.push(c);
                (text, in_tag)
            }
            _ => (text, in_tag),
        })
        .0;

    let text = HTML_ENTITY.replace_all(&text, " ");
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
