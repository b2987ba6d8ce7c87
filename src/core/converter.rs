//! Heuristic plain-text to markdown conversion
//!
//! Text extracted from an uploaded document carries no structure, so this
//! module guesses it with an ordered list of pattern rewrites. There is no
//! grammar and no tree: every [`Rule`] maps the whole text to a new string and
//! the result is threaded into the next rule.
//!
//! The guesses can be wrong. The best known false positive is
//! [`infer_short_headings`], which turns any short capitalized line without
//! terminal punctuation into a heading, sentence or not. The output is meant
//! to be reviewed and edited by hand.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

/// A named rewrite step of the conversion pipeline
#[derive(Clone, Copy)]
pub struct Rule {
    /// Short identifier used in logs and tests
    pub name: &'static str,
    /// Pure rewrite of the whole text
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// The rewrite pipeline in application order.
///
/// Heading inference has to run before the list and table rules, and blank
/// line collapsing has to run last because table separator insertion adds
/// line breaks.
pub const RULES: [Rule; 9] = [
    Rule { name: "underline-headings", apply: promote_underlined_headings },
    Rule { name: "short-line-headings", apply: infer_short_headings },
    Rule { name: "emphasis", apply: normalize_emphasis },
    Rule { name: "lists", apply: normalize_lists },
    Rule { name: "autolinks", apply: autolink },
    Rule { name: "table-separators", apply: insert_table_separators },
    Rule { name: "blockquotes", apply: normalize_blockquotes },
    Rule { name: "code-blocks", apply: normalize_code_blocks },
    Rule { name: "blank-lines", apply: collapse_blank_lines },
];

/// Headings longer than this are assumed to be prose
const MAX_INFERRED_HEADING_CHARS: usize = 80;

static UNDERLINE_H1: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^(.+)\n=+$"));
static UNDERLINE_H2: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^(.+)\n-+$"));
static TERMINATED_LINE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^([^\r\n]*)\r?\n"));
static DOUBLE_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b__(.+?)__\b"));
static SINGLE_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b_(.+?)_\b"));
static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^(\d+)\.[ \t]+(.+)$"));
static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^[ \t]*[*•-][ \t]+(.+)$"));
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| pattern(r"https?://\S+"));
static PIPE_ROW: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^[^\n]*\|[^\n]*\|[^\n]*$"));
static QUOTE_LINE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^>[ \t]+(.+)$"));
static INDENTED_LINE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^(?: {4}|\t)(.+)$"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| pattern(r"\n{3,}"));

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("built-in conversion pattern must compile")
}

/// Convert plain text into best-effort markdown.
///
/// Never fails. Empty or whitespace-only input is returned unchanged.
pub fn convert(input: &str) -> String {
    if input.trim().is_empty() {
        return input.to_string();
    }

    let output = RULES
        .iter()
        .fold(input.to_string(), |text, rule| (rule.apply)(&text));

    tracing::debug!(
        input_len = input.len(),
        output_len = output.len(),
        "Converted text to markdown"
    );
    output
}

/// `Title\n===` becomes `# Title`, `Title\n---` becomes `## Title`
pub fn promote_underlined_headings(text: &str) -> String {
    let text = promote_with(&UNDERLINE_H1, text, "#");
    promote_with(&UNDERLINE_H2, &text, "##")
}

fn promote_with(re: &Regex, text: &str, marker: &str) -> String {
    let mut out = String::with_capacity(text.len() + marker.len() + 1);
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = re.captures_at(text, pos) {
        let (Some(whole), Some(line)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        if line.as_str().starts_with('#') {
            // Already a heading; the underline may still start a match of its own
            pos = line.end() + 1;
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        out.push_str(marker);
        out.push(' ');
        out.push_str(line.as_str());
        last = whole.end();
        pos = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

/// Prefix short capitalized lines without terminal punctuation with `# `.
///
/// Only newline-terminated lines are considered, so a trailing line without
/// a line break is never promoted.
pub fn infer_short_headings(text: &str) -> String {
    TERMINATED_LINE
        .replace_all(text, |caps: &Captures<'_>| {
            let line = &caps[1];
            if looks_like_heading(line) {
                format!("# {line}\n")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn looks_like_heading(line: &str) -> bool {
    let trimmed = line.trim();
    line.chars().count() < MAX_INFERRED_HEADING_CHARS
        && !trimmed.is_empty()
        && line.starts_with(|c: char| c.is_ascii_uppercase())
        && !trimmed.ends_with(['.', '!', '?'])
}

/// `__bold__` becomes `**bold**` and `_italic_` becomes `*italic*`.
///
/// Text already wrapped in `**` passes through untouched.
pub fn normalize_emphasis(text: &str) -> String {
    let text = DOUBLE_UNDERSCORE.replace_all(text, "**${1}**");
    SINGLE_UNDERSCORE.replace_all(&text, "*${1}*").into_owned()
}

/// Canonical `1. item` and `- item` list markers
pub fn normalize_lists(text: &str) -> String {
    let text = NUMBERED_ITEM.replace_all(text, "${1}. ${2}");
    BULLET_ITEM.replace_all(&text, "- ${1}").into_owned()
}

/// Wrap bare URLs as `[url](url)`.
///
/// A URL directly preceded by `(`, `[` or `<` is already part of link syntax
/// and is left alone.
pub fn autolink(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for found in BARE_URL.find_iter(text) {
        out.push_str(&text[last..found.start()]);
        let url = found.as_str();
        if is_bare(&text[..found.start()]) {
            out.push('[');
            out.push_str(url);
            out.push_str("](");
            out.push_str(url);
            out.push(')');
        } else {
            out.push_str(url);
        }
        last = found.end();
    }

    out.push_str(&text[last..]);
    out
}

fn is_bare(preceding: &str) -> bool {
    !matches!(preceding.chars().last(), Some('(' | '[' | '<'))
}

/// Insert a dash line under every row that looks like a table row.
///
/// Any line with two or more `|` counts, unless it already is a separator.
/// Column counts are not checked.
pub fn insert_table_separators(text: &str) -> String {
    PIPE_ROW
        .replace_all(text, |caps: &Captures<'_>| {
            let row = &caps[0];
            if looks_like_separator(row) {
                return row.to_string();
            }
            let width = row.trim_end_matches('\r').chars().count();
            format!("{row}\n{}", "-".repeat(width))
        })
        .into_owned()
}

fn looks_like_separator(row: &str) -> bool {
    row.contains('-')
        && row
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t' | '\r'))
}

/// Exactly one space after a leading `>`
pub fn normalize_blockquotes(text: &str) -> String {
    QUOTE_LINE.replace_all(text, "> ${1}").into_owned()
}

/// A leading tab or four spaces becomes exactly four spaces.
///
/// Deeper indentation keeps everything past the first four columns as is.
pub fn normalize_code_blocks(text: &str) -> String {
    INDENTED_LINE.replace_all(text, "    ${1}").into_owned()
}

/// Runs of three or more line breaks become a single blank line
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_position(name: &str) -> usize {
        RULES.iter().position(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_rule_order() {
        let headings = rule_position("short-line-headings");
        assert!(headings < rule_position("lists"));
        assert!(headings < rule_position("table-separators"));
        assert_eq!(rule_position("blank-lines"), RULES.len() - 1);
    }

    #[test]
    fn test_underlined_h1() {
        let out = convert("Title\n=====\n");
        assert!(out.starts_with("# Title\n"), "got {out:?}");
        assert!(!out.contains('='));
    }

    #[test]
    fn test_underlined_h2() {
        let out = convert("Section\n-------\n");
        assert!(out.starts_with("## Section\n"), "got {out:?}");
    }

    #[test]
    fn test_underline_skips_existing_heading() {
        assert_eq!(convert("# Title\n=====\n"), "# Title\n=====\n");
    }

    #[test]
    fn test_underline_after_heading_is_rescanned() {
        assert_eq!(promote_underlined_headings("# A\n===\n==="), "# A\n# ===");
        assert_eq!(promote_underlined_headings("## B\n---\n---\n"), "## B\n## ---\n");
    }

    #[test]
    fn test_short_capitalized_line_becomes_heading() {
        assert_eq!(
            convert("Introduction\nthis is the body text.\n"),
            "# Introduction\nthis is the body text.\n"
        );
    }

    #[test]
    fn test_short_sentence_without_punctuation_is_misread_as_heading() {
        // Known false positive of the heuristic.
        assert_eq!(convert("Call me tomorrow\n"), "# Call me tomorrow\n");
    }

    #[test]
    fn test_heading_inference_limits() {
        assert_eq!(convert("This ends with a period.\n"), "This ends with a period.\n");
        assert_eq!(convert("Really?\n"), "Really?\n");
        assert_eq!(convert("lowercase start\n"), "lowercase start\n");
        assert_eq!(convert("Unterminated last line"), "Unterminated last line");

        let long = format!("{}\n", "A".repeat(MAX_INFERRED_HEADING_CHARS));
        assert_eq!(convert(&long), long);
    }

    #[test]
    fn test_heading_inference_drops_carriage_return() {
        assert_eq!(infer_short_headings("Chapter One\r\nbody\r\n"), "# Chapter One\nbody\r\n");
    }

    #[test]
    fn test_bullets_normalized() {
        assert_eq!(
            convert("* item one\n* item two\n"),
            "- item one\n- item two\n"
        );
        assert_eq!(convert("•  third\n   - fourth\n"), "- third\n- fourth\n");
    }

    #[test]
    fn test_numbered_items_normalized() {
        assert_eq!(convert("1.    first step\n2.\tsecond step\n"), "1. first step\n2. second step\n");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(convert("an _italic_ word\n"), "an *italic* word\n");
        assert_eq!(convert("a __bold__ word\n"), "a **bold** word\n");
        assert_eq!(convert("keep **this** as is\n"), "keep **this** as is\n");
        assert_eq!(convert("snake_case_name stays\n"), "snake_case_name stays\n");
    }

    #[test]
    fn test_autolink() {
        let out = convert("Visit http://example.com now");
        assert!(out.contains("[http://example.com](http://example.com)"), "got {out:?}");

        assert_eq!(
            autolink("see https://a.org/x?y=1 and http://b.net"),
            "see [https://a.org/x?y=1](https://a.org/x?y=1) and [http://b.net](http://b.net)"
        );
    }

    #[test]
    fn test_autolink_leaves_existing_links() {
        let linked = "read [docs](https://docs.rs) or <https://crates.io>";
        assert_eq!(autolink(linked), linked);
    }

    #[test]
    fn test_table_separator_inserted() {
        let out = convert("A | B | C\n1 | 2 | 3\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "-".repeat(lines[0].chars().count()));
        assert_eq!(out, "# A | B | C\n-----------\n1 | 2 | 3\n---------\n");
    }

    #[test]
    fn test_existing_separator_not_duplicated() {
        let out = insert_table_separators("| a | b |\n|---|:--|\n");
        assert_eq!(out, "| a | b |\n---------\n|---|:--|\n");
    }

    #[test]
    fn test_single_pipe_is_not_a_table() {
        assert_eq!(insert_table_separators("either | or\n"), "either | or\n");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(convert(">    quoted text\n"), "> quoted text\n");
        assert_eq!(convert(">\tquoted\n"), "> quoted\n");
    }

    #[test]
    fn test_code_block_indentation() {
        assert_eq!(convert("\tlet x = 1;\n"), "    let x = 1;\n");
        assert_eq!(convert("    let y = 2;\n"), "    let y = 2;\n");
        assert_eq!(convert("      deeper();\n"), "      deeper();\n");
    }

    #[test]
    fn test_blank_lines_collapse() {
        assert_eq!(
            convert("first line.\n\n\n\n\nsecond line.\n"),
            "first line.\n\nsecond line.\n"
        );
        assert_eq!(collapse_blank_lines("a\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_blank_lines_collapse_after_table_insertion() {
        let out = convert("x | y | z\n\n\n\nend of text.\n");
        assert!(!out.contains("\n\n\n"), "got {out:?}");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("   \n\n\n\t"), "   \n\n\n\t");
    }

    #[test]
    fn test_never_panics() {
        let inputs = [
            "_",
            "__",
            "____",
            "||||",
            "|\n|\n|",
            "http://",
            "https://\n",
            "\r\n\r\n\r\n",
            "=\n=\n",
            "-\n-\n-",
            "Émile\n",
            "日本語のテキスト\n",
            "* \n1. \n> \n\t\n",
            "🦀 | 🦀 | 🦀\n",
        ];
        for input in inputs {
            let _ = convert(input);
        }
    }

    #[test]
    fn test_idempotent_on_clean_markdown() {
        let input = "# Overview\n\
                     \n\
                     this paragraph ends here.\n\
                     \n\
                     - first point.\n\
                     - second point.\n\
                     \n\
                     1. step one.\n\
                     \n\
                     > quoted line.\n\
                     \n\
                     \x20   code sample;\n\
                     \n\
                     see [http://example.com](http://example.com) for more.\n\
                     \n\
                     use *emphasis* and **strong** text.\n";
        let once = convert(input);
        assert_eq!(once, input);
        assert_eq!(convert(&once), once);
    }

    #[test]
    fn test_tables_are_not_idempotent() {
        let once = convert("A | B | C\n");
        let twice = convert(&once);
        assert_ne!(once, twice);
    }
}
