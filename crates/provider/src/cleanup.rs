//! Post-processing of model output.
//!
//! Models like to wrap a one-line rewrite in quotes, markdown, code fences or
//! a "Here's a friendlier version:" preamble. Everything here strips that
//! wrapping so the cell receives just the copy.

use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    bold_star: Regex,
    italic_star: Regex,
    bold_underscore: Regex,
    italic_underscore: Regex,
    wrapper_phrase: Regex,
    wrapper_label: Regex,
    echo_same_meaning: Regex,
    echo_keep_meaning: Regex,
    echo_return_only: Regex,
    fence_open: Regex,
    fence_close: Regex,
    label_line: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Patterns {
            bold_star: re(r"\*\*([^*]+)\*\*"),
            italic_star: re(r"\*([^*]+)\*"),
            bold_underscore: re(r"__([^_]+)__"),
            italic_underscore: re(r"_([^_]+)_"),
            wrapper_phrase: re(
                r"(?i)^(Here is|Here's|This is|I've rewritten|I have rewritten|Rewritten|The rewritten)[^:\n]*[:\n]\s*",
            ),
            wrapper_label: re(r"(?i)^(Output|Result|Answer)[:\n]\s*"),
            echo_same_meaning: re(r"(?i)\s*Same meaning[,.]?\s*different wording\.?\s*$"),
            echo_keep_meaning: re(r"(?i)\s*Keep(ing)? the same meaning\.?\s*$"),
            echo_return_only: re(r"(?i)\s*Return only the rewritten text\.?\s*$"),
            fence_open: re(r"(?i)^```[a-z]*\n?"),
            fence_close: re(r"\n?```$"),
            label_line: re(r"(?i)^(Rewritten|Output|Result|Here)"),
        }
    })
}

/// Strip one pair of matching wrapping quotes (`"…"` or `'…'`).
pub fn strip_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return inner.trim();
        }
    }
    text
}

/// Reduce raw model output to the rewritten copy.
pub fn sanitize(raw: &str) -> String {
    let text = strip_wrapping_quotes(raw.trim());
    if text.is_empty() {
        return String::new();
    }
    let p = patterns();

    let mut cleaned = p.bold_star.replace_all(text, "$1").into_owned();
    cleaned = p.italic_star.replace_all(&cleaned, "$1").into_owned();
    cleaned = p.bold_underscore.replace_all(&cleaned, "$1").into_owned();
    cleaned = p.italic_underscore.replace_all(&cleaned, "$1").into_owned();

    cleaned = p.wrapper_phrase.replace(&cleaned, "").into_owned();
    cleaned = p.wrapper_label.replace(&cleaned, "").into_owned();

    cleaned = p.echo_same_meaning.replace(&cleaned, "").into_owned();
    cleaned = p.echo_keep_meaning.replace(&cleaned, "").into_owned();
    cleaned = p.echo_return_only.replace(&cleaned, "").into_owned();

    cleaned = p.fence_open.replace(&cleaned, "").into_owned();
    cleaned = p.fence_close.replace(&cleaned, "").into_owned();

    let lines: Vec<&str> = cleaned
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() > 1 {
        let first = lines[0];
        if first.ends_with(':') || p.label_line.is_match(first) {
            cleaned = lines[1..].join("\n");
        }
    }

    cleaned.trim().to_string()
}
