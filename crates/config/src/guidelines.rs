//! House writing guidelines, substituted into prompt templates that ask for
//! `{writingGuidelines}`.

pub const VOICE_RULES: &[&str] = &[
    "Use \"you\" and \"your\" (speak directly to the user)",
    "Avoid \"we\" statements; focus on the user's experience, not the company",
    "Use contractions (you're, it's, we'll) so it sounds natural",
];

pub const DO_RULES: &[&str] = &[
    "Use sentence case for headlines and buttons",
    "Write in present tense",
    "Use active voice",
    "Keep sentences under 20 words",
    "Test copy by reading it aloud",
    "Consider the user's emotional state in each context",
];

pub const DONT_RULES: &[&str] = &[
    "Use ALL CAPS (except for brand acronyms)",
    "Use exclamation marks excessively (one per screen max)",
    "Use jargon: buffer, cache, bandwidth, render",
    "Use filler phrases: \"In order to\", \"Please note that\", \"It should be noted\"",
    "Use passive voice: \"Your password has been changed\" → \"Password changed\"",
    "Use double negatives",
    "Be overly apologetic for minor issues",
    "Use \"please\" in buttons (it's implied)",
];

/// (prefer, avoid)
pub const WORD_CHOICES: &[(&str, &str)] = &[
    ("show", "program, series, content"),
    ("movie", "film, feature, title"),
    ("episode", "installment, chapter"),
    ("search", "find, look up, query"),
    ("home", "main, landing, dashboard"),
    ("account", "profile, user settings"),
    ("sign in", "log in, login"),
    ("sign out", "log out, logout"),
    ("free trial", "trial period, trial membership"),
    ("subscription", "membership, plan, package"),
    ("Watch", "View, Play Content"),
];

pub const QUALITY_CHECKLIST: &[&str] = &[
    "Is it clear on first read?",
    "Is it as short as it can be without losing meaning?",
    "Does it tell users what to do next?",
    "Does it match the emotional context?",
    "Would you say this to a friend?",
    "Does it avoid jargon and tech-speak?",
    "Does it work for first-time and returning users?",
];

/// Items of the quality checklist included in the prompt summary.
const SUMMARY_CHECKS: usize = 4;

fn push_section(lines: &mut Vec<String>, title: &str, first: bool) {
    if first {
        lines.push(format!("## {}", title));
    } else {
        lines.push(format!("\n## {}", title));
    }
}

fn push_word_choices(lines: &mut Vec<String>) {
    for (prefer, avoid) in WORD_CHOICES {
        lines.push(format!("- Use \"{}\" not \"{}\"", prefer, avoid));
    }
}

/// Condensed guidelines: voice, word choices and the first checks.
pub fn summary() -> String {
    let mut lines = Vec::new();

    push_section(&mut lines, "Voice", true);
    lines.extend(VOICE_RULES.iter().map(|rule| format!("- {}", rule)));

    push_section(&mut lines, "Word Choices", false);
    push_word_choices(&mut lines);

    push_section(&mut lines, "Before You Return", false);
    lines.extend(
        QUALITY_CHECKLIST
            .iter()
            .take(SUMMARY_CHECKS)
            .map(|q| format!("- {}", q)),
    );

    lines.join("\n")
}

/// Every rule, for inspection.
pub fn full() -> String {
    let mut lines = Vec::new();

    push_section(&mut lines, "Voice", true);
    lines.extend(VOICE_RULES.iter().map(|rule| format!("- {}", rule)));

    push_section(&mut lines, "DO", false);
    lines.extend(DO_RULES.iter().map(|rule| format!("- {}", rule)));

    push_section(&mut lines, "DON'T", false);
    lines.extend(DONT_RULES.iter().map(|rule| format!("- {}", rule)));

    push_section(&mut lines, "Word Choices", false);
    push_word_choices(&mut lines);

    push_section(&mut lines, "Quality Checklist", false);
    lines.extend(QUALITY_CHECKLIST.iter().map(|q| format!("- {}", q)));

    lines.join("\n")
}
