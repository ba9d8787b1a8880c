//! Lexical rules shared by the extractor and the router.
//!
//! Everything here is deterministic keyword and pattern matching. The rules
//! are heuristics: they classify typical requirement phrasing well and make
//! no attempt at understanding the text.
//!
//! ## Category rules
//!
//! Checked in [`Category::ALL`] order; the first rule that matches wins, so a
//! task mentioning both "API" and "React component" is `frontend`. Text
//! matching no rule falls back to `management`.
//!
//! ```
//! use reqplan::core::Category;
//! use reqplan::pipeline::rules::classify;
//!
//! assert_eq!(classify("Build login form"), Category::Frontend);
//! assert_eq!(classify("Configure CI pipeline"), Category::Devops);
//! assert_eq!(classify("Hold kickoff meeting"), Category::Management);
//! ```

use crate::config::ExtractorConfig;
use crate::core::{Category, Priority};
use regex::Regex;
use std::sync::LazyLock;

static FRONTEND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(front[- ]?end|ui|user interface|react|vue|angular|svelte|next\.?js|components?|css|html|tailwind|pages?|forms?|buttons?|modals?|navbar|dashboard|responsive|client[- ]side|layout|screens?|widgets?)\b",
    )
    .unwrap()
});

static BACKEND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(back[- ]?end|apis?|endpoints?|servers?|rest|restful|graphql|grpc|microservices?|services?|auth|authentication|authorization|oauth|jwt|webhooks?|middleware|business logic|controllers?)\b",
    )
    .unwrap()
});

static DATABASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(databases?|db|schemas?|sql|postgres(?:ql)?|mysql|sqlite|mongo(?:db)?|redis|migrations?|tables?|quer(?:y|ies)|indexes|orm|data model|seed data)\b",
    )
    .unwrap()
});

static DEVOPS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(devops|deploy(?:s|ment|ments)?|ci|cd|pipelines?|docker|containers?|kubernetes|k8s|helm|terraform|infrastructure|monitoring|alerting|hosting|aws|gcp|azure|cloud|nginx|load balanc\w*)\b",
    )
    .unwrap()
});

static UX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(ux|user experience|designs?|wireframes?|mockups?|prototypes?|user research|usability|accessibility|a11y|personas?|user flows?|user journeys?|figma|style guide|branding)\b",
    )
    .unwrap()
});

static HIGH_PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(critical|urgent|must|asap|blocker|high[- ]priority|top priority|p0)\b").unwrap()
});

static LOW_PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(optional|nice[- ]to[- ]have|low[- ]priority|if time permits|stretch goal)\b")
        .unwrap()
});

/// A number followed by a duration unit: `3h`, `2 days`, `1.5 weeks`.
static EFFORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(hours?|hrs?|h|days?|d|weeks?|wks?|w)\b").unwrap()
});

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(must|should|shall|needs? to|required|requires?|has to|have to)\b").unwrap()
});

/// `depends on X`, `after X`, ... up to the next clause break.
static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:depends on|dependent on|after|requires|blocked by)\s+([^,;()\n]+)").unwrap()
});

static PARENTHETICAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*|__|`").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Category rules in the order they are checked.
fn category_rules() -> [(Category, &'static Regex); 5] {
    [
        (Category::Frontend, &*FRONTEND_RE),
        (Category::Backend, &*BACKEND_RE),
        (Category::Database, &*DATABASE_RE),
        (Category::Devops, &*DEVOPS_RE),
        (Category::Ux, &*UX_RE),
    ]
}

/// Classify text by the first matching category rule.
pub fn classify(text: &str) -> Category {
    category_rules()
        .into_iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(category, _)| category)
        .unwrap_or(Category::Management)
}

/// Infer priority from urgency markers. High markers win over low ones.
pub fn priority(text: &str) -> Priority {
    if HIGH_PRIORITY_RE.is_match(text) {
        Priority::High
    } else if LOW_PRIORITY_RE.is_match(text) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// Effort in hours named by the first duration token, if any.
pub fn effort_hours(text: &str, config: &ExtractorConfig) -> Option<f64> {
    let caps = EFFORT_RE.captures(text)?;
    let amount: f64 = caps[1].parse().ok()?;
    let unit = caps[2].to_lowercase();
    let hours = match unit.chars().next()? {
        'h' => amount,
        'd' => amount * config.hours_per_day,
        _ => amount * config.hours_per_week,
    };
    Some(hours)
}

/// Whether a statement uses requirement language (must, should, shall, ...).
pub fn is_requirement(text: &str) -> bool {
    REQUIREMENT_RE.is_match(text)
}

/// Titles referenced through dependency markers, in order of appearance.
pub fn dependency_references(text: &str) -> Vec<String> {
    DEPENDENCY_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let reference = caps[1]
                .trim()
                .trim_end_matches(['.', ':', '!', '?'])
                .trim();
            let reference = strip_emphasis(reference);
            (!reference.is_empty()).then_some(reference)
        })
        .collect()
}

/// Remove emphasis markers and backticks, collapsing whitespace.
pub fn strip_emphasis(text: &str) -> String {
    let plain = EMPHASIS_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(plain.trim(), " ").into_owned()
}

/// Task title: the text without parenthetical remarks or emphasis.
///
/// Falls back to the emphasis-stripped text when nothing else remains.
pub fn clean_title(text: &str) -> String {
    let without_remarks = PARENTHETICAL_RE.replace_all(text, " ");
    let title = strip_emphasis(&without_remarks);
    let title = title.trim_end_matches([':', '-', '.', ' ']).trim().to_string();
    if title.is_empty() {
        strip_emphasis(text)
    } else {
        title
    }
}
