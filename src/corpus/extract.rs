use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::trace;

use super::agenda::{addendum_shape, summary_shape, zero_pad, AgendaNumbering};
use super::normalize::file_name;
use super::Category;
use crate::settings::Settings;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["'][^>]*>([^<]*)"#).unwrap()
});
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// An anchor that matched one of the harvest patterns. Not yet classified.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLink {
    pub href: String,
    pub text: Option<String>,
    pub hint: Option<Category>,
    /// Byte offset of the anchor within the scanned text.
    pub offset: usize,
}

impl RawLink {
    /// A filename from a directory listing: no anchor text, no hint.
    pub fn bare(href: &str) -> Self {
        RawLink {
            href: href.to_string(),
            text: None,
            hint: None,
            offset: 0,
        }
    }
}

/// Harvest rule: every given part must match. `file` runs against the
/// decoded last path segment, `text` against the anchor text.
#[derive(Debug, Clone)]
pub struct LinkPattern {
    pub name: String,
    pub hint: Category,
    file: Option<Regex>,
    text: Option<Regex>,
}

impl LinkPattern {
    pub fn file(name: &str, hint: Category, pattern: &str) -> Self {
        LinkPattern {
            name: name.to_string(),
            hint,
            file: Some(case_insensitive(pattern)),
            text: None,
        }
    }

    pub fn text(name: &str, hint: Category, pattern: &str) -> Self {
        LinkPattern {
            name: name.to_string(),
            hint,
            file: None,
            text: Some(case_insensitive(pattern)),
        }
    }

    pub fn matches(&self, file: &str, text: &str) -> bool {
        self.file.as_ref().map_or(true, |re| re.is_match(file))
            && self.text.as_ref().map_or(true, |re| re.is_match(text))
    }
}

/// Ordered harvest rules; the first match supplies the category hint.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<LinkPattern>,
}

impl PatternSet {
    pub fn new(patterns: Vec<LinkPattern>) -> Self {
        PatternSet { patterns }
    }

    /// Session papers and reference papers, scanned over the whole page.
    pub fn page_level(settings: &Settings) -> Self {
        let mut patterns = vec![
            LinkPattern::file("session-report", Category::SessionReport, "report-part"),
            LinkPattern::file("session-summary", Category::SessionInformal, "summary-part"),
            LinkPattern::file("session-informal", Category::SessionInformal, "informal"),
        ];
        for code in &settings.reference_codes {
            patterns.push(LinkPattern::file(
                &format!("reference-{}", code),
                Category::Miscellaneous,
                &token_pattern(code),
            ));
        }
        PatternSet::new(patterns)
    }

    /// Documents inside one agenda block.
    pub fn for_agenda(settings: &Settings, numbering: &AgendaNumbering, agenda: u32) -> Self {
        let internal_id = numbering.internal_id(agenda);
        let summary = summary_shape(
            &settings.document_prefix,
            &internal_id.to_string(),
            &settings.language,
        );
        let report = addendum_shape(&settings.document_prefix, &zero_pad(internal_id));
        PatternSet::new(vec![
            LinkPattern::file("summary", Category::AgendaSummary, &summary),
            LinkPattern::file("report", Category::AgendaReport, &report),
            LinkPattern::text("background", Category::BackgroundDocument, "background"),
            LinkPattern::text("introductory", Category::IntroductoryStatement, "introductory"),
        ])
    }

    pub fn first_match(&self, file: &str, text: &str) -> Option<&LinkPattern> {
        self.patterns.iter().find(|p| p.matches(file, text))
    }
}

/// Scan `markup` for PDF anchors accepted by `patterns`, in document order.
/// Duplicates are kept.
pub fn extract_links(markup: &str, patterns: &PatternSet) -> Vec<RawLink> {
    let mut links = Vec::new();
    for caps in ANCHOR_RE.captures_iter(markup) {
        let href = caps[1].trim();
        let file = file_name(href);
        if !file.to_ascii_lowercase().ends_with(".pdf") {
            continue;
        }
        let text = clean_text(&caps[2]);
        let Some(pattern) = patterns.first_match(&file, text.as_deref().unwrap_or("")) else {
            continue;
        };
        trace!("{} matched {}", pattern.name, href);
        links.push(RawLink {
            href: href.to_string(),
            text,
            hint: Some(pattern.hint),
            offset: caps.get(0).map_or(0, |m| m.start()),
        });
    }
    links
}

/// The collapsible panel for one agenda item, located by its anchor id
/// (`<marker><agenda>`). `None` when the page has no such panel.
pub fn agenda_block<'a>(markup: &'a str, marker: &str, agenda: u32) -> Option<&'a str> {
    let pattern = format!(
        r#"(?is)<div\b[^>]*\bid\s*=\s*["']{}{}["'][^>]*>.*?</div>\s*</div>"#,
        regex::escape(marker),
        agenda
    );
    let re = Regex::new(&pattern).ok()?;
    re.find(markup).map(|m| m.as_str())
}

/// Matches `code` as a token: not preceded by a letter, and when the code
/// ends in a letter, not followed by one.
pub fn token_pattern(code: &str) -> String {
    let tail = if code.ends_with(|c: char| c.is_ascii_alphabetic()) {
        "(?:[^a-z]|$)"
    } else {
        ""
    };
    format!("(?:^|[^a-z]){}{}", regex::escape(code), tail)
}

pub(crate) fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("harvest pattern compiles")
}

fn clean_text(raw: &str) -> Option<String> {
    let text = WHITESPACE_RE.replace_all(raw.trim(), " ").to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
