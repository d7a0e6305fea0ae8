use regex::Regex;

use super::agenda::{addendum_shape, summary_shape, AgendaNumbering, ANY_ID};
use super::extract::{case_insensitive, token_pattern, RawLink};
use super::normalize::file_name;
use super::{Category, DocumentLink};
use crate::scan::LocalFile;
use crate::settings::Settings;

/// Classification rules, tried in this order. The first one that matches wins;
/// anything left over is untagged `Miscellaneous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Session,
    Summary,
    Addendum,
    Background,
    Introductory,
    Reference,
}

pub const RULE_ORDER: [Rule; 6] = [
    Rule::Session,
    Rule::Summary,
    Rule::Addendum,
    Rule::Background,
    Rule::Introductory,
    Rule::Reference,
];

/// Session-level filename fragments, in priority order.
const SESSION_PATTERNS: &[(&str, Category)] = &[
    ("report-part", Category::SessionReport),
    ("summary-part", Category::SessionInformal),
    ("informal", Category::SessionInformal),
];

struct Outcome {
    category: Category,
    agenda_number: Option<u32>,
    addendum_index: Option<u32>,
    tag: Option<String>,
}

impl Outcome {
    fn plain(category: Category) -> Self {
        Outcome {
            category,
            agenda_number: None,
            addendum_index: None,
            tag: None,
        }
    }
}

pub struct Classifier {
    numbering: AgendaNumbering,
    session: Vec<(Regex, Category)>,
    summary: Regex,
    addendum: Regex,
    references: Vec<(String, Regex)>,
}

impl Classifier {
    pub fn new(settings: &Settings) -> Self {
        Classifier {
            numbering: settings.numbering(),
            session: SESSION_PATTERNS
                .iter()
                .map(|(p, c)| (case_insensitive(p), *c))
                .collect(),
            summary: case_insensitive(&summary_shape(&settings.document_prefix, ANY_ID, &settings.language)),
            addendum: case_insensitive(&addendum_shape(&settings.document_prefix, ANY_ID)),
            references: settings
                .reference_codes
                .iter()
                .map(|code| (code.clone(), case_insensitive(&token_pattern(code))))
                .collect(),
        }
    }

    /// Classify a harvested link. `scope` is the agenda block it came from, if any.
    pub fn classify(&self, raw: &RawLink, scope: Option<u32>) -> DocumentLink {
        let file = file_name(&raw.href);
        let outcome = self.decide(&file, raw, scope);
        DocumentLink {
            raw_href: raw.href.clone(),
            absolute_url: None,
            local_path: None,
            category: outcome.category,
            agenda_number: outcome.agenda_number,
            addendum_index: outcome.addendum_index,
            tag: outcome.tag,
            label: raw.text.clone(),
            size_bytes: None,
            seq: 0,
        }
    }

    /// Filename-only mode for the documents directory.
    pub fn classify_file(&self, file: &LocalFile) -> DocumentLink {
        let name = file.name();
        let mut doc = self.classify(&RawLink::bare(&name), None);
        doc.raw_href = file.path.display().to_string();
        doc.local_path = Some(file.path.clone());
        doc.size_bytes = Some(file.size_bytes);
        doc
    }

    fn decide(&self, file: &str, raw: &RawLink, scope: Option<u32>) -> Outcome {
        RULE_ORDER
            .iter()
            .find_map(|rule| self.apply(*rule, file, raw, scope))
            .unwrap_or_else(|| Outcome::plain(Category::Miscellaneous))
    }

    fn apply(&self, rule: Rule, file: &str, raw: &RawLink, scope: Option<u32>) -> Option<Outcome> {
        let text = raw.text.as_deref().unwrap_or("");
        match rule {
            Rule::Session => self
                .session
                .iter()
                .find(|(re, _)| re.is_match(file))
                .map(|(_, category)| Outcome::plain(*category)),
            Rule::Summary => {
                let caps = self.summary.captures(file)?;
                let agenda = self.agenda_from(&caps[1])?;
                Some(Outcome {
                    agenda_number: Some(agenda),
                    ..Outcome::plain(Category::AgendaSummary)
                })
            }
            Rule::Addendum => {
                let caps = self.addendum.captures(file)?;
                let agenda = self.agenda_from(&caps[1])?;
                let index = caps[2].parse().ok()?;
                Some(Outcome {
                    agenda_number: Some(agenda),
                    addendum_index: Some(index),
                    ..Outcome::plain(Category::AgendaReport)
                })
            }
            Rule::Background => {
                let hit = raw.hint == Some(Category::BackgroundDocument)
                    || contains_ci(text, "background")
                    || contains_ci(file, "background");
                hit.then(|| Outcome {
                    agenda_number: scope,
                    ..Outcome::plain(Category::BackgroundDocument)
                })
            }
            Rule::Introductory => {
                let hit = raw.hint == Some(Category::IntroductoryStatement)
                    || contains_ci(text, "introductory");
                hit.then(|| Outcome {
                    agenda_number: scope,
                    ..Outcome::plain(Category::IntroductoryStatement)
                })
            }
            Rule::Reference => self
                .references
                .iter()
                .find(|(_, re)| re.is_match(file))
                .map(|(code, _)| Outcome {
                    tag: Some(code.clone()),
                    ..Outcome::plain(Category::Miscellaneous)
                }),
        }
    }

    fn agenda_from(&self, digits: &str) -> Option<u32> {
        let internal_id: u32 = digits.parse().ok()?;
        self.numbering.agenda_number_from_internal_id(internal_id)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
