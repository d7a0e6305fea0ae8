pub mod agenda;
pub mod aggregate;
pub mod classify;
pub mod extract;
pub mod normalize;
pub mod order;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, trace};
use url::Url;

use crate::scan::LocalFile;
use crate::settings::Settings;
use classify::Classifier;
use extract::{PatternSet, RawLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    SessionReport,
    SessionInformal,
    AgendaSummary,
    AgendaReport,
    BackgroundDocument,
    IntroductoryStatement,
    Miscellaneous,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::SessionReport => "Session Report",
            Category::SessionInformal => "Informal Paper",
            Category::AgendaSummary => "Summary (English)",
            Category::AgendaReport => "Report",
            Category::BackgroundDocument => "Background Document",
            Category::IntroductoryStatement => "Introductory Statement",
            Category::Miscellaneous => "Miscellaneous",
        }
    }

    pub fn is_session(self) -> bool {
        matches!(self, Category::SessionReport | Category::SessionInformal)
    }

    pub fn is_agenda_scoped(self) -> bool {
        matches!(self, Category::AgendaSummary | Category::AgendaReport)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One discovered document, from the listing page or the documents directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLink {
    pub raw_href: String,
    pub absolute_url: Option<String>,
    pub local_path: Option<PathBuf>,
    pub category: Category,
    pub agenda_number: Option<u32>,
    pub addendum_index: Option<u32>,
    /// Reference code that matched, for tagged miscellaneous documents.
    pub tag: Option<String>,
    /// Anchor text, when discovered from markup.
    pub label: Option<String>,
    pub size_bytes: Option<u64>,
    /// Position in discovery order, assigned by the aggregator.
    pub seq: usize,
}

impl DocumentLink {
    pub fn dedup_key(&self) -> &str {
        match (&self.absolute_url, &self.local_path) {
            (Some(url), _) => url,
            (None, Some(path)) => path.to_str().unwrap_or(&self.raw_href),
            (None, None) => &self.raw_href,
        }
    }

    pub fn file_name(&self) -> String {
        match &self.local_path {
            Some(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| normalize::file_name(&self.raw_href)),
            None => normalize::file_name(&self.raw_href),
        }
    }

    /// URL when discovered remotely, path otherwise.
    pub fn location(&self) -> String {
        match (&self.absolute_url, &self.local_path) {
            (Some(url), _) => url.clone(),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => self.raw_href.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgendaBucket {
    pub summary: Option<DocumentLink>,
    /// Further summaries for the same item under other names or URLs.
    pub extra_summaries: Vec<DocumentLink>,
    pub reports: Vec<DocumentLink>,
}

impl AgendaBucket {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.extra_summaries.is_empty() && self.reports.is_empty()
    }

    pub fn len(&self) -> usize {
        usize::from(self.summary.is_some()) + self.extra_summaries.len() + self.reports.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub session_docs: Vec<DocumentLink>,
    pub agenda_buckets: BTreeMap<u32, AgendaBucket>,
    pub background_docs: Vec<DocumentLink>,
    pub introductory_docs: Vec<DocumentLink>,
    pub miscellaneous_docs: Vec<DocumentLink>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.session_docs.len()
            + self.agenda_buckets.values().map(AgendaBucket::len).sum::<usize>()
            + self.background_docs.len()
            + self.introductory_docs.len()
            + self.miscellaneous_docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of known file sizes; remote-only entries count as zero.
    pub fn total_size_bytes(&self) -> u64 {
        order::canonical_order(self)
            .iter()
            .filter_map(|d| d.size_bytes)
            .sum()
    }

    pub fn reference_docs(&self) -> impl Iterator<Item = &DocumentLink> {
        self.miscellaneous_docs.iter().filter(|d| d.tag.is_some())
    }
}

/// Listing page → corpus. One unscoped pass for session and reference papers,
/// then one pass per agenda block in the configured range.
pub fn discover(markup: &str, settings: &Settings, base: &Url) -> Corpus {
    let numbering = settings.numbering();
    let classifier = Classifier::new(settings);
    let mut classified = Vec::new();

    let page_patterns = PatternSet::page_level(settings);
    let page_links = extract::extract_links(markup, &page_patterns);
    debug!("Page-level links: {}", page_links.len());
    classified.extend(classify_all(&classifier, page_links, None, base));

    for agenda in settings.agenda_range() {
        let Some(block) = extract::agenda_block(markup, &settings.block_marker, agenda) else {
            debug!("No block for agenda {}", agenda);
            continue;
        };
        let patterns = PatternSet::for_agenda(settings, &numbering, agenda);
        let links = extract::extract_links(block, &patterns);
        debug!("Agenda {}: {} links", agenda, links.len());
        classified.extend(classify_all(&classifier, links, Some(agenda), base));
    }

    let corpus = aggregate::aggregate(classified);
    info!("Discovered {} documents", corpus.len());
    corpus
}

/// Directory listing → corpus, classifying by filename alone.
pub fn from_files(files: &[LocalFile], settings: &Settings) -> Corpus {
    let classifier = Classifier::new(settings);
    let classified = files
        .iter()
        .map(|file| classifier.classify_file(file))
        .collect();
    aggregate::aggregate(classified)
}

fn classify_all(
    classifier: &Classifier,
    links: Vec<RawLink>,
    scope: Option<u32>,
    base: &Url,
) -> Vec<DocumentLink> {
    links
        .iter()
        .map(|raw| {
            let mut doc = classifier.classify(raw, scope);
            doc.absolute_url = Some(normalize::normalize_url(&raw.href, base));
            trace!(offset = raw.offset, category = ?doc.category, "{}", raw.href);
            doc
        })
        .collect()
}
