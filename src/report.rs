use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::corpus::order::{self, Tier};
use crate::corpus::{Category, Corpus, DocumentLink};
use crate::error::CollectError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Inventory,
    Guide,
}

impl FromStr for OutputFormat {
    type Err = CollectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "inventory" => Ok(OutputFormat::Inventory),
            "guide" | "notebooklm" => Ok(OutputFormat::Guide),
            _ => Err(CollectError::UnknownFormat(s.to_string())),
        }
    }
}

pub fn size_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

// ── Link manifest ──

#[derive(PartialEq)]
enum Group {
    Session,
    Agenda(u32),
    Background,
    Reference,
    Other,
}

fn group_of(doc: &DocumentLink) -> Group {
    match order::tier(doc) {
        Tier::Session => Group::Session,
        Tier::Agenda => Group::Agenda(doc.agenda_number.unwrap_or_default()),
        Tier::Background => Group::Background,
        Tier::Reference => Group::Reference,
        Tier::Other => Group::Other,
    }
}

fn group_header(group: &Group) -> String {
    match group {
        Group::Session => "# Session-level documents".to_string(),
        Group::Agenda(n) => format!("# Agenda {}", n),
        Group::Background => "# Background documents".to_string(),
        Group::Reference => "# Reference papers".to_string(),
        Group::Other => "# Other documents".to_string(),
    }
}

/// One URL per line, grouped under comment headers, in canonical order.
pub fn render_manifest(corpus: &Corpus, source: &str, generated: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("# Session document collection\n");
    out.push_str(&format!("# Source: {}\n", source));
    out.push_str(&format!("# Generated: {}\n", generated.format("%Y-%m-%d %H:%M:%S")));

    let mut current: Option<Group> = None;
    for doc in order::canonical_order(corpus) {
        let group = group_of(doc);
        if current.as_ref() != Some(&group) {
            out.push('\n');
            out.push_str(&group_header(&group));
            out.push('\n');
            current = Some(group);
        }
        match (doc.category, doc.agenda_number) {
            (Category::AgendaSummary | Category::AgendaReport, _) => {
                out.push_str(&format!("# {}\n", doc.category));
            }
            (Category::BackgroundDocument | Category::IntroductoryStatement, Some(n)) => {
                out.push_str(&match &doc.label {
                    Some(label) => format!("# {} (Agenda {}): {}\n", doc.category, n, label),
                    None => format!("# {} (Agenda {})\n", doc.category, n),
                });
            }
            _ => {}
        }
        out.push_str(&format!("{}\n", doc.location()));
    }
    out
}

// ── Structured inventory ──

#[derive(Debug, Serialize)]
pub struct Inventory {
    pub generated_at: String,
    pub total_files: usize,
    pub total_size_mb: f64,
    pub session_documents: Vec<SizedEntry>,
    pub agenda_items: BTreeMap<u32, AgendaEntry>,
    pub background_documents: Vec<String>,
    pub reference_documents: Vec<String>,
    pub other_documents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SizedEntry {
    pub name: String,
    pub size_kb: f64,
}

#[derive(Debug, Serialize)]
pub struct AgendaEntry {
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_summaries: Vec<String>,
    pub reports: Vec<String>,
}

pub fn build_inventory(corpus: &Corpus, generated: DateTime<Local>) -> Inventory {
    let ordered = order::canonical_order(corpus);
    let names_in = |tier: Tier| -> Vec<String> {
        ordered
            .iter()
            .filter(|d| order::tier(d) == tier)
            .map(|d| d.file_name())
            .collect()
    };

    Inventory {
        generated_at: generated.to_rfc3339(),
        total_files: corpus.len(),
        total_size_mb: size_mb(corpus.total_size_bytes()),
        session_documents: ordered
            .iter()
            .filter(|d| d.category.is_session())
            .map(|d| SizedEntry {
                name: d.file_name(),
                size_kb: d.size_bytes.unwrap_or(0) as f64 / 1024.0,
            })
            .collect(),
        agenda_items: corpus
            .agenda_buckets
            .iter()
            .map(|(n, bucket)| {
                let entry = AgendaEntry {
                    summary: bucket.summary.as_ref().map(DocumentLink::file_name),
                    additional_summaries: bucket.extra_summaries.iter().map(DocumentLink::file_name).collect(),
                    reports: order::bucket_order(bucket)
                        .into_iter()
                        .filter(|d| d.category == Category::AgendaReport)
                        .map(DocumentLink::file_name)
                        .collect(),
                };
                (*n, entry)
            })
            .collect(),
        background_documents: names_in(Tier::Background),
        reference_documents: names_in(Tier::Reference),
        other_documents: names_in(Tier::Other),
    }
}

pub fn render_inventory(corpus: &Corpus, generated: DateTime<Local>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&build_inventory(corpus, generated))?)
}

// ── Plain-text summary ──

pub fn render_summary(corpus: &Corpus) -> String {
    let mut out = String::new();
    out.push_str("Session Documents Analysis\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    out.push_str(&format!("Session-level documents: {}\n", corpus.session_docs.len()));
    for doc in order::canonical_order(corpus).iter().filter(|d| d.category.is_session()) {
        out.push_str(&format!("  - {}\n", doc.file_name()));
    }
    out.push('\n');
    out.push_str(&format!("Agenda items: {}\n", corpus.agenda_buckets.len()));
    for (n, bucket) in &corpus.agenda_buckets {
        out.push_str(&format!("  Agenda {}:\n", n));
        out.push_str(&format!("    Summary: {}\n", if bucket.summary.is_some() { "Yes" } else { "No" }));
        out.push_str(&format!("    Reports: {}\n", bucket.reports.len()));
    }
    out.push('\n');
    out.push_str(&format!("Background documents: {}\n", corpus.background_docs.len()));
    out.push_str(&format!("Reference papers: {}\n", corpus.reference_docs().count()));
    out.push('\n');
    out.push_str(&format!("Total files: {}\n", corpus.len()));
    out.push_str(&format!("Total size: {:.1}MB\n", size_mb(corpus.total_size_bytes())));
    out
}

// ── Analysis guide ──

const ANALYSIS_QUESTIONS: &[(&str, &[&str])] = &[
    (
        "Cross-cutting Analysis",
        &[
            "Summarise the key points of each agenda item's summary and reports in five lines.",
            "For each agenda item, contrast the summary with its reports and note how they complement each other.",
            "Extract the key terms, definitions and actors (institutions) mentioned.",
            "Compare cross-cutting issues: shared challenges, data standards, implementation status, regional differences.",
        ],
    ),
    (
        "Specific Focus Areas",
        &[
            "Collect references to emerging technologies (AI, cloud services) in geospatial information management.",
            "Analyse how international cooperation and the regional committees divide their roles.",
            "Gather the recommendations on data standardisation and the sharing of good practice.",
        ],
    ),
];

const SUGGESTED_OUTPUTS: &[(&str, &str)] = &[
    ("out/executive_summary.md", "overall summary"),
    ("out/agenda_analysis/", "per-agenda detailed analysis"),
    ("out/cross_cutting_themes.md", "cross-cutting themes"),
    ("out/recommendations.md", "recommendations and next actions"),
];

pub fn render_guide(corpus: &Corpus, docs_dir: &Path, generated: DateTime<Local>) -> String {
    let ordered = order::canonical_order(corpus);
    let mut out = String::new();
    out.push_str("# Session Documents - Analysis Guide\n");
    out.push('\n');
    out.push_str(&format!("Generated: {}\n", generated.format("%Y-%m-%d %H:%M:%S")));
    out.push('\n');
    out.push_str("## 1. Upload Strategy\n");
    out.push('\n');
    out.push_str(&format!(
        "Upload all {} files from `{}`:\n",
        corpus.len(),
        docs_dir.display()
    ));
    out.push('\n');

    let session: Vec<_> = ordered.iter().filter(|d| d.category.is_session()).collect();
    out.push_str(&format!("### Session Documents ({} files)\n", session.len()));
    for doc in session {
        out.push_str(&format!("- {}\n", doc.file_name()));
    }
    out.push('\n');

    out.push_str(&format!("### Agenda Items ({} items)\n", corpus.agenda_buckets.len()));
    for (n, bucket) in &corpus.agenda_buckets {
        out.push_str(&format!("#### Agenda {}\n", n));
        for doc in order::bucket_order(bucket) {
            let kind = match doc.category {
                Category::AgendaSummary => "Summary",
                _ => "Report",
            };
            out.push_str(&format!("- {}: {}\n", kind, doc.file_name()));
        }
        out.push('\n');
    }

    for (title, tier) in [("Background Documents", Tier::Background), ("Reference Papers", Tier::Reference)] {
        let docs: Vec<_> = ordered.iter().filter(|d| order::tier(d) == tier).collect();
        if docs.is_empty() {
            continue;
        }
        out.push_str(&format!("### {} ({} files)\n", title, docs.len()));
        for doc in docs {
            out.push_str(&format!("- {}\n", doc.file_name()));
        }
        out.push('\n');
    }

    out.push_str("## 2. Analysis Questions\n");
    out.push('\n');
    for (heading, questions) in ANALYSIS_QUESTIONS {
        out.push_str(&format!("### {}\n", heading));
        for q in *questions {
            out.push_str(&format!("- {}\n", q));
        }
        out.push('\n');
    }

    out.push_str("## 3. Output Organization\n");
    out.push('\n');
    for (path, what) in SUGGESTED_OUTPUTS {
        out.push_str(&format!("- `{}` - {}\n", path, what));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::from_files;
    use crate::scan::LocalFile;
    use crate::settings::Settings;
    use chrono::TimeZone;

    fn corpus() -> Corpus {
        let files = vec![
            LocalFile::new("docs/raw/E_C20_2025_05_Add_1_e.pdf", 1024 * 1024),
            LocalFile::new("docs/raw/E_C20_2025_5_e.pdf", 512 * 1024),
            LocalFile::new("docs/raw/E_C20_2025_6_e.pdf", 512 * 1024),
            LocalFile::new("docs/raw/E_C20_2025_CRP_2.pdf", 1024),
            LocalFile::new("docs/raw/Report-part_I_II_UN-GGIM15.pdf", 2048),
            LocalFile::new("docs/raw/Background_IGIF.pdf", 1024),
            LocalFile::new("docs/raw/programme.pdf", 1024),
        ];
        from_files(&files, &Settings::default())
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 8, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn formats_parse() {
        assert_eq!("Inventory".parse::<OutputFormat>().unwrap(), OutputFormat::Inventory);
        assert_eq!("notebooklm".parse::<OutputFormat>().unwrap(), OutputFormat::Guide);
        assert!(matches!("pdf".parse::<OutputFormat>(), Err(CollectError::UnknownFormat(_))));
    }

    #[test]
    fn manifest_groups_in_canonical_order() {
        let m = render_manifest(&corpus(), "docs/raw", at());
        assert!(m.contains("# Generated: 2025-08-01 09:30:00"));
        let session = m.find("# Session-level documents").unwrap();
        let four = m.find("# Agenda 4").unwrap();
        let five = m.find("# Agenda 5").unwrap();
        let bg = m.find("# Background documents").unwrap();
        let refs = m.find("# Reference papers").unwrap();
        let other = m.find("# Other documents").unwrap();
        assert!(session < four && four < five && five < bg && bg < refs && refs < other);
        let summary = m.find("docs/raw/E_C20_2025_5_e.pdf").unwrap();
        let add = m.find("docs/raw/E_C20_2025_05_Add_1_e.pdf").unwrap();
        assert!(summary < add);
    }

    #[test]
    fn inventory_shape() {
        let json = render_inventory(&corpus(), at()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["total_files"], 7);
        assert_eq!(v["session_documents"][0]["name"], "Report-part_I_II_UN-GGIM15.pdf");
        assert_eq!(v["session_documents"][0]["size_kb"], 2.0);
        assert_eq!(v["agenda_items"]["4"]["summary"], "E_C20_2025_5_e.pdf");
        assert_eq!(v["agenda_items"]["4"]["reports"][0], "E_C20_2025_05_Add_1_e.pdf");
        assert!(v["agenda_items"]["5"]["reports"].as_array().unwrap().is_empty());
        assert_eq!(v["reference_documents"][0], "E_C20_2025_CRP_2.pdf");
        assert_eq!(v["other_documents"][0], "programme.pdf");
        let mb = v["total_size_mb"].as_f64().unwrap();
        assert!((mb - 2.005859375).abs() < 1e-9);
    }

    #[test]
    fn summary_lists_agenda_status() {
        let s = render_summary(&corpus());
        assert!(s.contains("Session-level documents: 1"));
        assert!(s.contains("  Agenda 4:\n    Summary: Yes\n    Reports: 1"));
        assert!(s.contains("Total files: 7"));
    }

    #[test]
    fn guide_lists_documents_and_questions() {
        let g = render_guide(&corpus(), Path::new("docs/raw"), at());
        assert!(g.contains("Upload all 7 files from `docs/raw`"));
        assert!(g.contains("#### Agenda 4\n- Summary: E_C20_2025_5_e.pdf\n- Report: E_C20_2025_05_Add_1_e.pdf"));
        assert!(g.contains("### Background Documents (1 files)"));
        assert!(g.contains("## 2. Analysis Questions"));
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/urls.txt");
        write_file(&path, "x\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "x\n");
    }
}
