use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::corpus::agenda::{AgendaNumbering, INTERNAL_ID_OFFSET};
use crate::corpus::normalize;
use crate::error::CollectError;

const DEFAULT_CONFIG_FILE: &str = "session_docs";
const ENV_PREFIX: &str = "SESSION_DOCS";

pub const DEFAULT_BASE_URL: &str =
    "https://ggim.un.org/meetings/GGIM-committee/15th-Session/documents/";

/// Run configuration. Layered: defaults, then `session_docs.toml` (or `--config`),
/// then `SESSION_DOCS_*` environment variables; CLI flags are applied on top by `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub agenda_first: u32,
    pub agenda_last: u32,
    pub id_offset: u32,
    pub document_prefix: String,
    pub language: String,
    pub block_marker: String,
    pub reference_codes: Vec<String>,
    pub docs_dir: PathBuf,
    pub out_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub merged_pdf: PathBuf,
    pub merge_tool: String,
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            agenda_first: 3,
            agenda_last: 17,
            id_offset: INTERNAL_ID_OFFSET,
            document_prefix: "E_C20_2025".to_string(),
            language: "e".to_string(),
            block_marker: "agendaTab".to_string(),
            reference_codes: vec!["CRP".into(), "INF".into(), "L.".into()],
            docs_dir: PathBuf::from("docs/raw"),
            out_dir: PathBuf::from("out"),
            manifest_path: PathBuf::from("data/urls.txt"),
            merged_pdf: PathBuf::from("ggim15.pdf"),
            merge_tool: "pdfunite".to_string(),
            format: "summary".to_string(),
        }
    }
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let d = Settings::default();
        let mut builder = Config::builder()
            .set_default("base_url", d.base_url)?
            .set_default("agenda_first", i64::from(d.agenda_first))?
            .set_default("agenda_last", i64::from(d.agenda_last))?
            .set_default("id_offset", i64::from(d.id_offset))?
            .set_default("document_prefix", d.document_prefix)?
            .set_default("language", d.language)?
            .set_default("block_marker", d.block_marker)?
            .set_default("reference_codes", d.reference_codes)?
            .set_default("docs_dir", path_str(&d.docs_dir))?
            .set_default("out_dir", path_str(&d.out_dir))?
            .set_default("manifest_path", path_str(&d.manifest_path))?
            .set_default("merged_pdf", path_str(&d.merged_pdf))?
            .set_default("merge_tool", d.merge_tool)?
            .set_default("format", d.format)?;

        builder = match config_path {
            Some(path) => builder.add_source(File::from(path.to_path_buf()).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("reference_codes"),
            )
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        debug!(?settings, "Configuration loaded");
        Ok(settings)
    }

    /// Checks that hold for every command. The base URL is checked separately,
    /// only by commands that resolve links against it.
    pub fn validate(&self) -> Result<()> {
        if self.agenda_first > self.agenda_last {
            bail!(
                "agenda range is empty: first {} > last {}",
                self.agenda_first,
                self.agenda_last
            );
        }
        if self.document_prefix.trim().is_empty() {
            bail!("document_prefix must not be empty");
        }
        Ok(())
    }

    pub fn agenda_range(&self) -> RangeInclusive<u32> {
        self.agenda_first..=self.agenda_last
    }

    pub fn numbering(&self) -> AgendaNumbering {
        AgendaNumbering::new(self.id_offset)
    }

    pub fn base(&self) -> Result<Url, CollectError> {
        normalize::parse_base(&self.base_url)
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.out_dir.join("inventory.json")
    }

    pub fn guide_path(&self) -> PathBuf {
        self.out_dir.join("analysis_guide.md")
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
