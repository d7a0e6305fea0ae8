use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the operator. Each one maps to its own exit status.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("no documents found in {0}")]
    EmptyCorpus(String),
    #[error("base URL {url:?} cannot anchor relative links: {reason}")]
    MalformedBase { url: String, reason: String },
    #[error("unknown output format: {0} (expected summary, inventory or guide)")]
    UnknownFormat(String),
    #[error("merge tool {tool} failed: {diagnostic}")]
    MergeTool { tool: String, diagnostic: String },
    #[error("documents directory {} not found", .0.display())]
    MissingDirectory(PathBuf),
}

impl CollectError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::EmptyCorpus(_) => 0,
            Self::Fetch { .. } => 3,
            Self::MalformedBase { .. } => 4,
            Self::UnknownFormat(_) => 5,
            Self::MergeTool { .. } => 6,
            Self::MissingDirectory(_) => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            CollectError::Fetch { url: "u".into(), reason: "404".into() },
            CollectError::MalformedBase { url: "u".into(), reason: "relative".into() },
            CollectError::UnknownFormat("pdf".into()),
            CollectError::MergeTool { tool: "pdfunite".into(), diagnostic: "boom".into() },
            CollectError::MissingDirectory(PathBuf::from("docs/raw")),
        ];
        let mut codes: Vec<u8> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn empty_corpus_is_not_a_failure() {
        assert_eq!(CollectError::EmptyCorpus("docs/raw".into()).exit_code(), 0);
    }

    #[test]
    fn merge_diagnostic_passed_through() {
        let e = CollectError::MergeTool {
            tool: "pdfunite".into(),
            diagnostic: "Syntax Error: Couldn't open file 'x.pdf'".into(),
        };
        assert!(e.to_string().ends_with("Syntax Error: Couldn't open file 'x.pdf'"));
    }
}
