use std::collections::HashSet;

use tracing::warn;

use super::{Category, Corpus, DocumentLink};

/// Group classified links into a corpus. Within each group the first
/// occurrence of a dedup key wins and keeps its discovery position.
pub fn aggregate(links: Vec<DocumentLink>) -> Corpus {
    let mut corpus = Corpus::default();
    let mut seen: HashSet<(Category, Option<u32>, String)> = HashSet::new();

    for (seq, mut link) in links.into_iter().enumerate() {
        let bucket_key = link.category.is_agenda_scoped().then_some(link.agenda_number).flatten();
        if !seen.insert((link.category, bucket_key, link.dedup_key().to_string())) {
            attribute_agenda(&mut corpus, &link);
            continue;
        }
        link.seq = seq;

        match link.category {
            Category::SessionReport | Category::SessionInformal => corpus.session_docs.push(link),
            Category::AgendaSummary | Category::AgendaReport => {
                let Some(agenda) = link.agenda_number else {
                    corpus.miscellaneous_docs.push(link);
                    continue;
                };
                let bucket = corpus.agenda_buckets.entry(agenda).or_default();
                if link.category == Category::AgendaReport {
                    bucket.reports.push(link);
                } else if bucket.summary.is_none() {
                    bucket.summary = Some(link);
                } else {
                    warn!("Agenda {} has more than one summary: {}", agenda, link.location());
                    bucket.extra_summaries.push(link);
                }
            }
            Category::BackgroundDocument => corpus.background_docs.push(link),
            Category::IntroductoryStatement => corpus.introductory_docs.push(link),
            Category::Miscellaneous => corpus.miscellaneous_docs.push(link),
        }
    }

    corpus
}

/// A repeat of an unattributed background or introductory document that was
/// found inside an agenda panel lends the kept entry its agenda number.
fn attribute_agenda(corpus: &mut Corpus, repeat: &DocumentLink) {
    let Some(agenda) = repeat.agenda_number else {
        return;
    };
    let group = match repeat.category {
        Category::BackgroundDocument => &mut corpus.background_docs,
        Category::IntroductoryStatement => &mut corpus.introductory_docs,
        _ => return,
    };
    if let Some(kept) = group
        .iter_mut()
        .find(|d| d.agenda_number.is_none() && d.dedup_key() == repeat.dedup_key())
    {
        kept.agenda_number = Some(agenda);
    }
}
