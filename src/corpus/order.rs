use super::{AgendaBucket, Category, Corpus, DocumentLink};

/// Session documents in this order; anything unlisted sorts after.
const SESSION_PRIORITY: &[Category] = &[Category::SessionReport, Category::SessionInformal];

/// Position of a document within the canonical sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Session,
    Agenda,
    Background,
    Reference,
    Other,
}

pub fn tier(doc: &DocumentLink) -> Tier {
    match doc.category {
        Category::SessionReport | Category::SessionInformal => Tier::Session,
        Category::AgendaSummary | Category::AgendaReport => Tier::Agenda,
        Category::BackgroundDocument => Tier::Background,
        Category::Miscellaneous if doc.tag.is_some() => Tier::Reference,
        Category::IntroductoryStatement | Category::Miscellaneous => Tier::Other,
    }
}

/// Agenda ordering key. Equivalent to `agenda + 0.1 * addendum` for fewer
/// than ten addenda; the summary counts as addendum 0.
pub fn agenda_key(doc: &DocumentLink) -> (u32, u32) {
    (
        doc.agenda_number.unwrap_or(u32::MAX),
        doc.addendum_index.unwrap_or(0),
    )
}

fn session_rank(category: Category) -> usize {
    SESSION_PRIORITY
        .iter()
        .position(|c| *c == category)
        .unwrap_or(SESSION_PRIORITY.len())
}

/// Flatten a corpus into the single order used for the manifest, the reports
/// and the merged PDF. Ties fall back to discovery order.
pub fn canonical_order(corpus: &Corpus) -> Vec<&DocumentLink> {
    let mut session: Vec<&DocumentLink> = corpus.session_docs.iter().collect();
    session.sort_by_key(|d| (session_rank(d.category), d.seq));

    let mut ordered = session;
    for bucket in corpus.agenda_buckets.values() {
        ordered.extend(bucket_order(bucket));
    }

    let mut background: Vec<&DocumentLink> = corpus.background_docs.iter().collect();
    background.sort_by_key(|d| d.seq);
    ordered.extend(background);

    let (mut reference, mut other): (Vec<&DocumentLink>, Vec<&DocumentLink>) = corpus
        .miscellaneous_docs
        .iter()
        .chain(&corpus.introductory_docs)
        .partition(|d| tier(d) == Tier::Reference);
    reference.sort_by_key(|d| d.seq);
    other.sort_by_key(|d| d.seq);
    ordered.extend(reference);
    ordered.extend(other);

    ordered
}

/// Summaries first, in discovery order, then addenda by index.
pub fn bucket_order(bucket: &AgendaBucket) -> Vec<&DocumentLink> {
    let mut docs: Vec<&DocumentLink> = bucket
        .summary
        .iter()
        .chain(&bucket.extra_summaries)
        .chain(&bucket.reports)
        .collect();
    // Stable: summary precedes an addendum 0, equal keys keep discovery order.
    docs.sort_by_key(|d| (agenda_key(d), d.category != Category::AgendaSummary, d.seq));
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::aggregate::aggregate;

    fn doc(name: &str, category: Category, agenda: Option<u32>, add: Option<u32>) -> DocumentLink {
        DocumentLink {
            raw_href: name.to_string(),
            absolute_url: Some(format!("https://x/{name}")),
            local_path: None,
            category,
            agenda_number: agenda,
            addendum_index: add,
            tag: None,
            label: None,
            size_bytes: None,
            seq: 0,
        }
    }

    fn names(corpus: &Corpus) -> Vec<String> {
        canonical_order(corpus).iter().map(|d| d.raw_href.clone()).collect()
    }

    #[test]
    fn merge_order_scenario() {
        let corpus = aggregate(vec![
            doc("E_C20_2025_6_e.pdf", Category::AgendaSummary, Some(5), None),
            doc("E_C20_2025_05_Add_2_e.pdf", Category::AgendaReport, Some(4), Some(2)),
            doc("E_C20_2025_5_e.pdf", Category::AgendaSummary, Some(4), None),
            doc("Report-part_I_II_UN-GGIM15.pdf", Category::SessionReport, None, None),
            doc("E_C20_2025_05_Add_1_e.pdf", Category::AgendaReport, Some(4), Some(1)),
        ]);
        assert_eq!(
            names(&corpus),
            vec![
                "Report-part_I_II_UN-GGIM15.pdf",
                "E_C20_2025_5_e.pdf",
                "E_C20_2025_05_Add_1_e.pdf",
                "E_C20_2025_05_Add_2_e.pdf",
                "E_C20_2025_6_e.pdf",
            ]
        );
    }

    #[test]
    fn tiers_in_sequence() {
        let mut crp = doc("CRP_1.pdf", Category::Miscellaneous, None, None);
        crp.tag = Some("CRP".into());
        let corpus = aggregate(vec![
            doc("other.pdf", Category::Miscellaneous, None, None),
            crp,
            doc("intro.pdf", Category::IntroductoryStatement, Some(4), None),
            doc("bg.pdf", Category::BackgroundDocument, Some(4), None),
            doc("Informal.pdf", Category::SessionInformal, None, None),
            doc("Report-part.pdf", Category::SessionReport, None, None),
            doc("E_C20_2025_10_e.pdf", Category::AgendaSummary, Some(9), None),
        ]);
        assert_eq!(
            names(&corpus),
            vec![
                "Report-part.pdf",
                "Informal.pdf",
                "E_C20_2025_10_e.pdf",
                "bg.pdf",
                "CRP_1.pdf",
                "other.pdf",
                "intro.pdf",
            ]
        );
    }

    #[test]
    fn many_addenda_stay_within_their_agenda() {
        let mut links = vec![doc("s5", Category::AgendaSummary, Some(5), None)];
        for i in (1..=11).rev() {
            links.push(doc(&format!("a4-{i}"), Category::AgendaReport, Some(4), Some(i)));
        }
        let order = names(&aggregate(links));
        assert_eq!(order.first().map(String::as_str), Some("a4-1"));
        assert_eq!(order[10], "a4-11");
        assert_eq!(order.last().map(String::as_str), Some("s5"));
    }

    #[test]
    fn equal_keys_keep_discovery_order() {
        let corpus = aggregate(vec![
            doc("first", Category::AgendaReport, Some(4), Some(1)),
            doc("second", Category::AgendaReport, Some(4), Some(1)),
        ]);
        assert_eq!(names(&corpus), vec!["first", "second"]);
    }

    #[test]
    fn deterministic() {
        let corpus = aggregate(vec![
            doc("b.pdf", Category::Miscellaneous, None, None),
            doc("E_C20_2025_8_e.pdf", Category::AgendaSummary, Some(7), None),
            doc("E_C20_2025_4_e.pdf", Category::AgendaSummary, Some(3), None),
        ]);
        assert_eq!(names(&corpus), names(&corpus));
        assert_eq!(canonical_order(&corpus).len(), corpus.len());
    }
}
