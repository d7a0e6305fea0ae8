/// Offset between the agenda number shown on the listing page and the
/// document number used in filenames: agenda item 4 is published as
/// `E_C20_2025_5_e.pdf`. Observed on the 15th-session documents page.
pub const INTERNAL_ID_OFFSET: u32 = 1;

/// Maps agenda numbers to the internal document numbering and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgendaNumbering {
    offset: u32,
}

impl Default for AgendaNumbering {
    fn default() -> Self {
        Self::new(INTERNAL_ID_OFFSET)
    }
}

impl AgendaNumbering {
    pub fn new(offset: u32) -> Self {
        AgendaNumbering { offset }
    }

    pub fn internal_id(&self, agenda_number: u32) -> u32 {
        agenda_number + self.offset
    }

    /// `None` when the id is below the offset and cannot belong to an agenda item.
    pub fn agenda_number_from_internal_id(&self, internal_id: u32) -> Option<u32> {
        internal_id.checked_sub(self.offset)
    }
}

/// Regex fragment for an internal id of any value.
pub const ANY_ID: &str = r"\d+";

/// Filename shape of an agenda summary, e.g. `E_C20_2025_5_e.pdf`. The id is
/// captured as group 1; `id` is a regex fragment.
pub fn summary_shape(prefix: &str, id: &str, language: &str) -> String {
    format!(
        r"^{}_({})_{}\.[a-z0-9]+$",
        regex::escape(prefix),
        id,
        regex::escape(language)
    )
}

/// Filename shape of an addendum, e.g. `E_C20_2025_05_Add_2_e.pdf` or
/// `E_C20_2025_05_Add.1.pdf`. Id in group 1, addendum index in group 2;
/// anything may follow the index.
pub fn addendum_shape(prefix: &str, id: &str) -> String {
    format!(
        r"^{}_({})_Add[._](\d+)(?:[._][^/]*)?\.[a-z0-9]+$",
        regex::escape(prefix),
        id
    )
}

/// Two digits below ten, as-is otherwise.
pub fn zero_pad(n: u32) -> String {
    if n < 10 {
        format!("{:02}", n)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn pads_single_digits_only() {
        assert_eq!(zero_pad(7), "07");
        assert_eq!(zero_pad(0), "00");
        assert_eq!(zero_pad(14), "14");
        assert_eq!(zero_pad(123), "123");
    }

    #[test]
    fn round_trip_over_range() {
        let ids = AgendaNumbering::default();
        for n in 3..=17 {
            assert_eq!(ids.agenda_number_from_internal_id(ids.internal_id(n)), Some(n));
        }
    }

    #[test]
    fn offset_is_configurable() {
        let ids = AgendaNumbering::new(2);
        assert_eq!(ids.internal_id(4), 6);
        assert_eq!(ids.agenda_number_from_internal_id(1), None);
    }

    #[test]
    fn shapes_for_one_item() {
        let ids = AgendaNumbering::default();
        let summary = Regex::new(&summary_shape("E_C20_2025", &ids.internal_id(4).to_string(), "e")).unwrap();
        assert!(summary.is_match("E_C20_2025_5_e.pdf"));
        assert!(!summary.is_match("E_C20_2025_5_f.pdf"));
        assert!(!summary.is_match("E_C20_2025_15_e.pdf"));

        let addendum = Regex::new(&addendum_shape("E_C20_2025", &zero_pad(ids.internal_id(4)))).unwrap();
        for name in ["E_C20_2025_05_Add_2_e.pdf", "E_C20_2025_05_Add.1.pdf", "E_C20_2025_05_Add.1_f.pdf"] {
            assert!(addendum.is_match(name), "{name}");
        }
        assert!(!addendum.is_match("E_C20_2025_05_Add_e.pdf"));
        assert_eq!(&addendum.captures("E_C20_2025_05_Add_12_e.pdf").unwrap()[2], "12");
    }
}
