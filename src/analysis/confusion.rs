use crate::data::model::SearchDataset;

// ---------------------------------------------------------------------------
// Coarse ethnicity grouping
// ---------------------------------------------------------------------------

/// Coarse ethnicity groups, in the fixed presentation order used by the
/// officer-defined classification.
pub const ETHNICITY_GROUPS: [&str; 5] = ["Asian", "Black", "White", "Mixed", "Other"];

/// Detailed self-defined census label → coarse group.
///
/// "Not stated" is deliberately absent: it carries no group and such rows
/// drop out of the cross-tabulation.
const COARSE_SELF_ETHNICITY: &[(&str, &str)] = &[
    ("White - English/Welsh/Scottish/Northern Irish/British", "White"),
    ("White - Irish", "White"),
    ("White - Gypsy or Irish Traveller", "White"),
    ("White - Any other White background", "White"),
    ("Mixed/Multiple ethnic groups - White and Black Caribbean", "Mixed"),
    ("Mixed/Multiple ethnic groups - White and Black African", "Mixed"),
    ("Mixed/Multiple ethnic groups - White and Asian", "Mixed"),
    (
        "Mixed/Multiple ethnic groups - Any other Mixed/Multiple ethnic background",
        "Mixed",
    ),
    ("Asian/Asian British - Indian", "Asian"),
    ("Asian/Asian British - Pakistani", "Asian"),
    ("Asian/Asian British - Bangladeshi", "Asian"),
    ("Asian/Asian British - Chinese", "Asian"),
    ("Asian/Asian British - Any other Asian background", "Asian"),
    ("Black/African/Caribbean/Black British - African", "Black"),
    ("Black/African/Caribbean/Black British - Caribbean", "Black"),
    (
        "Black/African/Caribbean/Black British - Any other Black/African/Caribbean background",
        "Black",
    ),
    ("Other ethnic group - Arab", "Other"),
    ("Other ethnic group - Any other ethnic group", "Other"),
];

/// Coarse group for a detailed self-defined label, when one exists.
pub fn coarse_self_ethnicity(label: &str) -> Option<&'static str> {
    COARSE_SELF_ETHNICITY
        .iter()
        .find(|(detailed, _)| *detailed == label)
        .map(|(_, group)| *group)
}

// ---------------------------------------------------------------------------
// Confusion matrix: self-defined vs officer-ascribed
// ---------------------------------------------------------------------------

/// Cross-tabulation of coarse self-defined ethnicity against the
/// officer-ascribed classification.
///
/// Rows are the self-defined group, columns the officer-ascribed one, both
/// over [`ETHNICITY_GROUPS`]. Records missing either classification, or
/// whose self-defined label has no coarse group, are excluded.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    /// counts[self_group][officer_group]
    pub counts: [[usize; ETHNICITY_GROUPS.len()]; ETHNICITY_GROUPS.len()],
    /// Number of records tabulated.
    pub total: usize,
}

impl ConfusionMatrix {
    /// Tabulate a dataset.
    pub fn from_dataset(dataset: &SearchDataset) -> Self {
        let mut counts = [[0usize; ETHNICITY_GROUPS.len()]; ETHNICITY_GROUPS.len()];
        let mut total = 0;
        for record in &dataset.records {
            let self_group = record
                .ethnicity_self
                .as_deref()
                .and_then(coarse_self_ethnicity)
                .and_then(group_index);
            let officer_group = record.ethnicity_officer.as_deref().and_then(group_index);
            if let (Some(s), Some(o)) = (self_group, officer_group) {
                counts[s][o] += 1;
                total += 1;
            }
        }
        ConfusionMatrix { counts, total }
    }

    /// Row-normalized rates: each self-defined row sums to 1, or stays all
    /// zero when the group never occurs.
    pub fn row_normalized(&self) -> [[f64; ETHNICITY_GROUPS.len()]; ETHNICITY_GROUPS.len()] {
        let mut rates = [[0.0; ETHNICITY_GROUPS.len()]; ETHNICITY_GROUPS.len()];
        for (row, counts) in self.counts.iter().enumerate() {
            let row_total: usize = counts.iter().sum();
            if row_total == 0 {
                continue;
            }
            for (col, &count) in counts.iter().enumerate() {
                rates[row][col] = count as f64 / row_total as f64;
            }
        }
        rates
    }

    /// Fraction of tabulated records where the officer's classification
    /// matches the coarse self-defined group.
    pub fn agreement(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let diagonal: usize = (0..ETHNICITY_GROUPS.len()).map(|i| self.counts[i][i]).sum();
        diagonal as f64 / self.total as f64
    }
}

fn group_index(group: &str) -> Option<usize> {
    ETHNICITY_GROUPS.iter().position(|g| *g == group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SearchRecord;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, ethnicity_self: Option<&str>, officer: Option<&str>) -> SearchRecord {
        SearchRecord {
            observation_id: id,
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            search_type: None,
            operation: None,
            lat: None,
            long: None,
            sex: None,
            age: None,
            ethnicity_self: ethnicity_self.map(str::to_string),
            ethnicity_officer: officer.map(str::to_string),
            legislation: None,
            search_target: None,
            outcome: None,
            found_target: None,
            stripped: None,
            station: None,
        }
    }

    #[test]
    fn every_domain_label_except_not_stated_has_a_group() {
        use crate::data::schema::ETHNICITY_SELF_DOMAIN;
        for label in ETHNICITY_SELF_DOMAIN {
            let group = coarse_self_ethnicity(label);
            if *label == "Other ethnic group - Not stated" {
                assert_eq!(group, None);
            } else {
                assert!(group.is_some(), "no coarse group for '{label}'");
            }
        }
    }

    #[test]
    fn tabulates_only_fully_classified_records() {
        let ds = SearchDataset::from_records(vec![
            record(1, Some("White - Irish"), Some("White")),
            record(2, Some("White - Irish"), Some("Asian")),
            record(3, Some("Other ethnic group - Not stated"), Some("White")),
            record(4, None, Some("Black")),
            record(5, Some("Asian/Asian British - Indian"), None),
        ]);
        let matrix = ConfusionMatrix::from_dataset(&ds);
        assert_eq!(matrix.total, 2);
        let white = group_index("White").unwrap();
        let asian = group_index("Asian").unwrap();
        assert_eq!(matrix.counts[white][white], 1);
        assert_eq!(matrix.counts[white][asian], 1);
        assert!((matrix.agreement() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rows_normalize_to_one_or_zero() {
        let ds = SearchDataset::from_records(vec![
            record(1, Some("White - Irish"), Some("White")),
            record(2, Some("White - Any other White background"), Some("Mixed")),
        ]);
        let rates = ConfusionMatrix::from_dataset(&ds).row_normalized();
        for (row, label) in rates.iter().zip(ETHNICITY_GROUPS) {
            let sum: f64 = row.iter().sum();
            if label == "White" {
                assert!((sum - 1.0).abs() < 1e-12);
            } else {
                assert_eq!(sum, 0.0);
            }
        }
    }
}
