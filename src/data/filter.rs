use std::collections::{BTreeMap, BTreeSet};

use super::model::SearchDataset;
use super::schema::CategoricalColumn;

// ---------------------------------------------------------------------------
// Filter predicate: which category values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: categorical column → set of selected values.
/// `None` in a set selects records missing that column. A column absent
/// from the map means "no filter" (keep all).
pub type FilterState = BTreeMap<CategoricalColumn, BTreeSet<Option<String>>>;

/// Initialise a [`FilterState`] with every observed value (and missing)
/// selected, i.e. keeping everything.
pub fn init_filter_state(dataset: &SearchDataset) -> FilterState {
    CategoricalColumn::ALL
        .iter()
        .map(|&col| {
            let mut selected: BTreeSet<Option<String>> = dataset
                .unique_values
                .get(&col)
                .map(|vals| vals.iter().cloned().map(Some).collect())
                .unwrap_or_default();
            selected.insert(None);
            (col, selected)
        })
        .collect()
}

/// Return indices of records that pass all active filters.
///
/// A record passes a column filter when:
/// * The column is not present in `filters` → passes (no constraint)
/// * The filter set for that column is empty → nothing selected → fails
/// * The record's value for that column is in the selected set → passes
pub fn filtered_indices(dataset: &SearchDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            for (&col, selected) in filters {
                if selected.is_empty() {
                    // Nothing selected for this column → drop everything
                    return false;
                }
                let value = record.categorical(col);
                if !selected.iter().any(|s| s.as_deref() == value) {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SearchRecord;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, station: Option<&str>, sex: Option<&str>) -> SearchRecord {
        SearchRecord {
            observation_id: id,
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            search_type: None,
            operation: None,
            lat: None,
            long: None,
            sex: sex.map(str::to_string),
            age: None,
            ethnicity_self: None,
            ethnicity_officer: None,
            legislation: None,
            search_target: None,
            outcome: None,
            found_target: None,
            stripped: None,
            station: station.map(str::to_string),
        }
    }

    fn dataset() -> SearchDataset {
        SearchDataset::from_records(vec![
            record(1, Some("kent"), Some("Male")),
            record(2, Some("sussex"), Some("Female")),
            record(3, None, Some("Male")),
        ])
    }

    #[test]
    fn initial_state_keeps_everything() {
        let ds = dataset();
        let filters = init_filter_state(&ds);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn deselecting_a_value_hides_its_records() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters
            .get_mut(&CategoricalColumn::Station)
            .unwrap()
            .remove(&Some("sussex".to_string()));
        let kept = filtered_indices(&ds, &filters);
        assert!(kept.iter().all(|&i| {
            ds.records[i].station.as_deref() != Some("sussex")
        }));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn missing_values_are_selectable() {
        let ds = dataset();
        let mut filters = init_filter_state(&ds);
        filters
            .get_mut(&CategoricalColumn::Station)
            .unwrap()
            .remove(&None);
        let kept = filtered_indices(&ds, &filters);
        assert!(kept.iter().all(|&i| ds.records[i].station.is_some()));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn empty_selection_hides_all() {
        let ds = dataset();
        let mut filters = FilterState::new();
        filters.insert(CategoricalColumn::Sex, BTreeSet::new());
        assert!(filtered_indices(&ds, &filters).is_empty());
    }
}
