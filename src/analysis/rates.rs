use std::collections::BTreeMap;

use crate::data::model::{SearchDataset, SearchRecord};
use crate::data::schema::CategoricalColumn;

// ---------------------------------------------------------------------------
// Rate summaries
// ---------------------------------------------------------------------------

/// Summary of a boolean outcome within one group.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSummary {
    /// Fraction of positive outcomes.
    pub mean: f64,
    /// Sample standard deviation (zero for a single observation).
    pub std: f64,
    /// Number of non-missing outcomes in the group.
    pub count: usize,
    /// 1.96 standard errors, the half-width of the 95% interval.
    pub ci95: f64,
}

impl RateSummary {
    fn from_outcomes(hits: usize, count: usize) -> Self {
        let n = count as f64;
        let mean = hits as f64 / n;
        // Sample variance of a 0/1 series: n·p·(1-p)/(n-1)
        let std = if count > 1 {
            (n * mean * (1.0 - mean) / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let ci95 = 1.96 * std / n.sqrt();
        RateSummary {
            mean,
            std,
            count,
            ci95,
        }
    }
}

/// Group a `(key, outcome)` series and summarise each group, ascending by key.
pub fn rates<K, I>(samples: I) -> Vec<(K, RateSummary)>
where
    K: Ord,
    I: IntoIterator<Item = (K, bool)>,
{
    let mut groups: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for (key, hit) in samples {
        let entry = groups.entry(key).or_default();
        entry.0 += usize::from(hit);
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(key, (hits, count))| (key, RateSummary::from_outcomes(hits, count)))
        .collect()
}

/// Per-group rates of a boolean record outcome over a categorical column.
///
/// Records missing either the group value or the outcome are skipped, as in
/// a group-by over both columns.
pub fn group_rates<F>(
    dataset: &SearchDataset,
    column: CategoricalColumn,
    outcome: F,
) -> Vec<(String, RateSummary)>
where
    F: Fn(&SearchRecord) -> Option<bool>,
{
    rates(dataset.records.iter().filter_map(|record| {
        let group = record.categorical(column)?.to_string();
        let hit = outcome(record)?;
        Some((group, hit))
    }))
}

/// Overall rate of a boolean record outcome, `None` when every outcome is
/// missing.
pub fn overall_rate<F>(dataset: &SearchDataset, outcome: F) -> Option<f64>
where
    F: Fn(&SearchRecord) -> Option<bool>,
{
    let outcomes: Vec<bool> = dataset.records.iter().filter_map(outcome).collect();
    if outcomes.is_empty() {
        return None;
    }
    let hits = outcomes.iter().filter(|&&hit| hit).count();
    Some(hits as f64 / outcomes.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, age: Option<&str>, found: Option<bool>) -> SearchRecord {
        SearchRecord {
            observation_id: id,
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            search_type: None,
            operation: None,
            lat: None,
            long: None,
            sex: None,
            age: age.map(str::to_string),
            ethnicity_self: None,
            ethnicity_officer: None,
            legislation: None,
            search_target: None,
            outcome: None,
            found_target: found,
            stripped: None,
            station: None,
        }
    }

    #[test]
    fn groups_summarise_independently() {
        let ds = SearchDataset::from_records(vec![
            record(1, Some("18-24"), Some(true)),
            record(2, Some("18-24"), Some(false)),
            record(3, Some("25-34"), Some(true)),
            record(4, Some("25-34"), Some(true)),
            record(5, Some("25-34"), None),    // missing outcome skipped
            record(6, None, Some(true)),       // missing group skipped
        ]);
        let summary = group_rates(&ds, CategoricalColumn::Age, |r| r.found_target);
        assert_eq!(summary.len(), 2);
        let (young, young_rate) = &summary[0];
        assert_eq!(young, "18-24");
        assert!((young_rate.mean - 0.5).abs() < 1e-12);
        assert_eq!(young_rate.count, 2);
        let (_, older_rate) = &summary[1];
        assert!((older_rate.mean - 1.0).abs() < 1e-12);
        assert_eq!(older_rate.std, 0.0);
    }

    #[test]
    fn interval_matches_hand_computation() {
        // 3 of 4 hits: p = 0.75, sample std = sqrt(4·0.75·0.25/3) = 0.5
        let summary = rates(vec![("g", true), ("g", true), ("g", true), ("g", false)]);
        let (_, rate) = &summary[0];
        assert!((rate.std - 0.5).abs() < 1e-12);
        assert!((rate.ci95 - 1.96 * 0.5 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn overall_rate_ignores_missing() {
        let ds = SearchDataset::from_records(vec![
            record(1, None, Some(true)),
            record(2, None, None),
        ]);
        assert_eq!(overall_rate(&ds, |r| r.found_target), Some(1.0));
        assert_eq!(overall_rate(&ds, |r| r.stripped), None);
    }
}
