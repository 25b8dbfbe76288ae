use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::data::model::SearchDataset;
use crate::data::schema::CategoricalColumn;

// ---------------------------------------------------------------------------
// Weekly resampling
// ---------------------------------------------------------------------------

/// Monday of the calendar week containing `date`.
pub fn week_start(date: DateTime<Utc>) -> NaiveDate {
    let day = date.date_naive();
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Weekly search counts split by search type.
#[derive(Debug, Clone)]
pub struct WeeklyCounts {
    /// Week starts, ascending, gap-free between the first and last observation.
    pub weeks: Vec<NaiveDate>,
    /// Per search-type counts aligned with `weeks`. Records with a missing
    /// type are not counted, matching a group-by over the type column.
    pub by_type: BTreeMap<String, Vec<usize>>,
}

/// Bucket the dataset into calendar weeks and count searches per type.
pub fn weekly_type_counts(dataset: &SearchDataset) -> WeeklyCounts {
    let mut buckets: BTreeMap<(NaiveDate, &str), usize> = BTreeMap::new();
    for record in &dataset.records {
        if let Some(kind) = record.categorical(CategoricalColumn::Type) {
            *buckets.entry((week_start(record.date), kind)).or_default() += 1;
        }
    }

    let (first, last) = match (buckets.first_key_value(), buckets.last_key_value()) {
        (Some((&(first, _), _)), Some((&(last, _), _))) => (first, last),
        _ => {
            return WeeklyCounts {
                weeks: Vec::new(),
                by_type: BTreeMap::new(),
            }
        }
    };

    let mut weeks = Vec::new();
    let mut week = first;
    while week <= last {
        weeks.push(week);
        week = week + Duration::days(7);
    }

    let mut by_type: BTreeMap<String, Vec<usize>> = dataset
        .unique_values
        .get(&CategoricalColumn::Type)
        .map(|kinds| {
            kinds
                .iter()
                .map(|k| (k.clone(), vec![0; weeks.len()]))
                .collect()
        })
        .unwrap_or_default();

    for ((week, kind), count) in buckets {
        let slot = weeks.partition_point(|&w| w < week);
        if let Some(series) = by_type.get_mut(kind) {
            series[slot] = count;
        }
    }

    WeeklyCounts { weeks, by_type }
}

/// Weekly mean of a boolean series, e.g. the success-rate curve.
///
/// Weeks with no samples are omitted rather than reported as zero.
pub fn weekly_mean<I>(samples: I) -> Vec<(NaiveDate, f64)>
where
    I: IntoIterator<Item = (DateTime<Utc>, bool)>,
{
    let mut buckets: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for (date, hit) in samples {
        let entry = buckets.entry(week_start(date)).or_default();
        entry.0 += usize::from(hit);
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(week, (hits, total))| (week, hits as f64 / total as f64))
        .collect()
}
