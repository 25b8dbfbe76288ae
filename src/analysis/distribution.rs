use std::collections::BTreeSet;

use crate::data::model::SearchDataset;
use crate::data::schema::CategoricalColumn;

// ---------------------------------------------------------------------------
// Cross-dataset category distributions
// ---------------------------------------------------------------------------

/// Per-value shares of one categorical column across several datasets,
/// for comparing how the datasets are distributed over the same categories.
#[derive(Debug, Clone)]
pub struct DistributionComparison {
    pub column: CategoricalColumn,
    /// Union of observed values across all datasets, ascending; `None` last
    /// for the missing share.
    pub values: Vec<Option<String>>,
    /// `fractions[dataset][value]`, aligned with `values`. Each inner vector
    /// sums to 1 for a non-empty dataset.
    pub fractions: Vec<Vec<f64>>,
}

/// Compare the value distribution of `column` across `datasets`.
pub fn compare_distributions(
    datasets: &[&SearchDataset],
    column: CategoricalColumn,
) -> DistributionComparison {
    let observed: BTreeSet<&str> = datasets
        .iter()
        .flat_map(|ds| ds.unique_values.get(&column))
        .flat_map(|vals| vals.iter().map(String::as_str))
        .collect();
    let mut values: Vec<Option<String>> =
        observed.iter().map(|v| Some((*v).to_string())).collect();
    values.push(None);

    let fractions = datasets
        .iter()
        .map(|ds| {
            let total = ds.len();
            values
                .iter()
                .map(|value| {
                    if total == 0 {
                        return 0.0;
                    }
                    let count = ds
                        .records
                        .iter()
                        .filter(|r| r.categorical(column) == value.as_deref())
                        .count();
                    count as f64 / total as f64
                })
                .collect()
        })
        .collect();

    DistributionComparison {
        column,
        values,
        fractions,
    }
}
