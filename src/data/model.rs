use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};

use super::schema::CategoricalColumn;

// ---------------------------------------------------------------------------
// SearchRecord – one row of the canonical table
// ---------------------------------------------------------------------------

/// A single stop-and-search observation.
///
/// Categorical fields hold the canonical value or `None` for missing data;
/// a raw value outside a column's declared domain is also loaded as `None`.
#[derive(Debug, Clone)]
pub struct SearchRecord {
    /// Unique identifier, the table's primary key.
    pub observation_id: i64,
    /// When the search took place.
    pub date: DateTime<Utc>,
    /// What was searched: person, vehicle, or both (canonical column `type`).
    pub search_type: Option<String>,
    /// Whether the search was part of a policing operation.
    pub operation: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub sex: Option<String>,
    pub age: Option<String>,
    /// Ethnicity as reported by the person searched.
    pub ethnicity_self: Option<String>,
    /// Ethnicity as ascribed by the officer. Compared with
    /// [`ethnicity_self`](Self::ethnicity_self), never merged.
    pub ethnicity_officer: Option<String>,
    pub legislation: Option<String>,
    /// What the officer was searching for.
    pub search_target: Option<String>,
    pub outcome: Option<String>,
    /// Whether the outcome was linked to the object of the search.
    pub found_target: Option<bool>,
    /// Whether more than outer clothing was removed.
    pub stripped: Option<bool>,
    /// Reporting police unit.
    pub station: Option<String>,
}

impl SearchRecord {
    /// Value of a categorical column, `None` when missing.
    pub fn categorical(&self, column: CategoricalColumn) -> Option<&str> {
        let field = match column {
            CategoricalColumn::Type => &self.search_type,
            CategoricalColumn::Operation => &self.operation,
            CategoricalColumn::Sex => &self.sex,
            CategoricalColumn::Age => &self.age,
            CategoricalColumn::EthnicitySelf => &self.ethnicity_self,
            CategoricalColumn::EthnicityOfficer => &self.ethnicity_officer,
            CategoricalColumn::Legislation => &self.legislation,
            CategoricalColumn::SearchTarget => &self.search_target,
            CategoricalColumn::Outcome => &self.outcome,
            CategoricalColumn::Station => &self.station,
        };
        field.as_deref()
    }

    /// Both coordinates, when the record is geolocated.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.long) {
            (Some(lat), Some(long)) => Some((lat, long)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchDataset – the canonical table
// ---------------------------------------------------------------------------

/// The canonical table: records ascending by date, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct SearchDataset {
    /// All records, sorted ascending by `date`.
    pub records: Vec<SearchRecord>,
    /// observation_id → position in `records`.
    pub index: BTreeMap<i64, usize>,
    /// Unique observed values per categorical column.
    pub unique_values: BTreeMap<CategoricalColumn, BTreeSet<String>>,
}

impl SearchDataset {
    /// Build the table from loaded records: sort by date and index.
    ///
    /// Ids are assumed unique; the loader enforces that before calling here.
    pub fn from_records(mut records: Vec<SearchRecord>) -> Self {
        records.sort_by_key(|r| r.date);

        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.observation_id, i))
            .collect();

        let mut unique_values: BTreeMap<CategoricalColumn, BTreeSet<String>> = BTreeMap::new();
        for record in &records {
            for col in CategoricalColumn::ALL {
                if let Some(value) = record.categorical(col) {
                    unique_values
                        .entry(col)
                        .or_default()
                        .insert(value.to_string());
                }
            }
        }

        SearchDataset {
            records,
            index,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by observation id.
    pub fn get(&self, observation_id: i64) -> Option<&SearchRecord> {
        self.index
            .get(&observation_id)
            .map(|&i| &self.records[i])
    }

    /// Records carrying both coordinates, in date order.
    pub fn located(&self) -> impl Iterator<Item = &SearchRecord> {
        self.records.iter().filter(|r| r.coordinates().is_some())
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell in a prediction table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell of a caller-shaped prediction table.
/// Used as a grouping key downstream, so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so Value can key BTreeMap/BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64` for numeric summaries.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dtype – caller-declared column types for a prediction export
// ---------------------------------------------------------------------------

/// Target type a caller declares for a prediction-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    Int,
    Float,
    Bool,
    Text,
    /// Same representation as [`Dtype::Text`]; marks the column as a
    /// closed-vocabulary grouping key.
    Category,
}

// ---------------------------------------------------------------------------
// PredictionTable – the derived table variant
// ---------------------------------------------------------------------------

/// One row of a prediction table.
#[derive(Debug, Clone)]
pub struct PredictionRow {
    pub observation_id: i64,
    /// Cell values aligned with [`PredictionTable::columns`].
    pub values: Vec<Value>,
    /// The model's predicted outcome.
    pub predicted_outcome: Option<bool>,
    /// The observed ground-truth outcome.
    pub success: Option<bool>,
}

/// A model-evaluation table reconstructed from a database export: the
/// deserialized request features plus the prediction and ground truth.
#[derive(Debug, Clone)]
pub struct PredictionTable {
    /// Caller-assigned column names, in order.
    pub columns: Vec<String>,
    /// All rows, in file order.
    pub rows: Vec<PredictionRow>,
    /// observation_id → position in `rows`.
    pub index: BTreeMap<i64, usize>,
}

impl PredictionTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row by observation id.
    pub fn get(&self, observation_id: i64) -> Option<&PredictionRow> {
        self.index.get(&observation_id).map(|&i| &self.rows[i])
    }

    /// All cells of a named column, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |r| &r.values[pos]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, day: u32, station: Option<&str>) -> SearchRecord {
        SearchRecord {
            observation_id: id,
            date: Utc.with_ymd_and_hms(2020, 1, day, 12, 0, 0).unwrap(),
            search_type: Some("Person search".to_string()),
            operation: None,
            lat: None,
            long: None,
            sex: Some("Male".to_string()),
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

    #[test]
    fn from_records_sorts_by_date_and_indexes_by_id() {
        let ds = SearchDataset::from_records(vec![
            record(10, 20, Some("thames-valley")),
            record(11, 3, Some("kent")),
            record(12, 9, None),
        ]);
        let dates: Vec<_> = ds.records.iter().map(|r| r.date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ds.get(11).map(|r| r.date.format("%d").to_string()), Some("03".into()));
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn unique_values_skip_missing() {
        let ds = SearchDataset::from_records(vec![
            record(1, 1, Some("kent")),
            record(2, 2, None),
            record(3, 3, Some("kent")),
        ]);
        let stations = &ds.unique_values[&CategoricalColumn::Station];
        assert_eq!(stations.iter().collect::<Vec<_>>(), vec!["kent"]);
    }

    #[test]
    fn value_orders_across_types() {
        let mut cells = vec![
            Value::String("a".into()),
            Value::Null,
            Value::Float(1.5),
            Value::Integer(3),
            Value::Bool(true),
        ];
        cells.sort();
        assert_eq!(cells.first(), Some(&Value::Null));
        assert_eq!(cells.last(), Some(&Value::String("a".into())));
    }

    #[test]
    fn prediction_table_column_lookup() {
        let table = PredictionTable {
            columns: vec!["a".into(), "b".into()],
            rows: vec![PredictionRow {
                observation_id: 7,
                values: vec![Value::Integer(1), Value::Integer(2)],
                predicted_outcome: Some(true),
                success: Some(false),
            }],
            index: [(7, 0)].into_iter().collect(),
        };
        let b: Vec<_> = table.column("b").unwrap().collect();
        assert_eq!(b, vec![&Value::Integer(2)]);
        assert!(table.column("c").is_none());
    }
}
