use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Dtype, PredictionRow, PredictionTable, SearchDataset, SearchRecord, Value};
use super::schema::{self, CategoricalColumn};

// ---------------------------------------------------------------------------
// Raw search-record loader
// ---------------------------------------------------------------------------

/// Load the raw search-record export into the canonical table.
///
/// One pass over the file: locate the identifier and every renamed source
/// column, parse timestamps and booleans, restrict categoricals to their
/// declared domains, then sort ascending by date. All-or-nothing — any
/// malformed row fails the whole load.
pub fn load_raw(path: &Path) -> Result<SearchDataset, LoadError> {
    let mut reader = open_csv(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let id_idx = headers
        .iter()
        .position(|h| h == schema::ID_COLUMN)
        .ok_or_else(|| LoadError::MissingColumn(schema::ID_COLUMN.to_string()))?;

    // Header position for every source column, keyed by canonical name.
    let mut positions: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (source, canonical) in schema::COLUMN_RENAMES {
        let idx = headers
            .iter()
            .position(|h| h == source)
            .ok_or_else(|| LoadError::MissingColumn(source.to_string()))?;
        positions.insert(canonical, idx);
    }

    let mut records = Vec::new();
    let mut seen_ids = BTreeSet::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let field = |canonical: &str| row.get(positions[canonical]).unwrap_or("").trim();

        let raw_id = row.get(id_idx).unwrap_or("").trim();
        let observation_id: i64 = raw_id
            .parse()
            .map_err(|_| LoadError::parse(row_no, schema::ID_COLUMN, format!("'{raw_id}' is not an integer id")))?;
        if !seen_ids.insert(observation_id) {
            return Err(LoadError::DuplicateId(observation_id));
        }

        let date = parse_date(field("date")).map_err(|msg| LoadError::parse(row_no, "date", msg))?;

        records.push(SearchRecord {
            observation_id,
            date,
            search_type: cast_categorical(CategoricalColumn::Type, field("type")),
            operation: cast_categorical(CategoricalColumn::Operation, field("operation")),
            lat: parse_coordinate(field("lat")).map_err(|msg| LoadError::parse(row_no, "lat", msg))?,
            long: parse_coordinate(field("long")).map_err(|msg| LoadError::parse(row_no, "long", msg))?,
            sex: cast_categorical(CategoricalColumn::Sex, field("sex")),
            age: cast_categorical(CategoricalColumn::Age, field("age")),
            ethnicity_self: cast_categorical(CategoricalColumn::EthnicitySelf, field("ethnicity_self")),
            ethnicity_officer: cast_categorical(CategoricalColumn::EthnicityOfficer, field("ethnicity_officer")),
            legislation: cast_categorical(CategoricalColumn::Legislation, field("legislation")),
            search_target: cast_categorical(CategoricalColumn::SearchTarget, field("search_target")),
            outcome: cast_categorical(CategoricalColumn::Outcome, field("outcome")),
            found_target: parse_bool(field("found_target"))
                .map_err(|msg| LoadError::parse(row_no, "found_target", msg))?,
            stripped: parse_bool(field("stripped"))
                .map_err(|msg| LoadError::parse(row_no, "stripped", msg))?,
            station: cast_categorical(CategoricalColumn::Station, field("station")),
        });
    }

    debug!("loaded {} search records from {}", records.len(), path.display());
    Ok(SearchDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Prediction-export loader
// ---------------------------------------------------------------------------

/// One row of the hosted database export.
#[derive(Debug, Deserialize)]
struct ExportRow {
    /// The served request, re-serialized as a JSON object.
    request: String,
    predicted_outcome: Option<String>,
    true_outcome: Option<String>,
}

/// Load a prediction export into a [`PredictionTable`].
///
/// Each row's `request` field is parsed as a strict JSON object (never
/// evaluated); the fields left after removing `observation_id` are renamed
/// positionally to `columns` and cast per `dtypes`. Columns without a
/// declared dtype keep their JSON-native type. The export's
/// `predicted_outcome`/`true_outcome` fields become the table's
/// `predicted_outcome`/`success` booleans, aligned by row.
pub fn load_predictions(
    path: &Path,
    columns: &[&str],
    dtypes: &BTreeMap<&str, Dtype>,
) -> Result<PredictionTable, LoadError> {
    let mut reader = open_csv(path)?;
    let headers = reader.headers()?.clone();
    for required in ["request", "predicted_outcome", "true_outcome"] {
        if !headers.iter().any(|h| h == required) {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }

    let mut rows: Vec<PredictionRow> = Vec::new();
    let mut index = BTreeMap::new();

    for (row_no, result) in reader.deserialize::<ExportRow>().enumerate() {
        let export = result?;
        let (observation_id, values) = parse_request(&export.request, row_no, columns, dtypes)?;
        if index.insert(observation_id, rows.len()).is_some() {
            return Err(LoadError::DuplicateId(observation_id));
        }
        rows.push(PredictionRow {
            observation_id,
            values,
            predicted_outcome: parse_export_bool(export.predicted_outcome, row_no, "predicted_outcome")?,
            success: parse_export_bool(export.true_outcome, row_no, "true_outcome")?,
        });
    }

    debug!("loaded {} prediction rows from {}", rows.len(), path.display());
    Ok(PredictionTable {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
        index,
    })
}

/// Deserialize one `request` field into (id, renamed and cast cells).
fn parse_request(
    raw: &str,
    row: usize,
    columns: &[&str],
    dtypes: &BTreeMap<&str, Dtype>,
) -> Result<(i64, Vec<Value>), LoadError> {
    let json: JsonValue = serde_json::from_str(raw).map_err(|e| LoadError::MalformedRequest {
        row,
        message: e.to_string(),
    })?;
    let object = json.as_object().ok_or_else(|| LoadError::MalformedRequest {
        row,
        message: "not a JSON object".to_string(),
    })?;

    let observation_id = object
        .get(schema::ID_COLUMN)
        .ok_or_else(|| LoadError::MalformedRequest {
            row,
            message: format!("missing '{}' field", schema::ID_COLUMN),
        })?
        .as_i64()
        .ok_or_else(|| LoadError::parse(row, schema::ID_COLUMN, "not an integer"))?;

    // serde_json preserves field order, so positional renaming is stable.
    let fields: Vec<(&String, &JsonValue)> = object
        .iter()
        .filter(|(key, _)| key.as_str() != schema::ID_COLUMN)
        .collect();
    if fields.len() != columns.len() {
        return Err(LoadError::ColumnCountMismatch {
            row,
            expected: columns.len(),
            actual: fields.len(),
        });
    }

    let mut values = Vec::with_capacity(columns.len());
    for (name, &(_, cell)) in columns.iter().zip(&fields) {
        let value = match dtypes.get(*name) {
            Some(dtype) => cast_value(cell, *dtype).map_err(|msg| LoadError::parse(row, name, msg))?,
            None => json_to_value(cell),
        };
        values.push(value);
    }
    Ok((observation_id, values))
}

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

fn open_csv(path: &Path) -> Result<csv::Reader<File>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::Reader::from_reader(file))
}

/// Parse the export's date representation: RFC 3339, a naive timestamp, or
/// a bare date (midnight UTC).
fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
    }
    Err(format!("'{raw}' is not a recognized timestamp"))
}

/// Restrict a raw categorical value to its column's declared domain.
/// Out-of-domain values become missing, never an error.
fn cast_categorical(column: CategoricalColumn, raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if let Some(domain) = column.declared_domain() {
        if !domain.contains(&raw) {
            warn!("column '{column}': unrecognized category '{raw}' mapped to missing");
            return None;
        }
    }
    Some(raw.to_string())
}

fn parse_coordinate(raw: &str) -> Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("'{raw}' is not a number"))
}

fn parse_bool(raw: &str) -> Result<Option<bool>, String> {
    if raw.is_empty() {
        Ok(None)
    } else if raw.eq_ignore_ascii_case("true") {
        Ok(Some(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(Some(false))
    } else {
        Err(format!("'{raw}' is not a boolean"))
    }
}

fn parse_export_bool(
    raw: Option<String>,
    row: usize,
    column: &str,
) -> Result<Option<bool>, LoadError> {
    parse_bool(raw.as_deref().unwrap_or("").trim())
        .map_err(|msg| LoadError::parse(row, column, msg))
}

/// Keep a JSON cell's native type when no dtype was declared for it.
fn json_to_value(cell: &JsonValue) -> Value {
    match cell {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

/// Cast a JSON cell to the caller-declared dtype. Nulls pass through.
fn cast_value(cell: &JsonValue, dtype: Dtype) -> Result<Value, String> {
    if cell.is_null() {
        return Ok(Value::Null);
    }
    match dtype {
        Dtype::Int => cell
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| format!("cannot cast {cell} to integer")),
        Dtype::Float => cell
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| format!("cannot cast {cell} to float")),
        Dtype::Bool => cell
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| format!("cannot cast {cell} to boolean")),
        Dtype::Text | Dtype::Category => cell
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| format!("cannot cast {cell} to text")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_formats_accepted() {
        for raw in [
            "2020-01-01T11:30:00+00:00",
            "2020-01-01T11:30:00",
            "2020-01-01 11:30:00",
        ] {
            let parsed = parse_date(raw).unwrap();
            assert_eq!(parsed.to_rfc3339(), "2020-01-01T11:30:00+00:00", "from {raw}");
        }
        assert_eq!(
            parse_date("2020-01-01").unwrap().to_rfc3339(),
            "2020-01-01T00:00:00+00:00"
        );
        assert!(parse_date("01/02/2020").is_err());
    }

    #[test]
    fn booleans_are_case_insensitive_and_nullable() {
        assert_eq!(parse_bool("True"), Ok(Some(true)));
        assert_eq!(parse_bool("false"), Ok(Some(false)));
        assert_eq!(parse_bool(""), Ok(None));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn out_of_domain_category_becomes_missing() {
        assert_eq!(cast_categorical(CategoricalColumn::Sex, "Unknown"), None);
        assert_eq!(
            cast_categorical(CategoricalColumn::Sex, "Female"),
            Some("Female".to_string())
        );
        // Open-domain column passes anything non-empty through.
        assert_eq!(
            cast_categorical(CategoricalColumn::Station, "city-of-london"),
            Some("city-of-london".to_string())
        );
    }

    #[test]
    fn declared_casts_are_strict() {
        let one = serde_json::json!(1);
        assert_eq!(cast_value(&one, Dtype::Int), Ok(Value::Integer(1)));
        assert_eq!(cast_value(&one, Dtype::Float), Ok(Value::Float(1.0)));
        assert!(cast_value(&one, Dtype::Bool).is_err());
        assert!(cast_value(&serde_json::json!("x"), Dtype::Int).is_err());
        assert_eq!(cast_value(&JsonValue::Null, Dtype::Bool), Ok(Value::Null));
    }
}
