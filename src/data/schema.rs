//! Static schema of the raw search-record export.
//!
//! The rename map, the categorical column set, and the closed value domains
//! live here as plain tables so they can be checked on their own, away from
//! the load routine that applies them.

// ---------------------------------------------------------------------------
// Identifier and rename map
// ---------------------------------------------------------------------------

/// Header label of the identifier column in every source file.
pub const ID_COLUMN: &str = "observation_id";

/// Source header label → canonical column name.
///
/// A total bijection over the fixed export format: each source label maps to
/// exactly one canonical name and no two labels share a target.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("Type", "type"),
    ("Date", "date"),
    ("Part of a policing operation", "operation"),
    ("Latitude", "lat"),
    ("Longitude", "long"),
    ("Gender", "sex"),
    ("Age range", "age"),
    ("Self-defined ethnicity", "ethnicity_self"),
    ("Officer-defined ethnicity", "ethnicity_officer"),
    ("Legislation", "legislation"),
    ("Object of search", "search_target"),
    ("Outcome", "outcome"),
    ("Outcome linked to object of search", "found_target"),
    ("Removal of more than just outer clothing", "stripped"),
    ("station", "station"),
];

/// Source header label for a canonical column name.
pub fn source_label(canonical: &str) -> Option<&'static str> {
    COLUMN_RENAMES
        .iter()
        .find(|(_, c)| *c == canonical)
        .map(|(s, _)| *s)
}

// ---------------------------------------------------------------------------
// Categorical columns
// ---------------------------------------------------------------------------

/// The canonical columns carrying categorical data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoricalColumn {
    Type,
    Operation,
    Sex,
    Age,
    EthnicitySelf,
    EthnicityOfficer,
    Legislation,
    SearchTarget,
    Outcome,
    Station,
}

impl CategoricalColumn {
    /// Every categorical column, in canonical-table order.
    pub const ALL: [CategoricalColumn; 10] = [
        CategoricalColumn::Type,
        CategoricalColumn::Operation,
        CategoricalColumn::Sex,
        CategoricalColumn::Age,
        CategoricalColumn::EthnicitySelf,
        CategoricalColumn::EthnicityOfficer,
        CategoricalColumn::Legislation,
        CategoricalColumn::SearchTarget,
        CategoricalColumn::Outcome,
        CategoricalColumn::Station,
    ];

    /// Canonical column name.
    pub fn canonical_name(self) -> &'static str {
        match self {
            CategoricalColumn::Type => "type",
            CategoricalColumn::Operation => "operation",
            CategoricalColumn::Sex => "sex",
            CategoricalColumn::Age => "age",
            CategoricalColumn::EthnicitySelf => "ethnicity_self",
            CategoricalColumn::EthnicityOfficer => "ethnicity_officer",
            CategoricalColumn::Legislation => "legislation",
            CategoricalColumn::SearchTarget => "search_target",
            CategoricalColumn::Outcome => "outcome",
            CategoricalColumn::Station => "station",
        }
    }

    /// Declared value domain, for the closed small-cardinality columns.
    ///
    /// Columns returning `None` are still categorical but take their domain
    /// from the data (legislation, object of search, outcome and station
    /// have no fixed nationwide list).
    pub fn declared_domain(self) -> Option<&'static [&'static str]> {
        match self {
            CategoricalColumn::Operation => Some(OPERATION_DOMAIN),
            CategoricalColumn::Sex => Some(SEX_DOMAIN),
            CategoricalColumn::Age => Some(AGE_DOMAIN),
            CategoricalColumn::EthnicitySelf => Some(ETHNICITY_SELF_DOMAIN),
            CategoricalColumn::EthnicityOfficer => Some(ETHNICITY_OFFICER_DOMAIN),
            _ => None,
        }
    }
}

impl std::fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}

// ---------------------------------------------------------------------------
// Closed value domains
// ---------------------------------------------------------------------------

/// "Part of a policing operation" is recorded as a textual flag.
pub const OPERATION_DOMAIN: &[&str] = &["True", "False"];

pub const SEX_DOMAIN: &[&str] = &["Male", "Female", "Other"];

pub const AGE_DOMAIN: &[&str] = &["under 10", "10-17", "18-24", "25-34", "over 34"];

/// Officer-defined ethnicity is recorded directly at the coarse level.
pub const ETHNICITY_OFFICER_DOMAIN: &[&str] = &["Asian", "Black", "White", "Mixed", "Other"];

/// Self-defined ethnicity uses the detailed census classification.
pub const ETHNICITY_SELF_DOMAIN: &[&str] = &[
    "White - English/Welsh/Scottish/Northern Irish/British",
    "White - Irish",
    "White - Gypsy or Irish Traveller",
    "White - Any other White background",
    "Mixed/Multiple ethnic groups - White and Black Caribbean",
    "Mixed/Multiple ethnic groups - White and Black African",
    "Mixed/Multiple ethnic groups - White and Asian",
    "Mixed/Multiple ethnic groups - Any other Mixed/Multiple ethnic background",
    "Asian/Asian British - Indian",
    "Asian/Asian British - Pakistani",
    "Asian/Asian British - Bangladeshi",
    "Asian/Asian British - Chinese",
    "Asian/Asian British - Any other Asian background",
    "Black/African/Caribbean/Black British - African",
    "Black/African/Caribbean/Black British - Caribbean",
    "Black/African/Caribbean/Black British - Any other Black/African/Caribbean background",
    "Other ethnic group - Arab",
    "Other ethnic group - Not stated",
    "Other ethnic group - Any other ethnic group",
];

// ---------------------------------------------------------------------------
// Boolean columns
// ---------------------------------------------------------------------------

/// Canonical columns parsed to nullable booleans.
pub const BOOLEAN_COLUMNS: &[&str] = &["found_target", "stripped"];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn rename_map_is_a_bijection() {
        let sources: BTreeSet<_> = COLUMN_RENAMES.iter().map(|(s, _)| *s).collect();
        let targets: BTreeSet<_> = COLUMN_RENAMES.iter().map(|(_, c)| *c).collect();
        assert_eq!(sources.len(), COLUMN_RENAMES.len());
        assert_eq!(targets.len(), COLUMN_RENAMES.len());
    }

    #[test]
    fn every_categorical_column_has_a_source_label() {
        for col in CategoricalColumn::ALL {
            assert!(
                source_label(col.canonical_name()).is_some(),
                "no source label for {col}"
            );
        }
    }

    #[test]
    fn boolean_columns_have_source_labels() {
        for col in BOOLEAN_COLUMNS {
            assert!(source_label(col).is_some(), "no source label for {col}");
        }
    }

    #[test]
    fn declared_domains_have_no_duplicates() {
        for col in CategoricalColumn::ALL {
            if let Some(domain) = col.declared_domain() {
                let unique: BTreeSet<_> = domain.iter().collect();
                assert_eq!(unique.len(), domain.len(), "duplicate value in {col} domain");
            }
        }
    }

    #[test]
    fn id_column_is_not_renamed() {
        assert!(COLUMN_RENAMES.iter().all(|(s, c)| *s != ID_COLUMN && *c != ID_COLUMN));
    }
}
