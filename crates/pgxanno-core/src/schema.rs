//! Arrow schema for the annotation report table.
//!
//! One row per record. Every column except the ID is nullable: a field the
//! resolvers could not fill is a null, never an empty string.

use arrow::datatypes::{DataType, Field, Schema};

/// Column names in schema order.
pub const COLUMNS: [&str; 33] = [
    "variant_annotation_id",
    "pmid",
    "gene",
    "variant_haplotypes",
    "variant_rule",
    "alleles",
    "drugs",
    "drug_operator",
    "phenotype_category",
    "significance",
    "association",
    "direction_of_effect",
    "pd_pk_term",
    "specialty_population",
    "population_phenotypes",
    "comparison",
    "biogeographic_group",
    "biogeographic_status",
    "characteristics",
    "characteristics_type",
    "p_value",
    "ratio_stat_type",
    "ratio_stat",
    "ci_start",
    "ci_stop",
    "frequency_in_cases",
    "frequency_in_controls",
    "study_cases",
    "study_controls",
    "sentence",
    "verdict",
    "failed_checks",
    "excerpt_ref",
];

/// Numeric study statistics, stored as Float64.
pub const FLOAT_COLUMNS: [&str; 5] = [
    "ratio_stat",
    "ci_start",
    "ci_stop",
    "frequency_in_cases",
    "frequency_in_controls",
];

/// Cohort sizes, stored as UInt64.
pub const COUNT_COLUMNS: [&str; 2] = ["study_cases", "study_controls"];

/// Arrow type of a report column. Anything not numeric is Utf8.
pub fn column_type(name: &str) -> DataType {
    if name == COLUMNS[0] || COUNT_COLUMNS.contains(&name) {
        DataType::UInt64
    } else if FLOAT_COLUMNS.contains(&name) {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

/// Schema for the per-record annotation report.
pub fn annotation_schema() -> Schema {
    let fields: Vec<Field> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| Field::new(*name, column_type(name), i > 0))
        .collect();
    Schema::new(fields)
}
