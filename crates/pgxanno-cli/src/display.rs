//! Vertical card display for annotation records.
//!
//! Renders one row of a report RecordBatch as a grouped, human-readable card.
//! Null columns are skipped, and sections with no data are omitted.

use arrow::array::{Array, LargeStringArray, StringArray, UInt64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use pgxanno_core::vocab::VocabSummary;
use pgxanno_core::{BatchSummary, ValidationReport};
use pgxanno_store::ReportTotals;

// ── Schema section groupings ──

const SOURCE: &[&str] = &["pmid", "excerpt_ref"];

const VARIANT: &[&str] = &[
    "gene",
    "variant_haplotypes",
    "variant_rule",
    "alleles",
    "comparison",
];

const ASSOCIATION: &[&str] = &[
    "drugs",
    "drug_operator",
    "association",
    "direction_of_effect",
    "pd_pk_term",
    "phenotype_category",
    "significance",
];

const POPULATION: &[&str] = &[
    "specialty_population",
    "population_phenotypes",
    "biogeographic_group",
    "biogeographic_status",
    "characteristics",
    "characteristics_type",
];

const STATISTICS: &[&str] = &[
    "p_value",
    "ratio_stat_type",
    "ratio_stat",
    "ci_start",
    "ci_stop",
    "study_cases",
    "frequency_in_cases",
    "study_controls",
    "frequency_in_controls",
];

const VALIDATION: &[&str] = &["verdict", "failed_checks"];

// ── Public API ──

/// Print one record of a report table as a vertical card.
pub fn print_record_card(batch: &RecordBatch, row: usize) {
    let id = batch
        .column_by_name("variant_annotation_id")
        .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
        .filter(|a| !a.is_null(row))
        .map(|a| a.value(row));
    let gene = get_utf8(batch, "gene", row).unwrap_or("-");
    let variant = get_utf8(batch, "variant_haplotypes", row).unwrap_or("-");

    match id {
        Some(id) => println!("=== #{id}  {gene} {variant} ==="),
        None => println!("=== {gene} {variant} ==="),
    }
    if let Some(sentence) = get_utf8(batch, "sentence", row) {
        println!("{sentence}");
    }
    println!();

    print_section(batch, row, "Source", SOURCE);
    print_section(batch, row, "Variant", VARIANT);
    print_section(batch, row, "Association", ASSOCIATION);
    print_section(batch, row, "Population", POPULATION);
    print_section(batch, row, "Study statistics", STATISTICS);
    print_section(batch, row, "Validation", VALIDATION);
}

/// Print the reason for every failed check.
pub fn print_failures(report: &ValidationReport) {
    let failed: Vec<_> = report.checks.iter().filter(|c| !c.passed).collect();
    if failed.is_empty() {
        return;
    }
    println!("Failed checks");
    for check in failed {
        let severity = check
            .severity()
            .map(|s| format!("{s:?}").to_lowercase())
            .unwrap_or_default();
        println!("  {:<26} [{severity}] {}", check.check.as_str(), check.detail);
    }
    println!();
}

pub fn print_summary(summary: &BatchSummary) {
    println!(
        "{} records: {} passed, {} soft-failed, {} hard-failed",
        summary.total, summary.passed, summary.soft_failed, summary.hard_failed
    );
}

pub fn print_totals(totals: &ReportTotals) {
    println!(
        "{} rows: {} passed, {} soft-failed, {} hard-failed",
        totals.rows, totals.passed, totals.soft_failed, totals.hard_failed
    );
}

pub fn print_vocab_summary(s: &VocabSummary) {
    println!("Vocabulary");
    let rows = [
        ("biogeographic terms", s.biogeographic_terms),
        ("biogeographic groups", s.distinct_groups),
        ("not-stated terms", s.not_stated_terms),
        ("metabolizer terms", s.metabolizer_terms),
        ("phenotype categories", s.phenotype_category_terms),
        ("PD/PK keywords", s.pd_pk_keywords),
        ("significance terms", s.significance_terms),
        ("direction terms", s.direction_terms),
        ("association terms", s.association_terms),
        ("specialty populations", s.specialty_terms),
    ];
    for (label, n) in rows {
        println!("  {label:<26} {n}");
    }
}

// ── Section rendering ──

fn print_section(batch: &RecordBatch, row: usize, header: &str, cols: &[&str]) {
    let has_data = cols.iter().any(|&col| {
        batch
            .column_by_name(col)
            .is_some_and(|c| !c.is_null(row))
    });
    if !has_data {
        return;
    }

    println!("{header}");
    for &col_name in cols {
        let Some(col) = batch.column_by_name(col_name) else {
            continue;
        };
        if col.is_null(row) {
            continue;
        }
        match col.data_type() {
            DataType::Utf8 | DataType::LargeUtf8 => {
                if let Some(v) = col_str(col.as_ref(), row) {
                    println!("  {col_name:<26} {v}");
                }
            }
            _ => {
                let formatted =
                    arrow::util::display::ArrayFormatter::try_new(col.as_ref(), &Default::default());
                match formatted {
                    Ok(fmt) => println!("  {col_name:<26} {}", fmt.value(row)),
                    Err(_) => println!("  {col_name:<26} ({})", col.data_type()),
                }
            }
        }
    }
    println!();
}

// ── Helpers ──

fn get_utf8<'a>(batch: &'a RecordBatch, col_name: &str, row: usize) -> Option<&'a str> {
    let col = batch.column_by_name(col_name)?;
    col_str(col.as_ref(), row)
}

/// Get a string value from a column that might be Utf8 or LargeUtf8.
fn col_str(col: &dyn Array, i: usize) -> Option<&str> {
    if col.is_null(i) {
        return None;
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Some(arr.value(i));
    }
    if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        return Some(arr.value(i));
    }
    None
}
