//! DocumentBatch → Arrow `RecordBatch`, and verdict totals back out.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, LargeStringArray, StringArray, UInt64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use pgxanno_core::schema::COLUMNS;
use pgxanno_core::{BatchEntry, DocumentBatch, Verdict, annotation_schema};

use crate::StoreError;

/// Nullable value columns, i.e. every column after `variant_annotation_id`.
const VALUE_COLUMNS: usize = COLUMNS.len() - 1;

/// One cell of a value column, typed like its schema field.
enum Cell {
    Text(Option<String>),
    Float(Option<f64>),
    Count(Option<u64>),
}

/// One row per record, in batch order, shaped by [`annotation_schema`].
pub fn to_record_batch(batch: &DocumentBatch) -> Result<RecordBatch, StoreError> {
    let schema = Arc::new(annotation_schema());
    let rows: Vec<[Cell; VALUE_COLUMNS]> = batch.entries.iter().map(cells).collect();

    let ids = UInt64Array::from_iter_values(batch.entries.iter().map(|e| e.record.id()));
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(COLUMNS.len());
    columns.push(Arc::new(ids));
    for (col, field) in schema.fields().iter().skip(1).enumerate() {
        columns.push(column(&rows, col, field.data_type()));
    }

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn column(rows: &[[Cell; VALUE_COLUMNS]], col: usize, data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Float64 => Arc::new(
            rows.iter()
                .map(|row| match &row[col] {
                    Cell::Float(v) => *v,
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        DataType::UInt64 => Arc::new(
            rows.iter()
                .map(|row| match &row[col] {
                    Cell::Count(v) => *v,
                    _ => None,
                })
                .collect::<UInt64Array>(),
        ),
        _ => Arc::new(
            rows.iter()
                .map(|row| match &row[col] {
                    Cell::Text(v) => v.as_deref(),
                    _ => None,
                })
                .collect::<StringArray>(),
        ),
    }
}

/// Value cells in `COLUMNS[1..]` order.
fn cells(entry: &BatchEntry) -> [Cell; VALUE_COLUMNS] {
    let r = entry.record.resolved();
    let s = &r.study;
    let failed: Vec<&str> = entry
        .report
        .failed_checks()
        .iter()
        .map(|c| c.as_str())
        .collect();
    [
        text(r.pmid.as_deref()),
        text(r.gene.as_deref()),
        text(r.variant.as_ref().map(|v| v.value.as_str())),
        text(r.variant.as_ref().map(|v| v.rule)),
        text(r.alleles.as_deref()),
        Cell::Text(joined(&r.drugs)),
        text(r.drug_operator.map(|o| o.as_str())),
        text(r.phenotype_category.map(|c| c.as_str())),
        text(Some(r.significance.as_str())),
        text(Some(r.association.as_str())),
        text(r.direction.map(|d| d.as_str())),
        text(r.pd_pk_term.as_deref()),
        text(r.specialty_population.as_deref()),
        Cell::Text(joined(&r.diseases)),
        text(r.comparison.as_ref().map(|c| c.value.as_str())),
        text(Some(&*s.biogeography.label())),
        text(Some(s.biogeography.status())),
        text(s.characteristics.as_deref()),
        text(Some(s.characteristics_type.value.as_str())),
        text(s.p_value.as_deref()),
        text(s.ratio_stat_type.as_deref()),
        Cell::Float(s.ratio_stat),
        Cell::Float(s.ci_start),
        Cell::Float(s.ci_stop),
        Cell::Float(s.frequency_in_cases),
        Cell::Float(s.frequency_in_controls),
        Cell::Count(s.study_cases),
        Cell::Count(s.study_controls),
        text(Some(entry.record.sentence())),
        text(Some(entry.verdict().as_str())),
        Cell::Text(joined(&failed)),
        text(r.excerpt_ref.as_deref()),
    ]
}

fn text(value: Option<&str>) -> Cell {
    Cell::Text(value.map(str::to_string))
}

fn joined<S: AsRef<str>>(items: &[S]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<&str>>()
            .join(", "),
    )
}

/// Verdict totals read back from report tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub rows: usize,
    pub passed: usize,
    pub soft_failed: usize,
    pub hard_failed: usize,
}

/// Count rows per verdict across report batches.
pub fn report_totals(batches: &[RecordBatch]) -> Result<ReportTotals, StoreError> {
    let mut totals = ReportTotals::default();
    for batch in batches {
        let col = batch
            .column_by_name("verdict")
            .ok_or(StoreError::MissingColumn("verdict"))?;
        for row in 0..batch.num_rows() {
            totals.rows += 1;
            match get_str(col.as_ref(), row) {
                Some(v) if v == Verdict::Pass.as_str() => totals.passed += 1,
                Some(v) if v == Verdict::SoftFail.as_str() => totals.soft_failed += 1,
                Some(v) if v == Verdict::HardFail.as_str() => totals.hard_failed += 1,
                _ => {}
            }
        }
    }
    Ok(totals)
}

// ── Arrow extraction helpers ──

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_str(col: &dyn Array, row: usize) -> Option<&str> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row))
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row))
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pgxanno_core::{CandidateGroup, CandidateKind, CandidateValue, DocumentInput, Vocabulary};
    use pgxanno_engine::{BatchCoordinator, EngineConfig};

    fn sample_batch() -> DocumentBatch {
        let complete = CandidateGroup {
            pmid: Some("39000001".into()),
            excerpt_ref: Some("abstract".into()),
            candidates: [
                (CandidateKind::Gene, "SLCO1B1"),
                (CandidateKind::RsId, "rs4149056"),
                (CandidateKind::Genotype, "CC+CT"),
                (CandidateKind::ComparisonGenotype, "TT"),
                (CandidateKind::Drug, "simvastatin acid"),
                (CandidateKind::Direction, "increased"),
                (CandidateKind::PdPkTerm, "concentrations of"),
            ]
            .into_iter()
            .map(|(k, v)| CandidateValue::new(k, v))
            .collect(),
        };
        let broken = CandidateGroup {
            pmid: Some("39000001".into()),
            excerpt_ref: None,
            candidates: vec![CandidateValue::new(CandidateKind::Drug, "warfarin")],
        };
        BatchCoordinator::new(Arc::new(Vocabulary::builtin()), EngineConfig::default()).process(
            &DocumentInput {
                groups: vec![complete, broken],
            },
        )
    }

    #[test]
    fn one_row_per_record() {
        let rb = to_record_batch(&sample_batch()).unwrap();
        assert_eq!(rb.num_rows(), 2);
        assert_eq!(rb.num_columns(), COLUMNS.len());
        assert_eq!(rb.schema().as_ref(), &annotation_schema());
    }

    #[test]
    fn missing_fields_are_null() {
        let rb = to_record_batch(&sample_batch()).unwrap();
        let gene = rb.column_by_name("gene").unwrap();
        assert_eq!(get_str(gene.as_ref(), 0), Some("SLCO1B1"));
        assert!(gene.is_null(1));

        let failed = rb.column_by_name("failed_checks").unwrap();
        assert!(failed.is_null(0));
        assert!(get_str(failed.as_ref(), 1).unwrap().contains("required_fields"));
    }

    fn single(candidates: &[(CandidateKind, &str)]) -> RecordBatch {
        let group = CandidateGroup {
            pmid: Some("39000002".into()),
            excerpt_ref: None,
            candidates: candidates
                .iter()
                .map(|(k, v)| CandidateValue::new(*k, *v))
                .collect(),
        };
        let batch = BatchCoordinator::new(Arc::new(Vocabulary::builtin()), EngineConfig::default())
            .process(&DocumentInput {
                groups: vec![group],
            });
        to_record_batch(&batch).unwrap()
    }

    #[test]
    fn biogeographic_status_marks_unmapped_terms() {
        let rb = single(&[
            (CandidateKind::PopulationTerm, "Caucasian"),
            (CandidateKind::PopulationTerm, "Atlantean"),
        ]);
        let group = rb.column_by_name("biogeographic_group").unwrap();
        let status = rb.column_by_name("biogeographic_status").unwrap();
        assert_eq!(get_str(group.as_ref(), 0), Some("European, Atlantean"));
        assert_eq!(get_str(status.as_ref(), 0), Some("unmapped"));

        let rb = single(&[(CandidateKind::PopulationTerm, "Japanese")]);
        let group = rb.column_by_name("biogeographic_group").unwrap();
        let status = rb.column_by_name("biogeographic_status").unwrap();
        assert_eq!(get_str(group.as_ref(), 0), Some("East Asian"));
        assert_eq!(get_str(status.as_ref(), 0), Some("group"));
    }

    #[test]
    fn study_statistics_columns() {
        let rb = single(&[
            (CandidateKind::RatioStatType, "OR"),
            (CandidateKind::RatioStat, "2.1"),
            (CandidateKind::CiStart, "1.4"),
            (CandidateKind::CiStop, "3.2"),
            (CandidateKind::FrequencyInCases, "0.42"),
            (CandidateKind::StudyCases, "120"),
        ]);
        let float = |name: &str| {
            rb.column_by_name(name)
                .unwrap()
                .as_any()
                .downcast_ref::<Float64Array>()
                .unwrap()
                .clone()
        };
        assert_eq!(float("ratio_stat").value(0), 2.1);
        assert_eq!(float("ci_start").value(0), 1.4);
        assert_eq!(float("ci_stop").value(0), 3.2);
        assert_eq!(float("frequency_in_cases").value(0), 0.42);
        assert!(float("frequency_in_controls").is_null(0));

        let cases = rb.column_by_name("study_cases").unwrap();
        let cases = cases.as_any().downcast_ref::<UInt64Array>().unwrap();
        assert_eq!(cases.value(0), 120);
        assert!(rb.column_by_name("study_controls").unwrap().is_null(0));

        let stat_type = rb.column_by_name("ratio_stat_type").unwrap();
        assert_eq!(get_str(stat_type.as_ref(), 0), Some("OR"));
    }

    #[test]
    fn totals_from_verdict_column() {
        let rb = to_record_batch(&sample_batch()).unwrap();
        let totals = report_totals(&[rb]).unwrap();
        assert_eq!(
            totals,
            ReportTotals {
                rows: 2,
                passed: 1,
                soft_failed: 0,
                hard_failed: 1,
            }
        );
    }

    #[test]
    fn totals_need_verdict_column() {
        let rb = to_record_batch(&sample_batch()).unwrap();
        let without = rb.project(&[0, 1, 2]).unwrap();
        assert!(matches!(
            report_totals(&[without]),
            Err(StoreError::MissingColumn("verdict"))
        ));
    }
}
