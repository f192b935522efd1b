use std::io::Write;

use pgxanno_core::{BatchEntry, DocumentBatch, Verdict};
use serde::Serialize;

use crate::StoreError;

#[derive(Serialize)]
struct Line<'a> {
    verdict: Verdict,
    #[serde(flatten)]
    entry: &'a BatchEntry,
}

/// Write one JSON object per record: `{"verdict", "record", "report"}`.
///
/// Returns the number of lines written.
pub fn write_json_lines<W: Write>(
    mut writer: W,
    batch: &DocumentBatch,
) -> Result<usize, StoreError> {
    for entry in &batch.entries {
        let line = Line {
            verdict: entry.report.verdict(),
            entry,
        };
        serde_json::to_writer(&mut writer, &line)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(batch.entries.len())
}
