//! Output boundary: annotation reports as Arrow tables, Parquet files and JSON lines.

mod error;
pub use error::StoreError;

mod jsonl;
pub use jsonl::write_json_lines;

mod parquet_file;
pub use parquet_file::{read_parquet, write_parquet};

mod table;
pub use table::{ReportTotals, report_totals, to_record_batch};
