// Pipeline ingestion: register crawling and CSV row sources

pub mod crawler;
pub mod csv_source;

use crate::error::Result;
use crate::types::RawRow;

pub use crawler::RegisterCrawler;
pub use csv_source::{timestamped_csv_path, write_rows_csv, CsvRowSource};

/// Anything that can hand the pipeline a complete, ordered set of register rows.
pub trait RowSource {
    fn rows(&self) -> Result<Vec<RawRow>>;
}
