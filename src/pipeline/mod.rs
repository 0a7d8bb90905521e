// Data processing pipeline: ingestion, processing, and extract files

pub mod export;
pub mod ingestion;
pub mod pipeline;
pub mod processing;

// Re-export key types and functions from each stage
pub use pipeline::{NormalizationOutput, PipelineStats, RecordPipeline};
pub use processing::parser;
