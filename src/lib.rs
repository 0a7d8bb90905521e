pub mod config;
pub mod constants;
pub mod error;
pub mod importer;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use error::{Result, SeederError};
pub use pipeline::processing::collector::{ReferenceSetCollector, ReferenceSets};
pub use pipeline::processing::normalize::{normalize_text, DegreeStandardizer};
pub use pipeline::processing::parser::QualificationParser;
pub use pipeline::{NormalizationOutput, PipelineStats, RecordPipeline};
pub use types::{DiscardReason, PractitionerRecord, QualificationTuple, RawRow, SegmentOutcome};
