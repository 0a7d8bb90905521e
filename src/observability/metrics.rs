//! Counters for the extract, sync and import phases, recorded through the `metrics`
//! facade. Without an installed recorder they are no-ops.

use std::fmt;

/// Every metric name the seeder records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Source metrics
    SourceRowsFetched,
    SourceRequestRetries,

    // Pipeline metrics
    PipelineRows,
    PipelineQualifications,
    PipelineFragmentsDiscarded,
    PipelineRowsWithoutQualifications,

    // Import metrics
    ImportPractitioners,
    ImportPractitionersSkipped,
    ImportQualificationLinks,
    ImportUnknownFallbacks,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourceRowsFetched => "kmpdc_source_rows_fetched_total",
            MetricName::SourceRequestRetries => "kmpdc_source_request_retries_total",
            MetricName::PipelineRows => "kmpdc_pipeline_rows_total",
            MetricName::PipelineQualifications => "kmpdc_pipeline_qualifications_total",
            MetricName::PipelineFragmentsDiscarded => "kmpdc_pipeline_fragments_discarded_total",
            MetricName::PipelineRowsWithoutQualifications => {
                "kmpdc_pipeline_rows_without_qualifications_total"
            }
            MetricName::ImportPractitioners => "kmpdc_import_practitioners_total",
            MetricName::ImportPractitionersSkipped => "kmpdc_import_practitioners_skipped_total",
            MetricName::ImportQualificationLinks => "kmpdc_import_qualification_links_total",
            MetricName::ImportUnknownFallbacks => "kmpdc_import_unknown_fallbacks_total",
        }
    }
}

pub mod source {
    use super::MetricName;

    pub fn rows_fetched(count: usize) {
        ::metrics::counter!(MetricName::SourceRowsFetched.as_str()).increment(count as u64);
    }

    pub fn request_retry() {
        ::metrics::counter!(MetricName::SourceRequestRetries.as_str()).increment(1);
    }
}

pub mod pipeline {
    use super::MetricName;
    use crate::types::DiscardReason;

    pub fn row_processed() {
        ::metrics::counter!(MetricName::PipelineRows.as_str()).increment(1);
    }

    pub fn qualifications_extracted(count: usize) {
        ::metrics::counter!(MetricName::PipelineQualifications.as_str()).increment(count as u64);
    }

    pub fn fragment_discarded(reason: DiscardReason) {
        ::metrics::counter!(
            MetricName::PipelineFragmentsDiscarded.as_str(),
            "reason" => reason.as_str()
        )
        .increment(1);
    }

    pub fn row_without_qualifications() {
        ::metrics::counter!(MetricName::PipelineRowsWithoutQualifications.as_str()).increment(1);
    }
}

pub mod import {
    use super::MetricName;

    pub fn practitioner_imported() {
        ::metrics::counter!(MetricName::ImportPractitioners.as_str()).increment(1);
    }

    pub fn practitioner_skipped() {
        ::metrics::counter!(MetricName::ImportPractitionersSkipped.as_str()).increment(1);
    }

    pub fn qualification_linked() {
        ::metrics::counter!(MetricName::ImportQualificationLinks.as_str()).increment(1);
    }

    pub fn unknown_fallback(kind: &'static str) {
        ::metrics::counter!(MetricName::ImportUnknownFallbacks.as_str(), "kind" => kind)
            .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed_and_unique() {
        let names = [
            MetricName::SourceRowsFetched,
            MetricName::SourceRequestRetries,
            MetricName::PipelineRows,
            MetricName::PipelineQualifications,
            MetricName::PipelineFragmentsDiscarded,
            MetricName::PipelineRowsWithoutQualifications,
            MetricName::ImportPractitioners,
            MetricName::ImportPractitionersSkipped,
            MetricName::ImportQualificationLinks,
            MetricName::ImportUnknownFallbacks,
        ];
        let unique: std::collections::HashSet<_> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| n.to_string().starts_with("kmpdc_")));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        pipeline::row_processed();
        pipeline::fragment_discarded(crate::types::DiscardReason::NestedGroup);
        import::unknown_fallback("degree");
    }
}
