use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::PROGRESS_EVERY;
use crate::observability::metrics;
use crate::pipeline::processing::collector::{ReferenceSetCollector, ReferenceSets};
use crate::pipeline::processing::parser::QualificationParser;
use crate::types::{PractitionerRecord, RawRow};

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub rows: usize,
    pub qualifications: usize,
    /// Non-empty qualification fragments the grammar rejected
    pub discarded_fragments: usize,
    pub rows_without_qualifications: usize,
    pub rows_missing_registration: usize,
}

/// Everything one run produces: practitioners in row order plus reference sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationOutput {
    pub practitioners: Vec<PractitionerRecord>,
    pub reference_sets: ReferenceSets,
    pub stats: PipelineStats,
}

/// Turns raw register rows into practitioner records and reference sets.
///
/// Holds no per-run state; every `normalize` call starts from empty sets.
pub struct RecordPipeline {
    parser: QualificationParser,
}

impl RecordPipeline {
    pub fn new(parser: QualificationParser) -> Self {
        Self { parser }
    }

    /// Normalize `rows` with a fresh collector.
    pub fn normalize<I>(&self, rows: I) -> NormalizationOutput
    where
        I: IntoIterator<Item = RawRow>,
    {
        self.normalize_into(rows, ReferenceSetCollector::new())
    }

    /// Normalize `rows`, accumulating reference values into the caller's `collector`.
    pub fn normalize_into<I>(&self, rows: I, mut collector: ReferenceSetCollector) -> NormalizationOutput
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut practitioners = Vec::new();
        let mut stats = PipelineStats::default();

        for row in rows {
            let record = self.normalize_row(row, &mut collector, &mut stats);
            practitioners.push(record);

            if stats.rows % PROGRESS_EVERY == 0 {
                info!("Processed {} practitioners...", stats.rows);
            }
        }

        info!(
            rows = stats.rows,
            qualifications = stats.qualifications,
            discarded_fragments = stats.discarded_fragments,
            "Extraction complete"
        );

        NormalizationOutput {
            practitioners,
            reference_sets: collector.finalize(),
            stats,
        }
    }

    fn normalize_row(
        &self,
        row: RawRow,
        collector: &mut ReferenceSetCollector,
        stats: &mut PipelineStats,
    ) -> PractitionerRecord {
        stats.rows += 1;
        metrics::pipeline::row_processed();

        let parsed = self.parser.parse_field(&row.qualifications);
        for (fragment, reason) in &parsed.discarded {
            debug!(
                registration_number = %row.registration_number,
                fragment = %fragment,
                reason = reason.as_str(),
                "Discarded qualification fragment"
            );
            metrics::pipeline::fragment_discarded(*reason);
        }
        stats.discarded_fragments += parsed.discarded.len();
        stats.qualifications += parsed.tuples.len();
        metrics::pipeline::qualifications_extracted(parsed.tuples.len());

        if parsed.tuples.is_empty() {
            stats.rows_without_qualifications += 1;
            metrics::pipeline::row_without_qualifications();
        }
        if row.registration_number.trim().is_empty() {
            stats.rows_missing_registration += 1;
        }

        collector.observe_speciality(&row.speciality);
        collector.observe_sub_speciality(&row.speciality, &row.sub_speciality);
        collector.observe_status(&row.status);
        collector.observe_address(&row.address);
        for qualification in &parsed.tuples {
            collector.observe_degree(&qualification.degree);
            collector.observe_institution(&qualification.institution);
        }

        PractitionerRecord {
            full_name: row.full_name,
            registration_number: row.registration_number,
            address: row.address,
            discipline: row.discipline,
            speciality: row.speciality,
            sub_speciality: row.sub_speciality,
            status: row.status,
            qualifications: parsed.tuples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::DegreeStandardizer;
    use crate::types::QualificationTuple;

    fn pipeline() -> RecordPipeline {
        RecordPipeline::new(QualificationParser::new(DegreeStandardizer::bundled().unwrap()))
    }

    fn row(reg_no: &str, qualifications: &str) -> RawRow {
        RawRow {
            full_name: format!("Dr Practitioner {}", reg_no),
            registration_number: reg_no.to_string(),
            address: "P.O. Box 1, Nairobi".to_string(),
            qualifications: qualifications.to_string(),
            discipline: "Medicine".to_string(),
            speciality: "Surgery".to_string(),
            sub_speciality: "Urology".to_string(),
            status: "Active".to_string(),
            view_url: String::new(),
        }
    }

    #[test]
    fn test_row_becomes_record_with_qualifications() {
        let output = pipeline().normalize(vec![row(
            "A100",
            "MBChB(Nairobi) 2005, M.Med(Gen.Surg)(Nairobi) 2010",
        )]);

        assert_eq!(output.practitioners.len(), 1);
        let record = &output.practitioners[0];
        assert_eq!(record.registration_number, "A100");
        assert_eq!(
            record.qualifications,
            vec![
                QualificationTuple {
                    year: Some(2005),
                    institution: "NAIROBI".to_string(),
                    degree: "MBCHB".to_string(),
                    speciality: String::new(),
                },
                QualificationTuple {
                    year: Some(2010),
                    institution: "NAIROBI".to_string(),
                    degree: "M.MED".to_string(),
                    speciality: "GEN.SURG".to_string(),
                },
            ]
        );
        assert_eq!(output.reference_sets.degrees, vec!["M.MED", "MBCHB"]);
        assert_eq!(output.reference_sets.institutions, vec!["NAIROBI"]);
        assert_eq!(output.reference_sets.specialities, vec!["Surgery"]);
        assert_eq!(output.reference_sets.statuses, vec!["Active"]);
        assert_eq!(output.reference_sets.addresses, vec!["P.O. Box 1, Nairobi"]);
        assert_eq!(
            output.reference_sets.sub_specialities.get("Surgery"),
            Some(&vec!["Urology".to_string()])
        );
    }

    #[test]
    fn test_scalar_fields_pass_through_verbatim() {
        let mut raw = row("  B200 ", "");
        raw.full_name = "  Dr  Spaced ".to_string();
        let output = pipeline().normalize(vec![raw]);

        let record = &output.practitioners[0];
        assert_eq!(record.full_name, "  Dr  Spaced ");
        assert_eq!(record.registration_number, "  B200 ");
        assert!(record.qualifications.is_empty());
    }

    #[test]
    fn test_empty_fields_are_not_collected() {
        let raw = RawRow {
            registration_number: "C300".to_string(),
            ..RawRow::default()
        };
        let output = pipeline().normalize(vec![raw]);

        assert_eq!(output.practitioners.len(), 1);
        assert_eq!(output.reference_sets, ReferenceSets::default());
        assert_eq!(output.stats.rows_without_qualifications, 1);
    }

    #[test]
    fn test_stats_count_discards() {
        let output = pipeline().normalize(vec![
            row("D1", "A((B)C)(D), MBChB(Moi) 2001, BDS"),
            row("", "MBChB(Nairobi)"),
        ]);
        assert_eq!(
            output.stats,
            PipelineStats {
                rows: 2,
                qualifications: 2,
                discarded_fragments: 2,
                rows_without_qualifications: 0,
                rows_missing_registration: 1,
            }
        );
    }

    #[test]
    fn test_runs_are_independent_and_deterministic() {
        let pipeline = pipeline();
        let rows = vec![
            row("E1", "MBChB(Nairobi) 2005"),
            row("E2", "BDS(Moi) 2001, MMed(Paed)(Makerere)"),
            row("E3", "MBChB(Nairobi) 2007"),
        ];
        let first = pipeline.normalize(rows.clone());
        let second = pipeline.normalize(rows);
        assert_eq!(first, second);
        assert_eq!(first.reference_sets.institutions, vec!["MAKERERE", "MOI", "NAIROBI"]);
    }

    #[test]
    fn test_caller_owned_collector_is_used() {
        let mut collector = ReferenceSetCollector::new();
        collector.observe_status("Retired");
        let output = pipeline().normalize_into(vec![row("F1", "")], collector);
        assert_eq!(output.reference_sets.statuses, vec!["Active", "Retired"]);
    }
}
