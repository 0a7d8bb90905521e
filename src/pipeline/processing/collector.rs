use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::UNKNOWN;
use crate::pipeline::processing::normalize::normalize_text;

/// Finalized, sorted reference collections handed to persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSets {
    pub degrees: Vec<String>,
    pub institutions: Vec<String>,
    pub specialities: Vec<String>,
    /// Parent speciality name -> its sub-speciality names
    pub sub_specialities: BTreeMap<String, Vec<String>>,
    pub addresses: Vec<String>,
    pub statuses: Vec<String>,
}

/// Accumulates unique reference values across all rows of one run.
///
/// Every `observe_*` normalizes its input and ignores it when blank.
#[derive(Debug, Default)]
pub struct ReferenceSetCollector {
    degrees: BTreeSet<String>,
    institutions: BTreeSet<String>,
    specialities: BTreeSet<String>,
    sub_specialities: BTreeMap<String, BTreeSet<String>>,
    addresses: BTreeSet<String>,
    statuses: BTreeSet<String>,
}

impl ReferenceSetCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_degree(&mut self, degree: &str) {
        insert_normalized(&mut self.degrees, degree);
    }

    pub fn observe_institution(&mut self, institution: &str) {
        insert_normalized(&mut self.institutions, institution);
    }

    pub fn observe_speciality(&mut self, speciality: &str) {
        insert_normalized(&mut self.specialities, speciality);
    }

    /// File `name` under `parent_speciality`, or under `UNKNOWN` when the parent is blank.
    pub fn observe_sub_speciality(&mut self, parent_speciality: &str, name: &str) {
        let name = normalize_text(name);
        if name.is_empty() {
            return;
        }
        let parent = match normalize_text(parent_speciality) {
            p if p.is_empty() => UNKNOWN.to_string(),
            p => p,
        };
        self.sub_specialities.entry(parent).or_default().insert(name);
    }

    pub fn observe_address(&mut self, address: &str) {
        insert_normalized(&mut self.addresses, address);
    }

    pub fn observe_status(&mut self, status: &str) {
        insert_normalized(&mut self.statuses, status);
    }

    /// Materialize every set in ordinal string order.
    pub fn finalize(self) -> ReferenceSets {
        ReferenceSets {
            degrees: self.degrees.into_iter().collect(),
            institutions: self.institutions.into_iter().collect(),
            specialities: self.specialities.into_iter().collect(),
            sub_specialities: self
                .sub_specialities
                .into_iter()
                .map(|(parent, names)| (parent, names.into_iter().collect()))
                .collect(),
            addresses: self.addresses.into_iter().collect(),
            statuses: self.statuses.into_iter().collect(),
        }
    }
}

fn insert_normalized(set: &mut BTreeSet<String>, value: &str) {
    let value = normalize_text(value);
    if !value.is_empty() {
        set.insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_ignored() {
        let mut collector = ReferenceSetCollector::new();
        collector.observe_degree("");
        collector.observe_institution("   ");
        collector.observe_speciality("\t");
        collector.observe_address("");
        collector.observe_status(" ");
        collector.observe_sub_speciality("Surgery", "  ");

        assert_eq!(collector.finalize(), ReferenceSets::default());
    }

    #[test]
    fn test_deduplicated_and_sorted() {
        let mut collector = ReferenceSetCollector::new();
        for degree in ["MBCHB", "M.MED", "BDS", "MBCHB", "M.MED"] {
            collector.observe_degree(degree);
        }
        collector.observe_status("Active");
        collector.observe_status("  Active ");
        collector.observe_status("Inactive");

        let sets = collector.finalize();
        assert_eq!(sets.degrees, vec!["BDS", "M.MED", "MBCHB"]);
        assert_eq!(sets.statuses, vec!["Active", "Inactive"]);
    }

    #[test]
    fn test_ordinal_ordering_is_case_sensitive() {
        let mut collector = ReferenceSetCollector::new();
        collector.observe_address("nairobi");
        collector.observe_address("Nairobi");
        collector.observe_address("Mombasa");

        // Upper case sorts before lower case in ordinal order
        assert_eq!(collector.finalize().addresses, vec!["Mombasa", "Nairobi", "nairobi"]);
    }

    #[test]
    fn test_sub_specialities_keyed_by_parent() {
        let mut collector = ReferenceSetCollector::new();
        collector.observe_sub_speciality("Surgery", "Urology");
        collector.observe_sub_speciality("Surgery", "Neurosurgery");
        collector.observe_sub_speciality("Surgery", "Urology");
        collector.observe_sub_speciality("Internal Medicine", "Cardiology");
        collector.observe_sub_speciality("", "Orphan");

        let sets = collector.finalize();
        let expected: BTreeMap<String, Vec<String>> = [
            ("Internal Medicine".to_string(), vec!["Cardiology".to_string()]),
            (
                "Surgery".to_string(),
                vec!["Neurosurgery".to_string(), "Urology".to_string()],
            ),
            (UNKNOWN.to_string(), vec!["Orphan".to_string()]),
        ]
        .into_iter()
        .collect();
        assert_eq!(sets.sub_specialities, expected);
    }

    #[test]
    fn test_values_are_entity_decoded() {
        let mut collector = ReferenceSetCollector::new();
        collector.observe_speciality("Obstetrics &amp; Gynaecology");
        collector.observe_speciality("Obstetrics & Gynaecology");
        assert_eq!(collector.finalize().specialities, vec!["Obstetrics & Gynaecology"]);
    }
}
