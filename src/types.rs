use serde::{Deserialize, Serialize};

/// One row of the practitioners register exactly as scraped. Fields are untrimmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRow {
    #[serde(rename = "Fullname")]
    pub full_name: String,
    #[serde(rename = "Reg_No")]
    pub registration_number: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Qualifications")]
    pub qualifications: String,
    #[serde(rename = "Discipline")]
    pub discipline: String,
    #[serde(rename = "Speciality")]
    pub speciality: String,
    #[serde(rename = "Sub_Speciality")]
    pub sub_speciality: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "View_URL")]
    pub view_url: String,
}

/// A single degree earned, extracted from one qualification fragment.
///
/// `degree`, `institution` and `speciality` are upper-cased canonical strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualificationTuple {
    pub year: Option<u32>,
    pub institution: String,
    pub degree: String,
    pub speciality: String,
}

/// Why a qualification fragment produced no tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Nothing left after stripping years and separators
    Empty,
    /// No `(...)` group closes the fragment
    NoTrailingGroup,
    /// The degree part ends in a group that itself holds parentheses
    NestedGroup,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::Empty => "empty",
            DiscardReason::NoTrailingGroup => "no_trailing_group",
            DiscardReason::NestedGroup => "nested_group",
        }
    }
}

/// Result of parsing one fragment. A discarded fragment is never a tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    Tuple(QualificationTuple),
    Discarded(DiscardReason),
}

/// Normalized practitioner, one per raw row. `registration_number` is the join key
/// used downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PractitionerRecord {
    pub full_name: String,
    pub registration_number: String,
    pub address: String,
    pub discipline: String,
    pub speciality: String,
    pub sub_speciality: String,
    pub status: String,
    pub qualifications: Vec<QualificationTuple>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_deserializes_register_headers() {
        let json = r#"{
            "Fullname": "Dr Jane Doe",
            "Reg_No": "1234",
            "Qualifications": "MBChB(Nairobi) 2005",
            "Status": "Active"
        }"#;
        let row: RawRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.full_name, "Dr Jane Doe");
        assert_eq!(row.registration_number, "1234");
        assert_eq!(row.status, "Active");
        // Missing columns default to empty
        assert_eq!(row.address, "");
        assert_eq!(row.view_url, "");
    }
}
