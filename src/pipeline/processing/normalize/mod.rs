//! Text canonicalization shared by every reference value.

pub mod degree;

pub use degree::{DegreeStandardizer, SynonymGroup};

/// Markup leftovers the register leaks into its text, all meaning "and".
const AMPERSAND_ARTIFACTS: [&str; 3] = ["&amp;", "&amp", "\\/"];

/// Decode entity artifacts, collapse whitespace runs and trim.
///
/// Case is left alone; callers upper-case where a canonical key is needed.
/// `&amp;` is replaced before `&amp` so the semicolon does not survive.
///
/// ```
/// use kmpdc_seeder::pipeline::processing::normalize::normalize_text;
/// assert_eq!(normalize_text("Obs&ampGynae"), "Obs & Gynae");
/// ```
pub fn normalize_text(text: &str) -> String {
    let mut decoded = text.to_string();
    for artifact in AMPERSAND_ARTIFACTS {
        if decoded.contains(artifact) {
            decoded = decoded.replace(artifact, " & ");
        }
    }
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `normalize_text` followed by upper-casing: the deduplication key for degrees,
/// institutions and specialities.
pub fn canonical_upper(text: &str) -> String {
    normalize_text(text).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_amp_artifacts() {
        assert_eq!(normalize_text("Obs&ampGynae"), "Obs & Gynae");
        assert_eq!(normalize_text("Obs&amp;Gynae"), "Obs & Gynae");
        assert_eq!(normalize_text("Obs &amp Gynae"), "Obs & Gynae");
    }

    #[test]
    fn test_decodes_escaped_slash() {
        assert_eq!(normalize_text("Obs\\/Gyn"), "Obs & Gyn");
    }

    #[test]
    fn test_collapses_and_trims_whitespace() {
        assert_eq!(normalize_text("  Kenyatta \t  University\n"), "Kenyatta University");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_does_not_change_case() {
        assert_eq!(normalize_text("Gen.Surg"), "Gen.Surg");
        assert_eq!(canonical_upper("Gen.Surg"), "GEN.SURG");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Obs&ampGynae",
            "&amp;&amp;&amp",
            "&&ampamp",
            "\\\\//",
            "a\\/b &amp; c",
            "  spaced   out  ",
            "M.Med(Gen.Surg)",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
