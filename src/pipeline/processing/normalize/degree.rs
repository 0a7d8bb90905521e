use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SeederError};

/// Synonym table shipped with the crate.
const BUNDLED_SYNONYMS: &str = include_str!("../../../../registry/degree_synonyms.json");

/// One canonical degree code and every spelling that should collapse onto it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymGroup {
    pub canonical: String,
    pub variants: Vec<String>,
}

/// Exact-match lookup from a known degree spelling to its canonical code.
#[derive(Debug, Clone)]
pub struct DegreeStandardizer {
    synonyms: HashMap<String, String>,
}

impl DegreeStandardizer {
    /// The table bundled in `registry/degree_synonyms.json`.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_SYNONYMS)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SeederError::Config(format!(
                "Failed to read degree synonyms {}: {}",
                path.display(),
                e
            ))
        })?;
        let standardizer = Self::from_json_str(&content)?;
        debug!(
            "Loaded {} degree synonyms from {}",
            standardizer.len(),
            path.display()
        );
        Ok(standardizer)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let groups: Vec<SynonymGroup> = serde_json::from_str(content)?;
        Self::from_groups(groups)
    }

    /// Build from groups. A variant claimed by two different canonical codes is rejected.
    pub fn from_groups(groups: Vec<SynonymGroup>) -> Result<Self> {
        let mut synonyms = HashMap::new();
        for group in groups {
            for variant in group.variants {
                if let Some(existing) = synonyms.get(&variant) {
                    if existing != &group.canonical {
                        return Err(SeederError::Config(format!(
                            "Degree variant '{}' maps to both '{}' and '{}'",
                            variant, existing, group.canonical
                        )));
                    }
                }
                synonyms.insert(variant, group.canonical.clone());
            }
        }
        Ok(Self { synonyms })
    }

    /// Map `degree` (already upper-cased and trimmed) to its canonical code, or return
    /// it unchanged when it is not a known variant.
    pub fn standardize(&self, degree: &str) -> String {
        self.synonyms
            .get(degree)
            .cloned()
            .unwrap_or_else(|| degree.to_string())
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}
