use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::constants::{
    ADDRESSES_FILE, DEGREES_FILE, INSTITUTIONS_FILE, PRACTITIONERS_FILE, SPECIALITIES_FILE,
    STATUSES_FILE, SUB_SPECIALITIES_FILE,
};
use crate::error::Result;
use crate::pipeline::pipeline::NormalizationOutput;
use crate::pipeline::processing::collector::ReferenceSets;
use crate::types::PractitionerRecord;

/// The normalized data set as it travels between `extract` and `import`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractBundle {
    pub practitioners: Vec<PractitionerRecord>,
    pub reference_sets: ReferenceSets,
}

impl From<NormalizationOutput> for ExtractBundle {
    fn from(output: NormalizationOutput) -> Self {
        Self {
            practitioners: output.practitioners,
            reference_sets: output.reference_sets,
        }
    }
}

/// Write one pretty-printed JSON file per collection into `dir`.
pub fn write_extract(dir: &Path, bundle: &ExtractBundle) -> Result<()> {
    fs::create_dir_all(dir)?;
    let sets = &bundle.reference_sets;

    write_json(&dir.join(PRACTITIONERS_FILE), &bundle.practitioners)?;
    write_json(&dir.join(DEGREES_FILE), &sets.degrees)?;
    write_json(&dir.join(INSTITUTIONS_FILE), &sets.institutions)?;
    write_json(&dir.join(SPECIALITIES_FILE), &sets.specialities)?;
    write_json(&dir.join(SUB_SPECIALITIES_FILE), &sets.sub_specialities)?;
    write_json(&dir.join(ADDRESSES_FILE), &sets.addresses)?;
    write_json(&dir.join(STATUSES_FILE), &sets.statuses)?;

    info!("Data extracted successfully to: {}", dir.display());
    Ok(())
}

/// Read the files `write_extract` produces. Missing files read as empty.
pub fn read_extract(dir: &Path) -> Result<ExtractBundle> {
    Ok(ExtractBundle {
        practitioners: read_json_or_default(&dir.join(PRACTITIONERS_FILE))?,
        reference_sets: ReferenceSets {
            degrees: read_json_or_default(&dir.join(DEGREES_FILE))?,
            institutions: read_json_or_default(&dir.join(INSTITUTIONS_FILE))?,
            specialities: read_json_or_default(&dir.join(SPECIALITIES_FILE))?,
            sub_specialities: read_json_or_default(&dir.join(SUB_SPECIALITIES_FILE))?,
            addresses: read_json_or_default(&dir.join(ADDRESSES_FILE))?,
            statuses: read_json_or_default(&dir.join(STATUSES_FILE))?,
        },
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        warn!("Missing file: {}", path.display());
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
