use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use super::RowSource;
use crate::constants::CSV_HEADERS;
use crate::error::{Result, SeederError};
use crate::types::RawRow;

/// Reads register rows from a headered CSV file.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Source over the newest CSV in `dir`. Sync writes timestamp-prefixed names, so
    /// the lexicographically last file is the most recent scrape.
    pub fn latest_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(SeederError::Config(format!(
                "CSV storage path not found: {}",
                dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("csv"))
            .collect();
        files.sort();

        files.pop().map(Self::new).ok_or_else(|| {
            SeederError::Config(format!(
                "No CSV files found in {}. Run `kmpdc_seeder sync` first.",
                dir.display()
            ))
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for CsvRowSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn rows(&self) -> Result<Vec<RawRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let rows = reader
            .deserialize::<RawRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

/// `{dir}/{YYYY_MM_DD_HHMMSS}_{filename}`
pub fn timestamped_csv_path(dir: &Path, filename: &str, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_{}", now.format("%Y_%m_%d_%H%M%S"), filename))
}

/// Write rows with the register header line, creating parent directories.
pub fn write_rows_csv(path: &Path, rows: &[RawRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_reads_rows_with_register_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("register.csv");
        fs::write(
            &path,
            "Fullname,Reg_No,Address,Qualifications,Discipline,Speciality,Sub_Speciality,Status,View_URL\n\
             Dr Jane Doe,1234,Nairobi,\"MBChB(Nairobi) 2005, M.Med(Gen.Surg)(Nairobi) 2010\",Medicine,Surgery,,Active,https://kmpdc.go.ke/Registers/x\n",
        )
        .unwrap();

        let rows = CsvRowSource::new(&path).rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, "Dr Jane Doe");
        assert_eq!(
            rows[0].qualifications,
            "MBChB(Nairobi) 2005, M.Med(Gen.Surg)(Nairobi) 2010"
        );
        assert_eq!(rows[0].sub_speciality, "");
    }

    #[test]
    fn test_missing_columns_default_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        fs::write(&path, "Fullname,Reg_No\nDr A,1\n").unwrap();

        let rows = CsvRowSource::new(&path).rows().unwrap();
        assert_eq!(rows[0].registration_number, "1");
        assert_eq!(rows[0].qualifications, "");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let rows = vec![RawRow {
            full_name: "Dr B".to_string(),
            registration_number: "99".to_string(),
            qualifications: "BDS(Moi), MDS(Nairobi)".to_string(),
            ..RawRow::default()
        }];

        write_rows_csv(&path, &rows).unwrap();
        assert_eq!(CsvRowSource::new(&path).rows().unwrap(), rows);
    }

    #[test]
    fn test_write_empty_keeps_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_rows_csv(&path, &[]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Fullname,Reg_No,Address"));
    }

    #[test]
    fn test_latest_in_picks_newest_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2024_01_01_000000_a.csv"), "Fullname\n").unwrap();
        fs::write(dir.path().join("2025_06_01_000000_a.csv"), "Fullname\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore").unwrap();

        let source = CsvRowSource::latest_in(dir.path()).unwrap();
        assert_eq!(
            source.path().file_name().unwrap().to_str().unwrap(),
            "2025_06_01_000000_a.csv"
        );
    }

    #[test]
    fn test_latest_in_errors_without_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            CsvRowSource::latest_in(dir.path()),
            Err(SeederError::Config(_))
        ));
        assert!(matches!(
            CsvRowSource::latest_in(dir.path().join("missing")),
            Err(SeederError::Config(_))
        ));
    }

    #[test]
    fn test_timestamped_path() {
        let now = Local.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let path = timestamped_csv_path(Path::new("csv"), "kmpdc.csv", now);
        assert_eq!(path, PathBuf::from("csv/2025_03_04_050607_kmpdc.csv"));
    }
}
