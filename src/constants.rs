/// Column headers of the scraped register, in the order the register table shows them.
pub const FIELD_FULLNAME: &str = "Fullname";
pub const FIELD_REG_NO: &str = "Reg_No";
pub const FIELD_ADDRESS: &str = "Address";
pub const FIELD_QUALIFICATIONS: &str = "Qualifications";
pub const FIELD_DISCIPLINE: &str = "Discipline";
pub const FIELD_SPECIALITY: &str = "Speciality";
pub const FIELD_SUB_SPECIALITY: &str = "Sub_Speciality";
pub const FIELD_STATUS: &str = "Status";
pub const FIELD_VIEW_URL: &str = "View_URL";

pub const CSV_HEADERS: [&str; 9] = [
    FIELD_FULLNAME,
    FIELD_REG_NO,
    FIELD_ADDRESS,
    FIELD_QUALIFICATIONS,
    FIELD_DISCIPLINE,
    FIELD_SPECIALITY,
    FIELD_SUB_SPECIALITY,
    FIELD_STATUS,
    FIELD_VIEW_URL,
];

/// Placeholder entity name used when a reference value has nothing to resolve to.
pub const UNKNOWN: &str = "UNKNOWN";

/// Emit a progress line every this many rows.
pub const PROGRESS_EVERY: usize = 200;

// Register source defaults
pub const DEFAULT_SOURCE_URL: &str = "https://kmpdc.go.ke/Registers/practitioners.php";
pub const REGISTER_BASE_URL: &str = "https://kmpdc.go.ke/Registers/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; KmpdcSeeder/1.0)";
pub const DEFAULT_CSV_DIR: &str = "storage/kmpdc-data/csv";
pub const DEFAULT_CSV_FILENAME: &str = "kmpdc_practitioners.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "storage/kmpdc-data";

// Extract file names
pub const PRACTITIONERS_FILE: &str = "practitioners.json";
pub const DEGREES_FILE: &str = "degrees.json";
pub const INSTITUTIONS_FILE: &str = "institutions.json";
pub const SPECIALITIES_FILE: &str = "specialities.json";
pub const SUB_SPECIALITIES_FILE: &str = "subspecialities.json";
pub const ADDRESSES_FILE: &str = "addresses.json";
pub const STATUSES_FILE: &str = "statuses.json";
