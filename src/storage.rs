use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, SeederError};

/// Reference entity tables that are keyed by name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Degree,
    Institution,
    Speciality,
    Address,
    Status,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 5] = [
        ReferenceKind::Degree,
        ReferenceKind::Institution,
        ReferenceKind::Speciality,
        ReferenceKind::Address,
        ReferenceKind::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Degree => "degree",
            ReferenceKind::Institution => "institution",
            ReferenceKind::Speciality => "speciality",
            ReferenceKind::Address => "address",
            ReferenceKind::Status => "status",
        }
    }
}

/// A practitioner with every textual reference resolved to an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PractitionerRow {
    pub registration_number: String,
    pub full_name: String,
    pub discipline: String,
    pub address_id: Uuid,
    pub status_id: Uuid,
    pub speciality_id: Uuid,
    pub sub_speciality_id: Uuid,
}

/// Link between a practitioner and one earned qualification. All fields together
/// form the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualificationLink {
    pub practitioner_id: Uuid,
    pub degree_id: Uuid,
    pub institution_id: Uuid,
    pub speciality_name: String,
    pub year: Option<u32>,
}

/// Persistence target for normalized entities. Every write is an idempotent upsert.
#[async_trait]
pub trait Storage: Send + Sync {
    // Name-keyed reference tables
    async fn upsert_reference(&self, kind: ReferenceKind, name: &str) -> Result<Uuid>;
    async fn find_reference(&self, kind: ReferenceKind, name: &str) -> Result<Option<Uuid>>;
    async fn reference_count(&self, kind: ReferenceKind) -> Result<usize>;

    // Sub-specialities, keyed by (parent speciality, name)
    async fn upsert_sub_speciality(&self, speciality_id: Uuid, name: &str) -> Result<Uuid>;
    async fn find_sub_speciality(&self, speciality_id: Uuid, name: &str) -> Result<Option<Uuid>>;
    async fn sub_speciality_count(&self) -> Result<usize>;

    // Practitioners, keyed by registration number
    async fn upsert_practitioner(&self, practitioner: &PractitionerRow) -> Result<Uuid>;
    async fn get_practitioner(&self, registration_number: &str) -> Result<Option<PractitionerRow>>;
    async fn practitioner_count(&self) -> Result<usize>;

    /// Returns true when the link did not exist yet.
    async fn link_qualification(&self, link: &QualificationLink) -> Result<bool>;
    async fn qualifications_for(&self, practitioner_id: Uuid) -> Result<Vec<QualificationLink>>;
}

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    references: Arc<Mutex<HashMap<(ReferenceKind, String), Uuid>>>,
    sub_specialities: Arc<Mutex<HashMap<(Uuid, String), Uuid>>>,
    practitioners: Arc<Mutex<HashMap<String, (Uuid, PractitionerRow)>>>,
    qualifications: Arc<Mutex<HashSet<QualificationLink>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|e| SeederError::Storage {
        message: format!("storage lock poisoned: {}", e),
    })
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upsert_reference(&self, kind: ReferenceKind, name: &str) -> Result<Uuid> {
        let key = (kind, name.trim().to_string());
        let mut references = lock(&self.references)?;
        let id = *references.entry(key).or_insert_with(|| {
            let id = Uuid::new_v4();
            debug!("Created {}: {} with id {}", kind.as_str(), name.trim(), id);
            id
        });
        Ok(id)
    }

    async fn find_reference(&self, kind: ReferenceKind, name: &str) -> Result<Option<Uuid>> {
        let references = lock(&self.references)?;
        Ok(references.get(&(kind, name.trim().to_string())).copied())
    }

    async fn reference_count(&self, kind: ReferenceKind) -> Result<usize> {
        let references = lock(&self.references)?;
        Ok(references.keys().filter(|(k, _)| *k == kind).count())
    }

    async fn upsert_sub_speciality(&self, speciality_id: Uuid, name: &str) -> Result<Uuid> {
        let key = (speciality_id, name.trim().to_string());
        let mut subs = lock(&self.sub_specialities)?;
        Ok(*subs.entry(key).or_insert_with(Uuid::new_v4))
    }

    async fn find_sub_speciality(&self, speciality_id: Uuid, name: &str) -> Result<Option<Uuid>> {
        let subs = lock(&self.sub_specialities)?;
        Ok(subs.get(&(speciality_id, name.trim().to_string())).copied())
    }

    async fn sub_speciality_count(&self) -> Result<usize> {
        Ok(lock(&self.sub_specialities)?.len())
    }

    async fn upsert_practitioner(&self, practitioner: &PractitionerRow) -> Result<Uuid> {
        let key = practitioner.registration_number.trim().to_string();
        if key.is_empty() {
            return Err(SeederError::Storage {
                message: "Cannot upsert practitioner without registration number".to_string(),
            });
        }

        let mut practitioners = lock(&self.practitioners)?;
        let id = practitioners
            .get(&key)
            .map(|(id, _)| *id)
            .unwrap_or_else(Uuid::new_v4);
        practitioners.insert(key, (id, practitioner.clone()));
        Ok(id)
    }

    async fn get_practitioner(&self, registration_number: &str) -> Result<Option<PractitionerRow>> {
        let practitioners = lock(&self.practitioners)?;
        Ok(practitioners
            .get(registration_number.trim())
            .map(|(_, row)| row.clone()))
    }

    async fn practitioner_count(&self) -> Result<usize> {
        Ok(lock(&self.practitioners)?.len())
    }

    async fn link_qualification(&self, link: &QualificationLink) -> Result<bool> {
        Ok(lock(&self.qualifications)?.insert(link.clone()))
    }

    async fn qualifications_for(&self, practitioner_id: Uuid) -> Result<Vec<QualificationLink>> {
        let qualifications = lock(&self.qualifications)?;
        Ok(qualifications
            .iter()
            .filter(|q| q.practitioner_id == practitioner_id)
            .cloned()
            .collect())
    }
}
