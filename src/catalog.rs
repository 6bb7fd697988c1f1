//! Static catalog of colleges, counsellors and doctors.
//!
//! Loaded once at startup (built-in or from a JSON file), validated, and never
//! mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counsellor {
    pub id: String,
    pub name: String,
    pub college_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub colleges: Vec<College>,
    #[serde(default)]
    pub counsellors: Vec<Counsellor>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

/// Validated, read-only catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    colleges: Vec<College>,
    counsellors: Vec<Counsellor>,
    doctors: Vec<Doctor>,
}

impl Catalog {
    /// Validate raw entries and build a catalog.
    ///
    /// Counsellors and doctors are re-ordered by rating, highest first; unrated
    /// entries go last and ties keep their input order.
    pub fn new(file: CatalogFile) -> Result<Self, CatalogError> {
        let CatalogFile {
            colleges,
            mut counsellors,
            mut doctors,
        } = file;

        let mut college_ids = HashSet::new();
        for college in &colleges {
            require("college", &college.id, "id", &college.id)?;
            require("college", &college.id, "name", &college.name)?;
            if !college_ids.insert(college.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "college",
                    id: college.id.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for counsellor in &counsellors {
            require("counsellor", &counsellor.id, "id", &counsellor.id)?;
            require("counsellor", &counsellor.id, "name", &counsellor.name)?;
            if !seen.insert(counsellor.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "counsellor",
                    id: counsellor.id.clone(),
                });
            }
            if !college_ids.contains(counsellor.college_id.as_str()) {
                return Err(CatalogError::UnknownCollege {
                    counsellor: counsellor.id.clone(),
                    college_id: counsellor.college_id.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for doctor in &doctors {
            require("doctor", &doctor.id, "id", &doctor.id)?;
            require("doctor", &doctor.id, "name", &doctor.name)?;
            if !seen.insert(doctor.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "doctor",
                    id: doctor.id.clone(),
                });
            }
        }

        counsellors.sort_by(|a, b| by_rating_desc(a.rating, b.rating));
        doctors.sort_by(|a, b| by_rating_desc(a.rating, b.rating));

        Ok(Self {
            colleges,
            counsellors,
            doctors,
        })
    }

    /// Parse and validate a JSON catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load a JSON catalog from disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// The catalog shipped with the service.
    pub fn builtin() -> Self {
        Self {
            colleges: builtin_colleges(),
            counsellors: builtin_counsellors(),
            doctors: builtin_doctors(),
        }
    }

    pub fn colleges(&self) -> &[College] {
        &self.colleges
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn college(&self, id: &str) -> Option<&College> {
        self.colleges.iter().find(|c| c.id == id)
    }

    /// Counsellors attached to one college, best rated first.
    pub fn counsellors_for(&self, college_id: &str) -> Vec<&Counsellor> {
        self.counsellors
            .iter()
            .filter(|c| c.college_id == college_id)
            .collect()
    }

    /// First college (catalog order) whose lower-cased name occurs in the input.
    pub fn find_college_in(&self, input: &str) -> Option<&College> {
        let lower = input.to_lowercase();
        self.colleges
            .iter()
            .find(|c| lower.contains(&c.name.to_lowercase()))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn require(
    kind: &'static str,
    id: &str,
    field: &'static str,
    value: &str,
) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::EmptyField {
            kind,
            id: id.to_string(),
            field,
        });
    }
    Ok(())
}

fn by_rating_desc(a: Option<f32>, b: Option<f32>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

fn college(id: &str, name: &str) -> College {
    College {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn builtin_colleges() -> Vec<College> {
    vec![
        college("uni_of_london", "University of London"),
        college("oxford_uni", "University of Oxford"),
        college("cambridge_uni", "University of Cambridge"),
        college("manobal_college", "Manobal College"),
        college("greenwood_college", "Greenwood College"),
    ]
}

fn counsellor(id: &str, name: &str, college_id: &str, specialty: &str, rating: f32) -> Counsellor {
    Counsellor {
        id: id.to_string(),
        name: name.to_string(),
        college_id: college_id.to_string(),
        specialty: Some(specialty.to_string()),
        rating: Some(rating),
    }
}

// Kept in rating order so `builtin()` needs no sort.
fn builtin_counsellors() -> Vec<Counsellor> {
    vec![
        counsellor("c3", "Dr. Chloe Davis", "cambridge_uni", "Relationship Issues", 4.9),
        counsellor("c4", "Ms. Priya Singh", "manobal_college", "Stress & Anxiety", 4.8),
        counsellor("c1", "Ms. Anya Sharma", "uni_of_london", "Academic Stress", 4.7),
        counsellor("c5", "Mr. Rohan Mehta", "greenwood_college", "Exam Anxiety", 4.6),
        counsellor("c2", "Mr. Ben Carter", "oxford_uni", "Time Management & Productivity", 4.5),
        counsellor("c6", "Ms. Laura Green", "greenwood_college", "Homesickness & Loneliness", 4.4),
    ]
}

fn doctor(id: &str, name: &str, specialty: &str, rating: f32) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: name.to_string(),
        specialty: Some(specialty.to_string()),
        rating: Some(rating),
    }
}

fn builtin_doctors() -> Vec<Doctor> {
    vec![
        doctor("d1", "Dr. Meera Iyer", "Psychiatrist", 4.9),
        doctor("d2", "Dr. James Wilson", "Clinical Psychologist", 4.7),
        doctor("d3", "Dr. Aarav Kapoor", "General Physician", 4.5),
    ]
}
