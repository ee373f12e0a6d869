//! The resume record and the smaller records that reference it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Top-level partition a resume belongs to; determines which vector index
/// (`IT` or `NON_IT`) it is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mastercategory {
    It,
    NonIt,
}

impl Mastercategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mastercategory::It => "IT",
            Mastercategory::NonIt => "NON_IT",
        }
    }

    pub fn parse(s: &str) -> Option<Mastercategory> {
        match s.trim().to_uppercase().as_str() {
            "IT" => Some(Mastercategory::It),
            "NON_IT" | "NON-IT" | "NONIT" => Some(Mastercategory::NonIt),
            _ => None,
        }
    }

    /// The backend index name this mastercategory is stored under.
    pub fn index_name(&self) -> &'static str {
        match self {
            Mastercategory::It => "it",
            Mastercategory::NonIt => "non-it",
        }
    }
}

/// The persistent resume record. Field values are exclusively owned here;
/// the vector layer only ever holds a denormalized copy for ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: i64,
    pub filename: String,
    pub mastercategory: Option<Mastercategory>,
    pub category: Option<String>,
    pub candidate_name: Option<String>,
    pub job_role: Option<String>,
    pub designation: Option<String>,
    pub experience: Option<String>,
    pub domain: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub education: Option<String>,
    pub skillset: Option<String>,
    pub resume_text: Option<String>,
    pub status: Status,
    pub pinecone_status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRecord {
    pub fn new_pending(id: i64, filename: impl Into<String>, now: DateTime<Utc>) -> Self {
        ResumeRecord {
            id,
            filename: filename.into(),
            mastercategory: None,
            category: None,
            candidate_name: None,
            job_role: None,
            designation: None,
            experience: None,
            domain: None,
            mobile: None,
            email: None,
            location: None,
            education: None,
            skillset: None,
            resume_text: None,
            status: Status::Pending,
            pinecone_status: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Invariant: if mastercategory is null, category must be null too.
    pub fn invariant_category_requires_mastercategory(&self) -> bool {
        self.mastercategory.is_some() || self.category.is_none()
    }

    /// Invariant: filename is always non-empty.
    pub fn invariant_filename_nonempty(&self) -> bool {
        !self.filename.trim().is_empty()
    }

    /// Experience, parsed to an integer year count in `[0, 50]`, when present.
    pub fn experience_years(&self) -> Option<u32> {
        let raw = self.experience.as_ref()?;
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        let years: u32 = digits.parse().ok()?;
        if years <= 50 {
            Some(years)
        } else {
            None
        }
    }
}

/// A logged recruiter query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQueryRecord {
    pub id: i64,
    pub query_text: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<i64>,
}

/// A snapshot of results for one query. Deleting the parent query cascades
/// the deletion of its results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub id: i64,
    pub search_query_id: i64,
    pub results_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastercategory_round_trips() {
        assert_eq!(Mastercategory::parse("it"), Some(Mastercategory::It));
        assert_eq!(Mastercategory::parse("NON_IT"), Some(Mastercategory::NonIt));
        assert_eq!(Mastercategory::It.index_name(), "it");
        assert_eq!(Mastercategory::NonIt.index_name(), "non-it");
    }

    #[test]
    fn category_without_mastercategory_violates_invariant() {
        let mut r = ResumeRecord::new_pending(1, "a.pdf", Utc::now());
        assert!(r.invariant_category_requires_mastercategory());
        r.category = Some("QA".into());
        assert!(!r.invariant_category_requires_mastercategory());
        r.mastercategory = Some(Mastercategory::It);
        assert!(r.invariant_category_requires_mastercategory());
    }

    #[test]
    fn experience_years_clamped_out_of_range_is_none() {
        let mut r = ResumeRecord::new_pending(1, "a.pdf", Utc::now());
        r.experience = Some("5 years".into());
        assert_eq!(r.experience_years(), Some(5));
        r.experience = Some("500 years".into());
        assert_eq!(r.experience_years(), None);
    }
}
