//! The closed category label sets, one per mastercategory.

pub const IT_CATEGORIES: [&str; 22] = [
    "Full Stack Development (Python)",
    "Full Stack Development (Java)",
    "Full Stack Development (.NET)",
    "Backend Development",
    "Frontend Development",
    "Mobile Development (iOS)",
    "Mobile Development (Android)",
    "DevOps Engineering",
    "Site Reliability Engineering",
    "Data Engineering",
    "Data Science",
    "Machine Learning Engineering",
    "QA Automation Engineering",
    "QA Manual Testing",
    "Cloud Engineering",
    "Database Administration",
    "Network Engineering",
    "Cybersecurity",
    "IT Support",
    "Systems Administration",
    "Embedded Systems",
    "Technical Project Management",
];

pub const NON_IT_CATEGORIES: [&str; 30] = [
    "Human Resources",
    "Recruitment",
    "Sales",
    "Business Development",
    "Marketing",
    "Digital Marketing",
    "Content Writing",
    "Graphic Design",
    "Finance",
    "Accounting",
    "Audit",
    "Legal",
    "Operations",
    "Supply Chain Management",
    "Logistics",
    "Procurement",
    "Customer Support",
    "Administration",
    "Healthcare",
    "Nursing",
    "Pharmacy",
    "Teaching",
    "Hospitality",
    "Retail",
    "Manufacturing",
    "Quality Assurance (Non-IT)",
    "Construction",
    "Real Estate",
    "Banking",
    "Insurance",
];

pub fn categories_for(mastercategory: ats_core::record::Mastercategory) -> &'static [&'static str] {
    match mastercategory {
        ats_core::record::Mastercategory::It => &IT_CATEGORIES,
        ats_core::record::Mastercategory::NonIt => &NON_IT_CATEGORIES,
    }
}

/// Match a raw category string against the closed list for its
/// mastercategory, case-insensitively. Returns the canonical-cased label.
pub fn resolve_category(mastercategory: ats_core::record::Mastercategory, raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    categories_for(mastercategory)
        .iter()
        .find(|c| c.eq_ignore_ascii_case(trimmed))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ats_core::record::Mastercategory;

    #[test]
    fn resolves_case_insensitively() {
        assert_eq!(
            resolve_category(Mastercategory::It, "full stack development (python)"),
            Some("Full Stack Development (Python)")
        );
    }

    #[test]
    fn rejects_labels_outside_the_closed_set() {
        assert_eq!(resolve_category(Mastercategory::It, "Astrophysics"), None);
    }

    #[test]
    fn counts_match_the_documented_sizes() {
        assert_eq!(IT_CATEGORIES.len(), 22);
        assert_eq!(NON_IT_CATEGORIES.len(), 30);
    }
}
