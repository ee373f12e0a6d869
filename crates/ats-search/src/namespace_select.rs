//! Smart namespace selection for the broad-mode search path: role-family
//! keyword detection, skill-keyword mastercategory inference, and the
//! final top-5-per-index fallback.

use ats_classify::categories::{categories_for, IT_CATEGORIES};
use ats_core::namespace::derive_namespace;
use ats_core::record::Mastercategory;

/// Role families the engine recognizes directly in free text, each mapped
/// to the categories (and thus namespaces) that belong to that family.
fn role_families() -> [(&'static str, &'static [&'static str]); 5] {
    [
        ("qa", &["QA Automation Engineering", "QA Manual Testing"]),
        ("software_engineer", &["Backend Development", "Frontend Development", "Full Stack Development (Python)", "Full Stack Development (Java)", "Full Stack Development (.NET)"]),
        ("developer", &["Backend Development", "Frontend Development", "Mobile Development (iOS)", "Mobile Development (Android)"]),
        ("data_engineer", &["Data Engineering", "Data Science", "Machine Learning Engineering"]),
        ("devops", &["DevOps Engineering", "Site Reliability Engineering", "Cloud Engineering"]),
    ]
}

const SKILL_MASTERCATEGORY_KEYWORDS: [&str; 12] = [
    "python", "java", "javascript", "sql", "kubernetes", "docker", "aws", "react", "node", "linux", "api", "git",
];

/// Namespaces for a directly-recognized role family, or `None` if the query
/// text doesn't hit any family keyword.
pub fn role_family_namespaces(query_text: &str) -> Option<Vec<String>> {
    let lower = query_text.to_lowercase();
    for (keyword, categories) in role_families() {
        let hit = keyword.split('_').all(|part| lower.contains(part)) || lower.contains(keyword);
        if hit {
            return Some(categories.iter().map(|c| derive_namespace(c)).collect());
        }
    }
    None
}

/// Whether the query text contains enough generic IT-skill keywords to infer
/// the IT mastercategory without an explicit category.
pub fn infer_mastercategory_from_keywords(query_text: &str) -> Option<Mastercategory> {
    let lower = query_text.to_lowercase();
    let hits = SKILL_MASTERCATEGORY_KEYWORDS.iter().filter(|kw| lower.contains(**kw)).count();
    if hits > 0 {
        Some(Mastercategory::It)
    } else {
        None
    }
}

/// Top-N categories of a mastercategory's closed list, mapped to namespaces
/// — used when mastercategory can be inferred but no specific role family
/// was recognized.
pub fn top_n_namespaces(mastercategory: Mastercategory, n: usize) -> Vec<String> {
    categories_for(mastercategory).iter().take(n).map(|c| derive_namespace(c)).collect()
}

/// Last-resort fallback: top-5 namespaces of *each* index.
pub fn top_five_of_each_index() -> Vec<(Mastercategory, Vec<String>)> {
    vec![
        (Mastercategory::It, top_n_namespaces(Mastercategory::It, 5)),
        (Mastercategory::NonIt, top_n_namespaces(Mastercategory::NonIt, 5)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qa_keyword_selects_qa_family_namespaces() {
        let namespaces = role_family_namespaces("qa automation engineer with selenium").unwrap();
        assert!(namespaces.contains(&"qa_automation_engineering".to_string()));
        assert!(namespaces.contains(&"qa_manual_testing".to_string()));
    }

    #[test]
    fn unrecognized_query_has_no_family() {
        assert!(role_family_namespaces("someone who loves hiking").is_none());
    }

    #[test]
    fn skill_keywords_infer_it_mastercategory() {
        assert_eq!(infer_mastercategory_from_keywords("python django rest api"), Some(Mastercategory::It));
        assert_eq!(infer_mastercategory_from_keywords("loves gardening"), None);
    }

    #[test]
    fn top_n_respects_the_closed_category_order() {
        let top3 = top_n_namespaces(Mastercategory::It, 3);
        assert_eq!(top3.len(), 3);
        assert_eq!(top3[0], derive_namespace(IT_CATEGORIES[0]));
    }
}
