//! Canonicalization tables: skills, designations/roles, and locations.
//!
//! These are deliberately small, hand-curated maps rather than anything
//! learned. Unknown inputs pass through unchanged (lowercased/trimmed) so the
//! alias tables only need to cover the ambiguous spellings that actually
//! collide.

use std::collections::HashMap;
use std::sync::OnceLock;

fn skill_aliases() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("react.js", "react"),
            ("reactjs", "react"),
            ("react js", "react"),
            ("angularjs", "angular"),
            ("angular.js", "angular"),
            ("angular js", "angular"),
            ("vue.js", "vue"),
            ("vuejs", "vue"),
            ("node.js", "node"),
            ("nodejs", "node"),
            ("java 8", "java"),
            ("java8", "java"),
            ("java 11", "java"),
            ("java 17", "java"),
            ("golang", "go"),
            ("py", "python"),
            ("python3", "python"),
            ("python 3", "python"),
            ("c plus plus", "c++"),
            ("c sharp", "c#"),
            ("ms sql", "sql server"),
            ("mssql", "sql server"),
            ("postgres", "postgresql"),
            ("k8s", "kubernetes"),
            ("aws cloud", "aws"),
            ("amazon web services", "aws"),
            ("ci/cd", "cicd"),
            ("ci cd", "cicd"),
        ])
    })
}

/// Normalize a single skill name through the canonical-skill alias table.
/// Inputs not present in the table are lowercased and trimmed, not rejected.
pub fn normalize_skill(skill: &str) -> String {
    let key = skill.trim().to_lowercase();
    match skill_aliases().get(key.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => key,
    }
}

/// Normalize a list of skills, deduplicating while preserving first-seen
/// order.
pub fn normalize_skill_list(skills: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for s in skills {
        let n = normalize_skill(s);
        if n.is_empty() {
            continue;
        }
        if seen.insert(n.clone()) {
            out.push(n);
        }
    }
    out
}

fn role_aliases() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("qa automation engineer", "qa_automation_engineer"),
            ("automation test engineer", "qa_automation_engineer"),
            ("automation tester", "qa_automation_engineer"),
            ("sdet", "qa_automation_engineer"),
            ("software development engineer in test", "qa_automation_engineer"),
            ("qa engineer", "qa_engineer"),
            ("quality analyst", "qa_engineer"),
            ("software test engineer", "qa_engineer"),
            ("manual tester", "qa_manual_engineer"),
            ("manual test engineer", "qa_manual_engineer"),
            ("software engineer", "software_engineer"),
            ("software developer", "software_engineer"),
            ("swe", "software_engineer"),
            ("sde", "software_engineer"),
            ("full stack developer", "full_stack_engineer"),
            ("fullstack developer", "full_stack_engineer"),
            ("full stack engineer", "full_stack_engineer"),
            ("backend developer", "backend_engineer"),
            ("back end developer", "backend_engineer"),
            ("frontend developer", "frontend_engineer"),
            ("front end developer", "frontend_engineer"),
            ("devops engineer", "devops_engineer"),
            ("site reliability engineer", "devops_engineer"),
            ("sre", "devops_engineer"),
            ("data engineer", "data_engineer"),
            ("data analyst", "data_analyst"),
            ("data scientist", "data_scientist"),
            ("ml engineer", "ml_engineer"),
            ("machine learning engineer", "ml_engineer"),
            ("business analyst", "business_analyst"),
            ("project manager", "project_manager"),
            ("product manager", "product_manager"),
        ])
    })
}

/// Normalize a designation/role string into its canonical role id, e.g. all
/// QA automation variants (including SDET) collapse to
/// `qa_automation_engineer`. Returns `None` when the table has no entry,
/// meaning the caller should fall back to a looser substring comparison.
pub fn normalize_role(role: &str) -> Option<String> {
    let key = role.trim().to_lowercase();
    role_aliases().get(key.as_str()).map(|s| s.to_string())
}

fn location_aliases() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("nyc", "new york"),
            ("ny", "new york"),
            ("new york city", "new york"),
            ("sf", "san francisco"),
            ("bay area", "san francisco"),
            ("la", "los angeles"),
            ("blr", "bangalore"),
            ("bengaluru", "bangalore"),
            ("hyd", "hyderabad"),
            ("ncr", "delhi ncr"),
        ])
    })
}

/// Normalize a free-text location for equality filtering: lowercase, then
/// apply the alias table if there's a hit.
pub fn normalize_location(location: &str) -> String {
    let key = location.trim().to_lowercase();
    match location_aliases().get(key.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_aliases_canonicalize() {
        assert_eq!(normalize_skill("React.js"), "react");
        assert_eq!(normalize_skill("AngularJS"), "angular");
        assert_eq!(normalize_skill("Java 8"), "java");
        assert_eq!(normalize_skill("Rust"), "rust");
    }

    #[test]
    fn skill_list_dedupes_preserving_order() {
        let input = vec![
            "React.js".to_string(),
            "Python".to_string(),
            "reactjs".to_string(),
            "python".to_string(),
        ];
        assert_eq!(normalize_skill_list(&input), vec!["react", "python"]);
    }

    #[test]
    fn role_aliases_collapse_qa_variants() {
        assert_eq!(
            normalize_role("SDET"),
            Some("qa_automation_engineer".to_string())
        );
        assert_eq!(
            normalize_role("Automation Test Engineer"),
            Some("qa_automation_engineer".to_string())
        );
        assert_eq!(normalize_role("Astronaut"), None);
    }

    #[test]
    fn location_aliases_map_abbreviations() {
        assert_eq!(normalize_location("NYC"), "new york");
        assert_eq!(normalize_location("Topeka"), "topeka");
    }
}
