//! Compilation from a small filter algebra to the vector-DB wire shape:
//! `$in`, `$gte`, `$lte`, `$eq`, `$and`, `$or`.

use ats_core::alias::{normalize_location, normalize_skill};
use serde_json::{json, Value};

use crate::store::CompiledFilter;

/// The algebra the vector-DB backend supports. `And`/`Or` are n-ary and
/// compose by nesting, matching how the search engine builds up compound
/// skill + experience + location constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Eq(String, Value),
    In(String, Vec<Value>),
    Gte(String, Value),
    Lte(String, Value),
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    pub fn compile(&self) -> CompiledFilter {
        match self {
            FilterExpr::Eq(field, v) => json!({ field: { "$eq": v } }),
            FilterExpr::In(field, vs) => json!({ field: { "$in": vs } }),
            FilterExpr::Gte(field, v) => json!({ field: { "$gte": v } }),
            FilterExpr::Lte(field, v) => json!({ field: { "$lte": v } }),
            FilterExpr::And(exprs) => json!({ "$and": exprs.iter().map(FilterExpr::compile).collect::<Vec<_>>() }),
            FilterExpr::Or(exprs) => json!({ "$or": exprs.iter().map(FilterExpr::compile).collect::<Vec<_>>() }),
        }
    }
}

/// `must_have_all = [s1,...,sn]`: a single `$in` clause for one skill, or an
/// `$and` of one `$in` clause per skill for more than one — the backend has
/// no native set-inclusion operator, so "all of" is spelled as a conjunction
/// of single-element memberships.
pub fn must_have_all_expr(skills: &[String]) -> Option<FilterExpr> {
    let normalized: Vec<Value> = skills.iter().map(|s| json!(normalize_skill(s))).collect();
    match normalized.len() {
        0 => None,
        1 => Some(FilterExpr::In("skills".to_string(), vec![normalized[0].clone()])),
        _ => Some(FilterExpr::And(
            normalized
                .into_iter()
                .map(|v| FilterExpr::In("skills".to_string(), vec![v]))
                .collect(),
        )),
    }
}

/// `must_have_one_of_groups`: disjunction across groups; a group with more
/// than one member is itself a conjunction of per-skill `$in` clauses.
pub fn one_of_groups_expr(groups: &[Vec<String>]) -> Option<FilterExpr> {
    let group_exprs: Vec<FilterExpr> = groups
        .iter()
        .filter_map(|g| must_have_all_expr(g))
        .collect();
    match group_exprs.len() {
        0 => None,
        1 => Some(group_exprs.into_iter().next().unwrap()),
        _ => Some(FilterExpr::Or(group_exprs)),
    }
}

pub fn experience_range_expr(min: Option<u32>, max: Option<u32>) -> Option<FilterExpr> {
    let mut clauses = Vec::new();
    if let Some(min) = min {
        clauses.push(FilterExpr::Gte("experience_years".to_string(), json!(min)));
    }
    if let Some(max) = max {
        clauses.push(FilterExpr::Lte("experience_years".to_string(), json!(max)));
    }
    match clauses.len() {
        0 => None,
        1 => Some(clauses.into_iter().next().unwrap()),
        _ => Some(FilterExpr::And(clauses)),
    }
}

pub fn location_expr(location: &str) -> Option<FilterExpr> {
    if location.trim().is_empty() {
        return None;
    }
    Some(FilterExpr::Eq("location".to_string(), json!(normalize_location(location))))
}

/// Compose every non-empty clause under a single top-level `$and`, flattening
/// any clause that is itself an `And` so that, e.g., several required-skill
/// clauses and an experience range land as siblings in one `$and` rather
/// than nested inside it.
pub fn combine(clauses: Vec<Option<FilterExpr>>) -> Option<FilterExpr> {
    let mut present = Vec::new();
    for clause in clauses.into_iter().flatten() {
        match clause {
            FilterExpr::And(inner) => present.extend(inner),
            other => present.push(other),
        }
    }
    match present.len() {
        0 => None,
        1 => Some(present.into_iter().next().unwrap()),
        _ => Some(FilterExpr::And(present)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_skill_is_a_bare_in_clause() {
        let expr = must_have_all_expr(&["Python".to_string()]).unwrap();
        assert_eq!(expr.compile(), json!({"skills": {"$in": ["python"]}}));
    }

    #[test]
    fn multiple_skills_and_together() {
        let expr = must_have_all_expr(&["Python".to_string(), "Django".to_string()]).unwrap();
        assert_eq!(
            expr.compile(),
            json!({"$and": [{"skills": {"$in": ["python"]}}, {"skills": {"$in": ["django"]}}]})
        );
    }

    #[test]
    fn s1_full_compiled_filter_matches_the_documented_shape() {
        // combine() flattens a nested And into the top-level $and rather than
        // nesting it, so the two skill clauses land as siblings of the
        // experience clause rather than under their own sub-$and.
        let skills = must_have_all_expr(&["python".to_string(), "django".to_string()]);
        let exp = experience_range_expr(Some(5), None);
        let combined = combine(vec![skills, exp]).unwrap();
        assert_eq!(
            combined.compile(),
            json!({"$and": [
                {"skills": {"$in": ["python"]}},
                {"skills": {"$in": ["django"]}},
                {"experience_years": {"$gte": 5}}
            ]})
        );
    }

    #[test]
    fn location_is_normalized_before_filtering() {
        let expr = location_expr("NYC").unwrap();
        assert_eq!(expr.compile(), json!({"location": {"$eq": "new york"}}));
    }

    #[test]
    fn empty_inputs_compile_to_nothing() {
        assert_eq!(combine(vec![None, None]), None);
    }
}
