//! Candidate scoring: skill/designation/experience/mastercategory
//! sub-scores, combination into a normalized `[0,1]` score, and fit-tier
//! bucketing with its documented overrides.

use std::collections::HashSet;

use ats_core::alias::normalize_skill_list;
use ats_core::record::Mastercategory;

use crate::query::QueryFilters;

const QA_KEYWORDS: [&str; 5] = ["qa", "quality assurance", "test", "testing", "tester"];

/// `40 * matched/required` for `must_have_all`, plus the best
/// `30 * matched/group_size` across `must_have_one_of_groups`, plus a small
/// domain boost when the query itself is QA-flavored and the candidate's
/// skills show QA keywords.
pub fn skill_score(filters: &QueryFilters, candidate_skills: &[String]) -> f32 {
    let candidate: HashSet<String> = normalize_skill_list(candidate_skills).into_iter().collect();
    let mut score = 0.0;

    if !filters.must_have_all.is_empty() {
        let required = normalize_skill_list(&filters.must_have_all);
        let matched = required.iter().filter(|s| candidate.contains(*s)).count();
        score += 40.0 * (matched as f32 / required.len() as f32);
    }

    let mut best_group = 0.0f32;
    for group in &filters.must_have_one_of_groups {
        if group.is_empty() {
            continue;
        }
        let normalized = normalize_skill_list(group);
        let matched = normalized.iter().filter(|s| candidate.contains(*s)).count();
        let group_score = 30.0 * (matched as f32 / normalized.len() as f32);
        best_group = best_group.max(group_score);
    }
    score += best_group;

    let query_is_qa = filters
        .designation
        .as_deref()
        .map(|d| QA_KEYWORDS.iter().any(|kw| d.to_lowercase().contains(kw)))
        .unwrap_or(false)
        || filters.must_have_all.iter().any(|s| QA_KEYWORDS.iter().any(|kw| s.to_lowercase().contains(kw)));
    if query_is_qa {
        let qa_hits = candidate.iter().filter(|s| QA_KEYWORDS.iter().any(|kw| s.contains(kw))).count();
        score += 5.0 * qa_hits as f32;
    }

    score
}

/// `experience_score`: distance-banded around `[min,max]`.
pub fn experience_score(min: Option<u32>, max: Option<u32>, candidate_years: Option<u32>) -> f32 {
    let Some(years) = candidate_years else {
        return 0.0;
    };
    let Some(min) = min else {
        return if max.map(|m| years <= m).unwrap_or(true) { 5.0 } else { -5.0 };
    };

    if let Some(max) = max {
        if years >= min && years <= max {
            return 5.0;
        }
        if years > max {
            return -5.0;
        }
    }

    if years >= min {
        if years - min <= 1 {
            10.0
        } else {
            8.0
        }
    } else {
        let shortfall = min - years;
        if shortfall <= 2 {
            3.0
        } else {
            -15.0
        }
    }
}

pub fn mastercategory_score(query: Option<Mastercategory>, candidate: Option<Mastercategory>, strict: bool) -> f32 {
    match (query, candidate) {
        (Some(q), Some(c)) if q == c => 10.0,
        (Some(_), Some(_)) => {
            if strict {
                -100.0
            } else {
                -50.0
            }
        }
        _ => 0.0,
    }
}

/// Relevance is the sum of the component scores; semantic is the raw cosine
/// similarity in `[0,1]` from the vector query. Combined is normalized by
/// dividing by 200 and clamping to `[0,1]`.
pub fn combined_normalized(semantic: f32, relevance: f32) -> f32 {
    ((100.0 * semantic + relevance) / 200.0).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FitTier {
    Low,
    Partial,
    Good,
    Perfect,
}

impl FitTier {
    pub fn from_normalized(score: f32) -> FitTier {
        if score >= 0.85 {
            FitTier::Perfect
        } else if score >= 0.70 {
            FitTier::Good
        } else if score >= 0.50 {
            FitTier::Partial
        } else {
            FitTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitTier::Perfect => "Perfect",
            FitTier::Good => "Good",
            FitTier::Partial => "Partial",
            FitTier::Low => "Low",
        }
    }
}

const STUDENT_MARKERS: [&str; 3] = ["student", "intern", "trainee"];

/// Jaccard-style keyword overlap over whitespace-split lowercase tokens,
/// used for the "roles share at least 30% keyword overlap" promotion rule.
pub fn role_keyword_overlap_ratio(a: &str, b: &str) -> f32 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let tokens_a: HashSet<&str> = a_lower.split_whitespace().collect::<Vec<_>>().into_iter().collect();
    let tokens_b: HashSet<&str> = b_lower.split_whitespace().collect::<Vec<_>>().into_iter().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f32 / union as f32
}

#[derive(Debug, Clone, Default)]
pub struct TierOverrideInputs<'a> {
    pub hard_mastercategory_mismatch: bool,
    pub query_designation: Option<&'a str>,
    pub candidate_designation: Option<&'a str>,
    pub normalized_role_mismatch: bool,
    pub exact_normalized_role_match: bool,
    pub experience_satisfied: bool,
    pub must_have_all_fully_matched: bool,
    pub role_overlap_ratio: f32,
}

fn candidate_looks_like_student(query_designation: Option<&str>, candidate_designation: Option<&str>) -> bool {
    let query_mentions_student = query_designation
        .map(|d| STUDENT_MARKERS.iter().any(|m| d.to_lowercase().contains(m)))
        .unwrap_or(false);
    if query_mentions_student {
        return false;
    }
    candidate_designation
        .map(|d| STUDENT_MARKERS.iter().any(|m| d.to_lowercase().contains(m)))
        .unwrap_or(false)
}

/// Fit-tier bucketing with the documented overrides applied, in order,
/// before falling back to plain score-banding.
pub fn fit_tier(normalized: f32, overrides: &TierOverrideInputs) -> FitTier {
    if overrides.hard_mastercategory_mismatch {
        return FitTier::Low;
    }
    if candidate_looks_like_student(overrides.query_designation, overrides.candidate_designation) {
        return FitTier::Low;
    }
    if overrides.normalized_role_mismatch {
        return FitTier::Low;
    }
    if overrides.exact_normalized_role_match {
        return if overrides.experience_satisfied { FitTier::Perfect } else { FitTier::Good };
    }

    let mut tier = FitTier::from_normalized(normalized);
    if overrides.must_have_all_fully_matched && overrides.role_overlap_ratio >= 0.30 && tier < FitTier::Partial {
        tier = FitTier::Partial;
    }
    tier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_alias_canonicalization_yields_full_skill_score() {
        let filters = QueryFilters {
            must_have_all: vec!["React.js".to_string(), "AngularJS".to_string()],
            ..QueryFilters::default()
        };
        let candidate_skills = vec!["react".to_string(), "angular".to_string()];
        assert_eq!(skill_score(&filters, &candidate_skills), 40.0);
    }

    #[test]
    fn experience_within_one_year_above_min_scores_ten() {
        assert_eq!(experience_score(Some(5), None, Some(6)), 10.0);
        assert_eq!(experience_score(Some(5), None, Some(5)), 10.0);
    }

    #[test]
    fn experience_more_than_two_years_short_is_penalized() {
        assert_eq!(experience_score(Some(5), None, Some(2)), -15.0);
    }

    #[test]
    fn strict_mastercategory_mismatch_short_circuits() {
        assert_eq!(mastercategory_score(Some(Mastercategory::It), Some(Mastercategory::NonIt), true), -100.0);
        assert_eq!(mastercategory_score(Some(Mastercategory::It), Some(Mastercategory::NonIt), false), -50.0);
    }

    #[test]
    fn combined_score_normalizes_and_clamps() {
        assert_eq!(combined_normalized(1.0, 100.0), 1.0);
        assert_eq!(combined_normalized(0.0, -300.0), 0.0);
    }

    #[test]
    fn hard_mismatch_overrides_to_low_regardless_of_score() {
        let overrides = TierOverrideInputs { hard_mastercategory_mismatch: true, ..Default::default() };
        assert_eq!(fit_tier(0.99, &overrides), FitTier::Low);
    }

    #[test]
    fn student_candidate_against_non_student_query_is_low() {
        let overrides = TierOverrideInputs {
            query_designation: Some("QA Automation Engineer"),
            candidate_designation: Some("QA Intern"),
            ..Default::default()
        };
        assert_eq!(fit_tier(0.95, &overrides), FitTier::Low);
    }

    #[test]
    fn exact_role_match_with_experience_satisfied_is_perfect() {
        let overrides = TierOverrideInputs {
            exact_normalized_role_match: true,
            experience_satisfied: true,
            ..Default::default()
        };
        assert_eq!(fit_tier(0.2, &overrides), FitTier::Perfect);
    }

    #[test]
    fn exact_role_match_without_experience_is_good() {
        let overrides = TierOverrideInputs {
            exact_normalized_role_match: true,
            experience_satisfied: false,
            ..Default::default()
        };
        assert_eq!(fit_tier(0.2, &overrides), FitTier::Good);
    }

    #[test]
    fn skills_matched_and_role_overlap_promotes_to_at_least_partial() {
        let overrides = TierOverrideInputs {
            must_have_all_fully_matched: true,
            role_overlap_ratio: 0.5,
            ..Default::default()
        };
        assert_eq!(fit_tier(0.1, &overrides), FitTier::Partial);
    }
}
