//! Two-stage designation/role matching: a cheap rule-based pass through the
//! canonical-role alias table and loose substring comparison, escalating to
//! an LLM equivalence verdict only for the bounded top-K candidates the
//! rule-based pass left ambiguous. Results are cached per (query, candidate)
//! role pair for the life of the process.

use std::collections::HashMap;
use std::sync::Mutex;

use ats_core::alias::normalize_role;
use ats_extract::llm::{IsolatedRequest, LlmClient};
use ats_extract::json_recovery::first_nonempty_line;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleVerdict {
    ExactNormalizedMatch,
    SubstringNormalizedMatch,
    SimpleSubstringMatch { score: f32 },
    FullMismatch,
    Unrecognized,
}

/// The rule-based designation comparison described in the scoring section:
/// normalize both sides through the canonical-role table first; fall back to
/// plain substring comparison when the table has no entry for one side.
pub fn compare_designations(query_designation: &str, candidate_field: &str) -> RuleVerdict {
    let query_norm = normalize_role(query_designation);
    let candidate_norm = normalize_role(candidate_field);

    if let (Some(q), Some(c)) = (&query_norm, &candidate_norm) {
        if q == c {
            return RuleVerdict::ExactNormalizedMatch;
        }
        if q.contains(c.as_str()) || c.contains(q.as_str()) {
            return RuleVerdict::SubstringNormalizedMatch;
        }
        return RuleVerdict::FullMismatch;
    }

    let q_lower = query_designation.trim().to_lowercase();
    let c_lower = candidate_field.trim().to_lowercase();
    if q_lower.is_empty() || c_lower.is_empty() {
        return RuleVerdict::Unrecognized;
    }
    if c_lower.contains(&q_lower) || q_lower.contains(&c_lower) {
        RuleVerdict::SimpleSubstringMatch { score: 25.0 }
    } else {
        RuleVerdict::Unrecognized
    }
}

/// Whether the rule-based pass gave a weak-enough signal that this candidate
/// should be escalated to the LLM matcher, bounded to the top-K semantic
/// candidates by the caller.
pub fn is_weak_signal(verdict: RuleVerdict) -> bool {
    matches!(verdict, RuleVerdict::Unrecognized | RuleVerdict::SimpleSubstringMatch { .. })
}

type CacheKey = (String, String);

pub struct DesignationMatcher {
    cache: Mutex<HashMap<CacheKey, (bool, f32)>>,
}

impl Default for DesignationMatcher {
    fn default() -> Self {
        DesignationMatcher { cache: Mutex::new(HashMap::new()) }
    }
}

fn parse_verdict(raw: &str) -> (bool, f32) {
    let Some(line) = first_nonempty_line(raw) else {
        return (false, 0.0);
    };
    let mut parts = line.split_whitespace();
    let is_match = parts.next().map(|t| t.eq_ignore_ascii_case("match")).unwrap_or(false);
    let confidence: f32 = parts.next().and_then(|t| t.parse().ok()).unwrap_or(if is_match { 0.6 } else { 0.0 });
    (is_match, confidence.clamp(0.0, 1.0))
}

impl DesignationMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// LLM-backed equivalence verdict for one (query_role, candidate_role)
    /// pair, cached across calls within this process.
    pub async fn llm_equivalence(
        &self,
        llm: &dyn LlmClient,
        query_role: &str,
        candidate_role: &str,
    ) -> (bool, f32) {
        let key = (query_role.trim().to_lowercase(), candidate_role.trim().to_lowercase());
        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return *cached;
        }

        let prompt = format!(
            "Are these two job titles functionally equivalent for hiring purposes? \
             Respond with exactly \"MATCH <confidence 0-1>\" or \"NO_MATCH\".\n\
             Title A: {query_role}\nTitle B: {candidate_role}"
        );
        let req = IsolatedRequest::new("designation-match-model", prompt)
            .with_timeout(std::time::Duration::from_secs(10));
        let verdict = match llm.generate(&req).await {
            Ok(raw) => parse_verdict(&raw),
            Err(_) => (false, 0.0),
        };
        self.cache.lock().unwrap().insert(key, verdict);
        verdict
    }

    /// Bonus to add to the combined score on a positive LLM equivalence
    /// verdict: scales from +20 at low confidence to +50 at high confidence.
    pub fn bonus_for(confidence: f32) -> f32 {
        20.0 + confidence.clamp(0.0, 1.0) * 30.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ats_extract::llm::LlmError;

    struct ScriptedLlm(String);

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, _req: &IsolatedRequest) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
        async fn health_check(&self) -> Result<Vec<String>, LlmError> {
            Ok(vec![])
        }
    }

    #[test]
    fn sdet_and_automation_test_engineer_are_an_exact_normalized_match() {
        assert_eq!(
            compare_designations("SDET", "Automation Test Engineer"),
            RuleVerdict::ExactNormalizedMatch
        );
    }

    #[test]
    fn unrecognized_roles_fall_back_to_simple_substring() {
        let verdict = compare_designations("Astronaut Pilot", "Senior Astronaut Pilot Lead");
        assert!(matches!(verdict, RuleVerdict::SimpleSubstringMatch { .. }));
    }

    #[test]
    fn fully_unrelated_roles_are_unrecognized() {
        assert_eq!(compare_designations("Astronaut", "Barista"), RuleVerdict::Unrecognized);
    }

    #[tokio::test]
    async fn llm_equivalence_is_cached() {
        let llm = ScriptedLlm("MATCH 0.9".to_string());
        let matcher = DesignationMatcher::new();
        let first = matcher.llm_equivalence(&llm, "Growth Hacker", "Marketing Lead").await;
        assert_eq!(first, (true, 0.9));
        assert_eq!(matcher.cache.lock().unwrap().len(), 1);

        let second = matcher.llm_equivalence(&llm, "Growth Hacker", "Marketing Lead").await;
        assert_eq!(second, first);
    }

    #[test]
    fn bonus_scales_with_confidence() {
        assert_eq!(DesignationMatcher::bonus_for(0.0), 20.0);
        assert_eq!(DesignationMatcher::bonus_for(1.0), 50.0);
    }
}
