//! The search engine: explicit-category semantic search, broad-mode
//! semantic search with concurrent namespace fan-out, common scoring, the
//! two-stage LLM designation pass, post-filtering, and the fallback
//! cascade.

use std::collections::HashMap;
use std::time::Duration;

use ats_core::alias::normalize_role;
use ats_core::config::PipelineConfig;
use ats_core::error::PipelineError;
use ats_core::namespace::derive_namespace;
use ats_core::record::Mastercategory;
use ats_extract::llm::LlmClient;
use ats_vector::filter::{combine, experience_range_expr, location_expr, must_have_all_expr, one_of_groups_expr};
use ats_vector::store::{CompiledFilter, ScoredVector, VectorStore};
use serde_json::Value;

use crate::designation::{compare_designations, is_weak_signal, DesignationMatcher, RuleVerdict};
use crate::name_search::{search_by_name, CandidateNameRepository, NameSearchHit};
use crate::namespace_select::{infer_mastercategory_from_keywords, role_family_namespaces, top_five_of_each_index, top_n_namespaces};
use crate::query::{ParsedQuery, QueryFilters, SearchType};
use crate::scoring::{combined_normalized, experience_score, fit_tier, mastercategory_score, role_keyword_overlap_ratio, skill_score, FitTier, TierOverrideInputs};

const GENERIC_FALLBACK_PHRASE: &str = "professional candidate resume experience skills";
const MINIMAL_QUERY_TOKEN_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub id: String,
    pub semantic_score: f32,
    pub combined_normalized: f32,
    pub fit_tier: FitTier,
    pub metadata: HashMap<String, Value>,
}

/// The payload `search` returns: a name-path result never touches the vector
/// store's scoring machinery, so it carries its own hit type rather than
/// being forced into `RankedCandidate`.
#[derive(Debug, Clone)]
pub enum SearchResults {
    Name(Vec<NameSearchHit>),
    Semantic(Vec<RankedCandidate>),
}

fn metadata_str<'a>(metadata: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(Value::as_str)
}

fn metadata_skills(metadata: &HashMap<String, Value>) -> Vec<String> {
    metadata
        .get("skills")
        .and_then(Value::as_str)
        .map(|s| s.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect())
        .unwrap_or_default()
}

fn metadata_experience_years(metadata: &HashMap<String, Value>) -> Option<u32> {
    metadata.get("experience_years").and_then(Value::as_u64).map(|n| n as u32)
}

fn metadata_mastercategory(metadata: &HashMap<String, Value>) -> Option<Mastercategory> {
    metadata_str(metadata, "mastercategory").and_then(Mastercategory::parse)
}

pub fn compile_filters(filters: &QueryFilters) -> Option<CompiledFilter> {
    let skills = must_have_all_expr(&filters.must_have_all);
    let groups = one_of_groups_expr(&filters.must_have_one_of_groups);
    let exp = experience_range_expr(filters.min_experience, filters.max_experience);
    let loc = filters.location.as_deref().and_then(location_expr);
    combine(vec![skills, groups, exp, loc]).map(|e| e.compile())
}

/// Rule-based relevance for one candidate, before any LLM designation bonus.
/// `expected_category` is only `Some` on the explicit-mode path, where a
/// category mismatch is itself a hard gate alongside mastercategory.
fn rule_based_relevance(
    filters: &QueryFilters,
    metadata: &HashMap<String, Value>,
    mastercategory_query: Option<Mastercategory>,
    expected_category: Option<&str>,
    strict: bool,
) -> (f32, RuleVerdict) {
    let mut relevance = skill_score(filters, &metadata_skills(metadata));

    let candidate_designation = metadata_str(metadata, "designation").or_else(|| metadata_str(metadata, "job_role"));
    let verdict = match (&filters.designation, candidate_designation) {
        (Some(q), Some(c)) => compare_designations(q, c),
        _ => RuleVerdict::Unrecognized,
    };
    relevance += match verdict {
        RuleVerdict::ExactNormalizedMatch => 50.0,
        RuleVerdict::SubstringNormalizedMatch => 40.0,
        RuleVerdict::SimpleSubstringMatch { score } => score,
        RuleVerdict::FullMismatch => -40.0,
        RuleVerdict::Unrecognized => 0.0,
    };

    relevance += experience_score(filters.min_experience, filters.max_experience, metadata_experience_years(metadata));
    relevance += mastercategory_score(mastercategory_query, metadata_mastercategory(metadata), strict);

    if let Some(expected) = expected_category {
        if strict {
            let matches = metadata_str(metadata, "category").map(|c| c.eq_ignore_ascii_case(expected)).unwrap_or(false);
            if !matches {
                relevance -= 100.0;
            }
        }
    }

    (relevance, verdict)
}

/// The literal phrase the fallback cascade's step (d) re-embeds when the
/// query looks minimal and still has hard filters attached. Embedding itself
/// is the caller's job (the embedding model is an external collaborator);
/// this only fixes the text to embed.
pub fn generic_fallback_phrase() -> &'static str {
    GENERIC_FALLBACK_PHRASE
}

fn tier_overrides_for<'a>(filters: &'a QueryFilters, metadata: &'a HashMap<String, Value>, hard_mismatch: bool) -> TierOverrideInputs<'a> {
    let candidate_designation = metadata_str(metadata, "designation").or_else(|| metadata_str(metadata, "job_role"));
    let candidate_role_norm = candidate_designation.and_then(normalize_role);
    let query_role_norm = filters.designation.as_deref().and_then(normalize_role);
    let normalized_role_mismatch = matches!((&query_role_norm, &candidate_role_norm), (Some(q), Some(c)) if q != c);
    let exact_normalized_role_match = matches!((&query_role_norm, &candidate_role_norm), (Some(q), Some(c)) if q == c);

    let experience_satisfied = match filters.min_experience {
        Some(min) => metadata_experience_years(metadata).map(|y| y >= min).unwrap_or(false),
        None => true,
    };

    let must_have_all_fully_matched = !filters.must_have_all.is_empty() && {
        let candidate: std::collections::HashSet<String> = ats_core::alias::normalize_skill_list(&metadata_skills(metadata)).into_iter().collect();
        ats_core::alias::normalize_skill_list(&filters.must_have_all).iter().all(|s| candidate.contains(s))
    };

    let role_overlap_ratio = match (filters.designation.as_deref(), candidate_designation) {
        (Some(q), Some(c)) => role_keyword_overlap_ratio(q, c),
        _ => 0.0,
    };

    TierOverrideInputs {
        hard_mastercategory_mismatch: hard_mismatch,
        query_designation: filters.designation.as_deref(),
        candidate_designation,
        normalized_role_mismatch,
        exact_normalized_role_match,
        experience_satisfied,
        must_have_all_fully_matched,
        role_overlap_ratio,
    }
}

fn rank_hits(
    filters: &QueryFilters,
    mastercategory_query: Option<Mastercategory>,
    expected_category: Option<&str>,
    strict: bool,
    hits: Vec<ScoredVector>,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = hits
        .into_iter()
        .map(|hit| {
            let (relevance, _) = rule_based_relevance(filters, &hit.metadata, mastercategory_query, expected_category, strict);
            let hard_mismatch = strict && relevance <= -100.0;
            let combined = if hard_mismatch { 0.0 } else { combined_normalized(hit.score, relevance) };
            let overrides = tier_overrides_for(filters, &hit.metadata, hard_mismatch);
            RankedCandidate {
                id: hit.id,
                semantic_score: hit.score,
                combined_normalized: combined,
                fit_tier: fit_tier(combined, &overrides),
                metadata: hit.metadata,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.combined_normalized.partial_cmp(&a.combined_normalized).unwrap());
    ranked
}

/// Explicit-category semantic search: a single (index, namespace) query, no
/// fallback to any other namespace, strict category/mastercategory gating.
pub async fn search_explicit<S: VectorStore>(
    store: &S,
    query_vector: &[f32],
    parsed: &ParsedQuery,
    mastercategory: Mastercategory,
    category: &str,
    top_k: usize,
) -> Result<Vec<RankedCandidate>, ats_core::error::VectorError> {
    let namespace = derive_namespace(category);
    let filter = compile_filters(&parsed.filters);
    let hits = store.query(mastercategory.index_name(), &namespace, query_vector, top_k, filter.as_ref()).await?;
    Ok(rank_hits(&parsed.filters, Some(mastercategory), Some(category), true, hits))
}

/// Smart namespace choice for the broad-mode path, in priority order:
/// role-family keyword hit, then skill-keyword mastercategory inference with
/// top-N namespaces of that index, then top-5 of each index.
fn choose_broad_namespaces(query_text: &str) -> Vec<(Mastercategory, Vec<String>)> {
    if let Some(namespaces) = role_family_namespaces(query_text) {
        let mastercategory = infer_mastercategory_from_keywords(query_text).unwrap_or(Mastercategory::It);
        return vec![(mastercategory, namespaces)];
    }
    if let Some(mastercategory) = infer_mastercategory_from_keywords(query_text) {
        return vec![(mastercategory, top_n_namespaces(mastercategory, 5))];
    }
    top_five_of_each_index()
}

/// Broad-mode semantic search: concurrent fan-out across the chosen
/// namespaces under one shared timeout, unioned and deduplicated by id,
/// scored without hard category gating.
pub async fn search_broad<S: VectorStore>(
    store: &S,
    query_vector: &[f32],
    parsed: &ParsedQuery,
    top_k: usize,
    timeout: Duration,
) -> Vec<RankedCandidate> {
    let targets = choose_broad_namespaces(&parsed.text_for_embedding);
    let filter = compile_filters(&parsed.filters);

    let futures_iter = targets.iter().flat_map(|(mastercategory, namespaces)| {
        let filter = filter.clone();
        namespaces.iter().map(move |namespace| {
            let filter = filter.clone();
            async move {
                store
                    .query(mastercategory.index_name(), namespace, query_vector, top_k, filter.as_ref())
                    .await
                    .unwrap_or_default()
            }
        })
    });

    let all_hits: Vec<ScoredVector> = match tokio::time::timeout(timeout, futures::future::join_all(futures_iter)).await {
        Ok(results) => results.into_iter().flatten().collect(),
        Err(_) => Vec::new(),
    };

    let mut deduped: HashMap<String, ScoredVector> = HashMap::new();
    for hit in all_hits {
        deduped
            .entry(hit.id.clone())
            .and_modify(|existing| {
                if hit.score > existing.score {
                    *existing = hit.clone();
                }
            })
            .or_insert(hit);
    }

    rank_hits(&parsed.filters, None, None, false, deduped.into_values().collect())
}

/// After the initial semantic-score sort, escalate only the bounded top-K
/// candidates with a weak rule-based designation signal to the LLM matcher,
/// then re-sort by the boosted combined score.
pub async fn apply_designation_boost(
    llm: &dyn LlmClient,
    matcher: &DesignationMatcher,
    filters: &QueryFilters,
    mut candidates: Vec<RankedCandidate>,
    top_k: usize,
) -> Vec<RankedCandidate> {
    let Some(query_role) = filters.designation.as_deref() else {
        return candidates;
    };

    candidates.sort_by(|a, b| b.semantic_score.partial_cmp(&a.semantic_score).unwrap());

    for candidate in candidates.iter_mut().take(top_k) {
        let candidate_role = metadata_str(&candidate.metadata, "designation").or_else(|| metadata_str(&candidate.metadata, "job_role"));
        let Some(candidate_role) = candidate_role else { continue };
        let verdict = compare_designations(query_role, candidate_role);
        if !is_weak_signal(verdict) {
            continue;
        }
        let (is_match, confidence) = matcher.llm_equivalence(llm, query_role, candidate_role).await;
        if is_match {
            let bonus = DesignationMatcher::bonus_for(confidence);
            candidate.combined_normalized = (candidate.combined_normalized + bonus / 200.0).clamp(0.0, 1.0);
        }
    }

    candidates.sort_by(|a, b| b.combined_normalized.partial_cmp(&a.combined_normalized).unwrap());
    candidates
}

/// Narrow to a dominant mastercategory or normalized role when at least two
/// candidates share it, falling back to no narrowing if that would leave
/// fewer than two results.
pub fn post_filter(filters: &QueryFilters, identified_mastercategory: Option<Mastercategory>, candidates: Vec<RankedCandidate>) -> Vec<RankedCandidate> {
    let mut current = candidates;

    if let Some(mastercategory) = identified_mastercategory {
        let matching: Vec<RankedCandidate> = current.iter().filter(|c| metadata_mastercategory(&c.metadata) == Some(mastercategory)).cloned().collect();
        if matching.len() >= 2 {
            current = matching;
        }
    }

    if let Some(query_role_norm) = filters.designation.as_deref().and_then(normalize_role) {
        let matching: Vec<RankedCandidate> = current
            .iter()
            .filter(|c| metadata_str(&c.metadata, "designation").and_then(normalize_role).as_deref() == Some(query_role_norm.as_str()))
            .cloned()
            .collect();
        if matching.len() >= 2 {
            current = matching;
        }
    }

    current
}

/// Fallback cascade run when a semantic path (explicit or broad) returns
/// zero hits. Explicit mode never falls back; broad mode widens
/// progressively until a pass finally drops filters entirely.
/// `generic_query_vector` is the embedding of [`generic_fallback_phrase`],
/// computed by the caller ahead of time since embedding itself is an
/// external collaborator this crate never calls directly.
pub async fn fallback_cascade<S: VectorStore>(
    store: &S,
    query_vector: &[f32],
    generic_query_vector: &[f32],
    parsed: &ParsedQuery,
    identified_mastercategory: Mastercategory,
    top_k: usize,
    timeout: Duration,
    is_explicit: bool,
) -> Vec<RankedCandidate> {
    if is_explicit {
        return Vec::new();
    }

    let role_family = role_family_namespaces(&parsed.text_for_embedding).unwrap_or_else(|| top_n_namespaces(identified_mastercategory, 5));
    let filter = compile_filters(&parsed.filters);
    let hits = query_namespaces(store, identified_mastercategory, &role_family, query_vector, filter.as_ref(), top_k, timeout).await;
    if !hits.is_empty() {
        return rank_hits(&parsed.filters, None, None, false, hits);
    }

    let has_hard_filters = filter.is_some();
    if has_hard_filters {
        let all_namespaces = top_n_namespaces(identified_mastercategory, usize::MAX.min(100));
        let hits = query_namespaces(store, identified_mastercategory, &all_namespaces, query_vector, filter.as_ref(), top_k, timeout).await;
        if !hits.is_empty() {
            return rank_hits(&parsed.filters, None, None, false, hits);
        }
    }

    let token_count = parsed.text_for_embedding.split_whitespace().count();
    let looks_minimal = token_count <= MINIMAL_QUERY_TOKEN_LIMIT && role_family_namespaces(&parsed.text_for_embedding).is_none();
    if looks_minimal && has_hard_filters {
        let generic_namespaces = top_n_namespaces(identified_mastercategory, 5);
        let hits = query_namespaces(store, identified_mastercategory, &generic_namespaces, generic_query_vector, filter.as_ref(), top_k, timeout).await;
        if !hits.is_empty() {
            return rank_hits(&parsed.filters, None, None, false, hits);
        }
    }

    let generic_namespaces = top_n_namespaces(identified_mastercategory, 5);
    let final_hits = query_namespaces(store, identified_mastercategory, &generic_namespaces, query_vector, None, top_k, timeout).await;
    rank_hits(&parsed.filters, None, None, false, final_hits)
}

async fn query_namespaces<S: VectorStore>(
    store: &S,
    mastercategory: Mastercategory,
    namespaces: &[String],
    query_vector: &[f32],
    filter: Option<&CompiledFilter>,
    top_k: usize,
    timeout: Duration,
) -> Vec<ScoredVector> {
    let futures_iter = namespaces.iter().map(|namespace| async move {
        store.query(mastercategory.index_name(), namespace, query_vector, top_k, filter).await.unwrap_or_default()
    });
    match tokio::time::timeout(timeout, futures::future::join_all(futures_iter)).await {
        Ok(results) => results.into_iter().flatten().collect(),
        Err(_) => Vec::new(),
    }
}

/// The single composed entry point: picks one of the three paths
/// (`search_by_name` / `search_explicit` / `search_broad`) off
/// `parsed.search_type` and the presence of an explicit category, runs the
/// fallback cascade when a semantic path comes back empty, then applies the
/// designation boost and post-filter. Mirrors how `ats_ingest::orchestrator`
/// composes its own fleet of stages into one call.
pub async fn search<S: VectorStore>(
    store: &S,
    name_repo: &dyn CandidateNameRepository,
    llm: &dyn LlmClient,
    matcher: &DesignationMatcher,
    parsed: &ParsedQuery,
    query_vector: &[f32],
    generic_query_vector: &[f32],
    config: &PipelineConfig,
) -> Result<SearchResults, PipelineError> {
    if matches!(parsed.search_type, SearchType::Name) {
        if let Some(name) = parsed.filters.candidate_name.as_deref().filter(|n| !n.trim().is_empty()) {
            let hits = search_by_name(name_repo, name).await?;
            return Ok(SearchResults::Name(hits));
        }
    }

    let timeout = Duration::from_secs(config.broad_mode_timeout_secs);
    let top_k = config.top_k_results;

    let (ranked, identified_mastercategory) = match (parsed.mastercategory, parsed.category.as_deref()) {
        (Some(mastercategory), Some(category)) => {
            let ranked = search_explicit(store, query_vector, parsed, mastercategory, category, top_k).await?;
            (ranked, Some(mastercategory))
        }
        _ => {
            let broad = search_broad(store, query_vector, parsed, top_k, timeout).await;
            if broad.is_empty() {
                let identified = infer_mastercategory_from_keywords(&parsed.text_for_embedding).unwrap_or(Mastercategory::It);
                let cascaded =
                    fallback_cascade(store, query_vector, generic_query_vector, parsed, identified, top_k, timeout, false).await;
                (cascaded, Some(identified))
            } else {
                (broad, None)
            }
        }
    };

    let boosted = apply_designation_boost(llm, matcher, &parsed.filters, ranked, config.designation_match_top_k).await;
    let filtered = post_filter(&parsed.filters, identified_mastercategory, boosted);
    Ok(SearchResults::Semantic(filtered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ats_vector::store::{IndexStats, Vector};
    use serde_json::json;

    struct FixedStore {
        hits: HashMap<(String, String), Vec<ScoredVector>>,
    }

    #[async_trait]
    impl VectorStore for FixedStore {
        async fn create_index(&self, _name: &str, _dimension: usize) -> Result<(), ats_core::error::VectorError> {
            Ok(())
        }
        async fn list_indexes(&self) -> Result<Vec<String>, ats_core::error::VectorError> {
            Ok(vec![])
        }
        async fn upsert(&self, _index: &str, _namespace: &str, _vectors: Vec<Vector>) -> Result<(), ats_core::error::VectorError> {
            Ok(())
        }
        async fn query(
            &self,
            index: &str,
            namespace: &str,
            _query_vector: &[f32],
            _top_k: usize,
            _filter: Option<&CompiledFilter>,
        ) -> Result<Vec<ScoredVector>, ats_core::error::VectorError> {
            Ok(self.hits.get(&(index.to_string(), namespace.to_string())).cloned().unwrap_or_default())
        }
        async fn delete(&self, _index: &str, _namespace: &str, _ids: &[String]) -> Result<(), ats_core::error::VectorError> {
            Ok(())
        }
        async fn describe_index_stats(&self, _index: &str) -> Result<IndexStats, ats_core::error::VectorError> {
            Ok(IndexStats::default())
        }
    }

    #[tokio::test]
    async fn s1_explicit_search_queries_exactly_one_namespace() {
        let mut hits = HashMap::new();
        hits.insert(
            ("it".to_string(), "full_stack_development_python".to_string()),
            vec![ScoredVector {
                id: "r1".to_string(),
                score: 0.9,
                metadata: HashMap::from([
                    ("skills".to_string(), json!("python,django")),
                    ("experience_years".to_string(), json!(6)),
                    ("mastercategory".to_string(), json!("IT")),
                ]),
            }],
        );
        let store = FixedStore { hits };

        let parsed = ParsedQuery {
            search_type: crate::query::SearchType::Hybrid,
            text_for_embedding: "python developer python django 5 years".to_string(),
            filters: QueryFilters {
                designation: Some("python developer".to_string()),
                must_have_all: vec!["python".to_string(), "django".to_string()],
                min_experience: Some(5),
                ..QueryFilters::default()
            },
            mastercategory: Some(Mastercategory::It),
            category: Some("Full Stack Development (Python)".to_string()),
        };

        let ranked = search_explicit(&store, &[0.1, 0.2], &parsed, Mastercategory::It, "Full Stack Development (Python)", 10)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "r1");
    }

    #[test]
    fn s1_compiled_filter_matches_documented_shape() {
        let filters = QueryFilters {
            must_have_all: vec!["python".to_string(), "django".to_string()],
            min_experience: Some(5),
            ..QueryFilters::default()
        };
        let compiled = compile_filters(&filters).unwrap();
        // combine() flattens a nested And into the top-level $and rather than
        // nesting it, so the two skill clauses land as siblings of the
        // experience clause rather than under their own sub-$and.
        assert_eq!(
            compiled,
            json!({"$and": [
                {"skills": {"$in": ["python"]}},
                {"skills": {"$in": ["django"]}},
                {"experience_years": {"$gte": 5}}
            ]})
        );
    }

    #[tokio::test]
    async fn s6_explicit_mode_zero_hits_has_no_fallback() {
        let store = FixedStore { hits: HashMap::new() };
        let parsed = ParsedQuery {
            search_type: crate::query::SearchType::Semantic,
            text_for_embedding: "anything".to_string(),
            filters: QueryFilters::default(),
            mastercategory: Some(Mastercategory::It),
            category: Some("Cybersecurity".to_string()),
        };
        let result = fallback_cascade(&store, &[0.1], &[0.1], &parsed, Mastercategory::It, 10, Duration::from_secs(1), true).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn broad_mode_dedupes_by_id_keeping_higher_score() {
        let mut hits = HashMap::new();
        hits.insert(
            ("it".to_string(), "qa_automation_engineering".to_string()),
            vec![ScoredVector { id: "dup".to_string(), score: 0.4, metadata: HashMap::new() }],
        );
        hits.insert(
            ("it".to_string(), "qa_manual_testing".to_string()),
            vec![ScoredVector { id: "dup".to_string(), score: 0.8, metadata: HashMap::new() }],
        );
        let store = FixedStore { hits };
        let parsed = ParsedQuery {
            search_type: crate::query::SearchType::Semantic,
            text_for_embedding: "qa automation engineer".to_string(),
            filters: QueryFilters::default(),
            mastercategory: None,
            category: None,
        };
        let ranked = search_broad(&store, &[0.1], &parsed, 10, Duration::from_secs(1)).await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].semantic_score, 0.8);
    }
}
