//! Name search: token + phonetic matching against a candidate-name
//! repository, entirely independent of the vector store (S5 testable
//! property: a `name`-typed query with a non-empty candidate name never
//! touches the vector DB).

use async_trait::async_trait;

use ats_core::error::RepositoryError;
use ats_core::soundex::{soundex, soundex_prefix_matches};

use crate::scoring::FitTier;

/// The minimal shape the name-search path needs from the resume repository.
#[derive(Debug, Clone)]
pub struct NameCandidateRow {
    pub id: i64,
    pub candidate_name: String,
}

/// Repository seam the name-search path consumes. The real implementation
/// runs a SQL disjunction; this trait only fixes its result shape.
#[async_trait]
pub trait CandidateNameRepository: Send + Sync {
    async fn find_by_name_tokens(&self, normalized_name: &str, tokens: &[String]) -> Result<Vec<NameCandidateRow>, RepositoryError>;
}

#[derive(Debug, Clone)]
pub struct NameSearchHit {
    pub id: i64,
    pub candidate_name: String,
    pub score: f32,
    pub fit_tier: FitTier,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Score one candidate row against the tokenized, normalized query name per
/// the documented tier table.
fn score_candidate(query_normalized: &str, query_tokens: &[String], row: &NameCandidateRow) -> f32 {
    let candidate_normalized = normalize_name(&row.candidate_name);
    if candidate_normalized == query_normalized {
        return 1.0;
    }
    if candidate_normalized.contains(query_normalized) || query_normalized.contains(candidate_normalized.as_str()) {
        return 0.8;
    }

    let candidate_tokens: Vec<&str> = candidate_normalized.split_whitespace().collect();
    let token_hits = query_tokens
        .iter()
        .filter(|qt| candidate_tokens.iter().any(|ct| ct.contains(qt.as_str())))
        .count();
    if token_hits > 0 {
        return 0.6 * (token_hits as f32 / query_tokens.len() as f32);
    }

    if soundex(&candidate_normalized) == soundex(query_normalized) {
        return 0.5;
    }
    if soundex_prefix_matches(&candidate_normalized, query_normalized) {
        return 0.4;
    }
    let any_token_phonetic = query_tokens
        .iter()
        .filter(|t| t.len() > 2)
        .any(|qt| candidate_tokens.iter().any(|ct| soundex(ct) == soundex(qt)));
    if any_token_phonetic {
        return 0.3;
    }

    0.0
}

fn tier_for_name_score(score: f32) -> FitTier {
    if score >= 0.9 {
        FitTier::Perfect
    } else if score >= 0.7 {
        FitTier::Good
    } else if score >= 0.5 {
        FitTier::Partial
    } else {
        FitTier::Low
    }
}

/// Run the name-search path end to end: tokenize, fetch candidate rows,
/// score, and sort descending.
pub async fn search_by_name(
    repo: &dyn CandidateNameRepository,
    query_name: &str,
) -> Result<Vec<NameSearchHit>, RepositoryError> {
    let normalized = normalize_name(query_name);
    let tokens: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();

    let rows = repo.find_by_name_tokens(&normalized, &tokens).await?;

    let mut hits: Vec<NameSearchHit> = rows
        .into_iter()
        .map(|row| {
            let score = score_candidate(&normalized, &tokens, &row);
            NameSearchHit { id: row.id, candidate_name: row.candidate_name.clone(), score, fit_tier: tier_for_name_score(score) }
        })
        .filter(|hit| hit.score > 0.0)
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRepository(Vec<NameCandidateRow>);

    #[async_trait]
    impl CandidateNameRepository for FixedRepository {
        async fn find_by_name_tokens(&self, _normalized_name: &str, _tokens: &[String]) -> Result<Vec<NameCandidateRow>, RepositoryError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn s2_name_search_orders_exact_then_token_then_phonetic() {
        let repo = FixedRepository(vec![
            NameCandidateRow { id: 1, candidate_name: "John Smith".to_string() },
            NameCandidateRow { id: 2, candidate_name: "Jon Smyth".to_string() },
            NameCandidateRow { id: 3, candidate_name: "Mary John".to_string() },
        ]);
        let hits = search_by_name(&repo, "John Smith").await.unwrap();
        assert_eq!(hits[0].id, 1);
        assert_eq!(hits[0].score, 1.0);
        assert_eq!(hits[0].fit_tier, FitTier::Perfect);

        let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
        assert!(ids.contains(&2));
        assert!(ids.contains(&3));
    }

    #[test]
    fn exact_full_name_scores_one() {
        let row = NameCandidateRow { id: 1, candidate_name: "Ada Lovelace".to_string() };
        assert_eq!(score_candidate("ada lovelace", &["ada".into(), "lovelace".into()], &row), 1.0);
    }
}
