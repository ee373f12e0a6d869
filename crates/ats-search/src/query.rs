//! Free-text query parsing: an LLM call constrained to a fixed JSON shape,
//! with regex-based defensive fallbacks when the response won't parse.

use std::sync::OnceLock;

use ats_core::record::Mastercategory;
use ats_extract::json_recovery::recover_json_object;
use ats_extract::llm::{IsolatedRequest, LlmClient};
use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Semantic,
    Name,
    Hybrid,
}

impl SearchType {
    fn parse(s: &str) -> Option<SearchType> {
        match s.trim().to_lowercase().as_str() {
            "semantic" => Some(SearchType::Semantic),
            "name" => Some(SearchType::Name),
            "hybrid" => Some(SearchType::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryFilters {
    pub designation: Option<String>,
    pub must_have_all: Vec<String>,
    pub must_have_one_of_groups: Vec<Vec<String>>,
    pub min_experience: Option<u32>,
    pub max_experience: Option<u32>,
    pub location: Option<String>,
    pub candidate_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub search_type: SearchType,
    pub text_for_embedding: String,
    pub filters: QueryFilters,
    pub mastercategory: Option<Mastercategory>,
    pub category: Option<String>,
}

impl ParsedQuery {
    /// The structure the parser degrades to when both the LLM call and the
    /// regex fallbacks have nothing usable to offer.
    fn default_for(raw_query: &str) -> ParsedQuery {
        ParsedQuery {
            search_type: SearchType::Semantic,
            text_for_embedding: raw_query.trim().to_string(),
            filters: QueryFilters::default(),
            mastercategory: None,
            category: None,
        }
    }
}

/// Canonical embedding-text ordering: designation, then skills, then
/// experience, then location, so embeddings for semantically equivalent
/// queries land close together regardless of how the recruiter phrased them.
fn build_text_for_embedding(filters: &QueryFilters, fallback: &str) -> String {
    let mut parts = Vec::new();
    if let Some(d) = &filters.designation {
        parts.push(d.clone());
    }
    if !filters.must_have_all.is_empty() {
        parts.push(filters.must_have_all.join(" "));
    }
    for group in &filters.must_have_one_of_groups {
        if !group.is_empty() {
            parts.push(group.join(" "));
        }
    }
    if let Some(min) = filters.min_experience {
        parts.push(format!("{min} years experience"));
    }
    if let Some(loc) = &filters.location {
        parts.push(loc.clone());
    }
    if parts.is_empty() {
        fallback.trim().to_string()
    } else {
        parts.join(" ")
    }
}

fn name_token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z'.-]+$").unwrap())
}

/// A query looks name-only when it is 2-3 bare personal-name-shaped tokens
/// with no digits, role words, or skill-ish punctuation.
fn looks_like_name_only(raw: &str) -> bool {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    (2..=3).contains(&tokens.len()) && tokens.iter().all(|t| name_token_pattern().is_match(t))
}

fn experience_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(?:\+|plus)?\s*(?:-|to|–)?\s*(\d+)?\s*\+?\s*years?").unwrap()
    })
}

/// Parse "with 5 years", "5+ years", "5-8 years" style experience phrases
/// out of raw text. Used both as a defensive fallback when JSON recovery
/// fails entirely, and to sanity-check what the LLM returned.
fn regex_experience(raw: &str) -> (Option<u32>, Option<u32>) {
    let Some(caps) = experience_pattern().captures(raw) else {
        return (None, None);
    };
    let min: Option<u32> = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let max: Option<u32> = caps.get(2).and_then(|m| m.as_str().parse().ok());
    if raw.contains('+') || raw.to_lowercase().contains("plus") {
        (min, None)
    } else {
        (min, max.or(min))
    }
}

fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list_field(obj: &Value, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn u32_field(obj: &Value, key: &str) -> Option<u32> {
    obj.get(key).and_then(|v| v.as_u64()).map(|n| n as u32)
}

fn filters_from_json(obj: &Value) -> QueryFilters {
    let filters_obj = obj.get("filters").cloned().unwrap_or(Value::Null);
    let groups = filters_obj
        .get("must_have_one_of_groups")
        .and_then(Value::as_array)
        .map(|groups| {
            groups
                .iter()
                .map(|g| {
                    g.as_array()
                        .map(|inner| inner.iter().filter_map(Value::as_str).map(str::to_string).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    QueryFilters {
        designation: string_field(&filters_obj, "designation"),
        must_have_all: string_list_field(&filters_obj, "must_have_all"),
        must_have_one_of_groups: groups,
        min_experience: u32_field(&filters_obj, "min_experience"),
        max_experience: u32_field(&filters_obj, "max_experience"),
        location: string_field(&filters_obj, "location"),
        candidate_name: string_field(&filters_obj, "candidate_name"),
    }
}

fn parse_from_recovered(obj: &Value, raw_query: &str) -> ParsedQuery {
    let search_type = obj
        .get("search_type")
        .and_then(Value::as_str)
        .and_then(SearchType::parse)
        .unwrap_or(SearchType::Semantic);
    let filters = filters_from_json(obj);
    let text_for_embedding = string_field(obj, "text_for_embedding")
        .unwrap_or_else(|| build_text_for_embedding(&filters, raw_query));

    ParsedQuery {
        search_type,
        text_for_embedding,
        filters,
        mastercategory: None,
        category: None,
    }
}

/// Field-by-field regex reconstruction used only when the LLM response has
/// nothing recoverable as JSON at all.
fn parse_from_regex_fallback(raw_query: &str) -> ParsedQuery {
    if looks_like_name_only(raw_query) {
        return ParsedQuery {
            search_type: SearchType::Name,
            text_for_embedding: raw_query.trim().to_string(),
            filters: QueryFilters {
                candidate_name: Some(raw_query.trim().to_string()),
                ..QueryFilters::default()
            },
            mastercategory: None,
            category: None,
        };
    }

    let (min_experience, max_experience) = regex_experience(raw_query);
    let filters = QueryFilters {
        min_experience,
        max_experience,
        ..QueryFilters::default()
    };
    let search_type = if min_experience.is_some() { SearchType::Hybrid } else { SearchType::Semantic };
    ParsedQuery {
        search_type,
        text_for_embedding: build_text_for_embedding(&filters, raw_query),
        filters,
        mastercategory: None,
        category: None,
    }
}

const PARSE_PROMPT_TEMPLATE: &str = r#"Convert this recruiter query into a JSON object with exactly this shape:
{"search_type": "semantic"|"name"|"hybrid", "text_for_embedding": string,
 "filters": {"designation": string|null, "must_have_all": [string], "must_have_one_of_groups": [[string]],
             "min_experience": number|null, "max_experience": number|null,
             "location": string|null, "candidate_name": string|null}}
Rules: a query of 2-3 bare personal-name tokens with no skills or role words is "name".
A query with designation + skills + experience is "hybrid". Otherwise "semantic".
Do not invent skills or experience that are not stated. Respond with only the JSON object.

Query: "#;

/// Parse a free-text recruiter query. Tries the LLM first; recovers its JSON
/// defensively; falls back to pure regex reconstruction if nothing
/// recoverable comes back at all.
pub async fn parse_query(llm: &dyn LlmClient, raw_query: &str) -> ParsedQuery {
    let prompt = format!("{PARSE_PROMPT_TEMPLATE}{raw_query}");
    let response = match llm.generate(&IsolatedRequest::new("query-parser-model", prompt)).await {
        Ok(r) => r,
        Err(_) => return parse_from_regex_fallback(raw_query),
    };

    match recover_json_object(&response) {
        Some(obj) => parse_from_recovered(&obj, raw_query),
        None => {
            let fallback = parse_from_regex_fallback(raw_query);
            if fallback.filters.min_experience.is_none() && !looks_like_name_only(raw_query) {
                ParsedQuery::default_for(raw_query)
            } else {
                fallback
            }
        }
    }
}

/// Apply caller-supplied (mastercategory, category), overriding whatever the
/// parser inferred. If the caller names a category but the parser decided
/// `name`, force `semantic` and drop the stale candidate_name filter.
pub fn apply_caller_override(
    mut parsed: ParsedQuery,
    mastercategory: Option<Mastercategory>,
    category: Option<String>,
) -> ParsedQuery {
    if mastercategory.is_some() {
        parsed.mastercategory = mastercategory;
    }
    if category.is_some() {
        if parsed.search_type == SearchType::Name {
            parsed.search_type = SearchType::Semantic;
            parsed.filters.candidate_name = None;
        }
        parsed.category = category;
    }
    parsed
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

    #[tokio::test]
    async fn s1_hybrid_query_parses_filters_in_canonical_order() {
        let llm = ScriptedLlm(
            r#"{"search_type": "hybrid", "text_for_embedding": "python developer python django 5 years experience",
                "filters": {"designation": "python developer", "must_have_all": ["python", "django"],
                            "must_have_one_of_groups": [], "min_experience": 5, "max_experience": null,
                            "location": null, "candidate_name": null}}"#
                .to_string(),
        );
        let parsed = parse_query(&llm, "python developer with python django 5 years experience").await;
        assert_eq!(parsed.search_type, SearchType::Hybrid);
        assert_eq!(parsed.filters.must_have_all, vec!["python", "django"]);
        assert_eq!(parsed.filters.min_experience, Some(5));
    }

    #[tokio::test]
    async fn total_parse_failure_falls_back_to_semantic_default() {
        let llm = ScriptedLlm("not json and not a name query whatsoever either".to_string());
        let parsed = parse_query(&llm, "tell me about senior engineers with great culture fit").await;
        assert_eq!(parsed.search_type, SearchType::Semantic);
    }

    #[tokio::test]
    async fn regex_fallback_recognizes_name_only_query() {
        let llm = ScriptedLlm("garbage non-json response".to_string());
        let parsed = parse_query(&llm, "John Smith").await;
        assert_eq!(parsed.search_type, SearchType::Name);
        assert_eq!(parsed.filters.candidate_name, Some("John Smith".to_string()));
    }

    #[test]
    fn caller_override_forces_semantic_and_clears_name_when_category_given() {
        let parsed = ParsedQuery {
            search_type: SearchType::Name,
            text_for_embedding: "John Smith".to_string(),
            filters: QueryFilters {
                candidate_name: Some("John Smith".to_string()),
                ..QueryFilters::default()
            },
            mastercategory: None,
            category: None,
        };
        let overridden = apply_caller_override(
            parsed,
            Some(Mastercategory::It),
            Some("QA Automation Engineering".to_string()),
        );
        assert_eq!(overridden.search_type, SearchType::Semantic);
        assert_eq!(overridden.filters.candidate_name, None);
        assert_eq!(overridden.mastercategory, Some(Mastercategory::It));
    }

    #[test]
    fn embedding_text_follows_canonical_field_order() {
        let filters = QueryFilters {
            designation: Some("python developer".to_string()),
            must_have_all: vec!["python".to_string(), "django".to_string()],
            location: Some("new york".to_string()),
            min_experience: Some(5),
            ..QueryFilters::default()
        };
        let text = build_text_for_embedding(&filters, "fallback");
        let designation_pos = text.find("python developer").unwrap();
        let skills_pos = text.find("python django").unwrap();
        let experience_pos = text.find("5 years").unwrap();
        let location_pos = text.find("new york").unwrap();
        assert!(designation_pos < skills_pos);
        assert!(skills_pos < experience_pos);
        assert!(experience_pos < location_pos);
    }
}
