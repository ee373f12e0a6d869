pub mod designation;
pub mod engine;
pub mod name_search;
pub mod namespace_select;
pub mod query;
pub mod scoring;

pub mod prelude {
    pub use crate::designation::{compare_designations, is_weak_signal, DesignationMatcher, RuleVerdict};
    pub use crate::engine::{
        apply_designation_boost, compile_filters, fallback_cascade, generic_fallback_phrase, post_filter, search,
        search_broad, search_explicit, RankedCandidate, SearchResults,
    };
    pub use crate::name_search::{search_by_name, CandidateNameRepository, NameCandidateRow, NameSearchHit};
    pub use crate::namespace_select::{
        infer_mastercategory_from_keywords, role_family_namespaces, top_five_of_each_index, top_n_namespaces,
    };
    pub use crate::query::{apply_caller_override, parse_query, ParsedQuery, QueryFilters, SearchType};
    pub use crate::scoring::{
        combined_normalized, experience_score, fit_tier, mastercategory_score, role_keyword_overlap_ratio,
        skill_score, FitTier, TierOverrideInputs,
    };
}
