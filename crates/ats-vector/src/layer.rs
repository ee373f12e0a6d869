//! The vector partitioning layer: two logical indexes, deterministic
//! namespace derivation, placeholder-seeded namespace pre-creation, and the
//! per-namespace upsert/query/delete/list operations the search engine
//! consumes.

use std::collections::HashMap;

use ats_core::error::VectorError;
use ats_core::namespace::{derive_namespace, is_placeholder_namespace, placeholder_id, UNCATEGORIZED};
use ats_core::record::Mastercategory;
use ats_classify::{classify_category, classify_mastercategory};
use ats_extract::llm::LlmClient;
use serde_json::json;

use crate::store::{CompiledFilter, ScoredVector, Vector, VectorStore};

/// Deterministic small-magnitude vector used for every namespace placeholder
/// so presence, not content, is the signal.
fn placeholder_vector(dimension: usize, namespace: &str) -> Vector {
    let mut metadata = HashMap::new();
    metadata.insert("type".to_string(), json!("namespace_placeholder"));
    metadata.insert("namespace".to_string(), json!(namespace));
    Vector {
        id: placeholder_id(namespace),
        values: vec![1e-6; dimension],
        metadata,
    }
}

pub struct VectorLayer<S: VectorStore> {
    store: S,
    dimension: usize,
}

impl<S: VectorStore> VectorLayer<S> {
    pub fn new(store: S, dimension: usize) -> Self {
        VectorLayer { store, dimension }
    }

    /// Create both indexes if missing, then pre-create every expected
    /// namespace (plus the always-present `uncategorized`) in each index by
    /// upserting its placeholder vector.
    pub async fn initialize(&self, expected_categories: &[&str]) -> Result<(), VectorError> {
        let existing = self.store.list_indexes().await?;
        for mastercategory in [Mastercategory::It, Mastercategory::NonIt] {
            let index = mastercategory.index_name();
            if !existing.iter().any(|n| n == index) {
                self.store.create_index(index, self.dimension).await?;
            }

            let mut namespaces: Vec<String> = expected_categories
                .iter()
                .map(|c| derive_namespace(c))
                .collect();
            namespaces.push(UNCATEGORIZED.to_string());
            namespaces.sort();
            namespaces.dedup();

            for ns in namespaces {
                let placeholder = placeholder_vector(self.dimension, &ns);
                self.store.upsert(index, &ns, vec![placeholder]).await?;
            }
        }
        Ok(())
    }

    /// Route by mastercategory; derive the category (and thus namespace) via
    /// the classifier if not supplied; attach denormalized metadata to every
    /// vector before bulk-upserting into that single namespace.
    pub async fn upsert(
        &self,
        llm: &dyn LlmClient,
        mut vectors: Vec<Vector>,
        resume_text: &str,
        mastercategory: Mastercategory,
        category: Option<String>,
    ) -> Result<String, VectorError> {
        let resolved_category = match category {
            Some(c) => c,
            None => classify_category(llm, resume_text, mastercategory)
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        };
        let namespace = derive_namespace(&resolved_category);

        for v in &mut vectors {
            v.metadata.insert("category".to_string(), json!(resolved_category));
            v.metadata.insert("mastercategory".to_string(), json!(mastercategory.as_str()));
            v.metadata.insert("namespace".to_string(), json!(namespace));
        }

        self.store
            .upsert(mastercategory.index_name(), &namespace, vectors)
            .await?;
        Ok(namespace)
    }

    pub async fn query(
        &self,
        mastercategory: Mastercategory,
        namespace: &str,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&CompiledFilter>,
    ) -> Result<Vec<ScoredVector>, VectorError> {
        self.store
            .query(mastercategory.index_name(), namespace, query_vector, top_k, filter)
            .await
    }

    pub async fn delete(&self, mastercategory: Mastercategory, namespace: &str, ids: &[String]) -> Result<(), VectorError> {
        self.store.delete(mastercategory.index_name(), namespace, ids).await
    }

    /// Namespaces visible to callers, excluding placeholder bookkeeping
    /// namespaces.
    pub async fn list_namespaces(&self, mastercategory: Mastercategory) -> Result<Vec<String>, VectorError> {
        let stats = self.store.describe_index_stats(mastercategory.index_name()).await?;
        Ok(stats
            .namespaces
            .into_keys()
            .filter(|ns| !is_placeholder_namespace(ns))
            .collect())
    }
}

/// Infer a mastercategory from resume text when the caller supplied neither
/// mastercategory nor category explicitly, used by the broad-mode search
/// path's upsert-time fallback.
pub async fn infer_mastercategory(llm: &dyn LlmClient, resume_text: &str) -> Option<Mastercategory> {
    classify_mastercategory(llm, resume_text).await.ok().flatten()
}
