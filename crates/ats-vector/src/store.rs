//! The vector-DB collaborator contract. The concrete client (Pinecone or
//! anything wire-compatible) is external; this crate only needs the shape:
//! create/list indexes, and per-index upsert/query/delete/stats scoped to a
//! namespace.

use async_trait::async_trait;
use std::collections::HashMap;

use ats_core::error::VectorError;

#[derive(Debug, Clone)]
pub struct Vector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ScoredVector {
    pub id: String,
    pub score: f32,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub namespaces: HashMap<String, usize>,
    pub total_vector_count: usize,
}

/// A compiled metadata filter, the target of [`crate::filter::compile`].
/// Kept as a `serde_json::Value` because the wire shape IS the algebra: the
/// backend consumes exactly this nested `$and`/`$or`/`$in`/`$gte`/`$lte`
/// structure.
pub type CompiledFilter = serde_json::Value;

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn create_index(&self, name: &str, dimension: usize) -> Result<(), VectorError>;
    async fn list_indexes(&self) -> Result<Vec<String>, VectorError>;
    async fn upsert(&self, index: &str, namespace: &str, vectors: Vec<Vector>) -> Result<(), VectorError>;
    async fn query(
        &self,
        index: &str,
        namespace: &str,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&CompiledFilter>,
    ) -> Result<Vec<ScoredVector>, VectorError>;
    async fn delete(&self, index: &str, namespace: &str, ids: &[String]) -> Result<(), VectorError>;
    async fn describe_index_stats(&self, index: &str) -> Result<IndexStats, VectorError>;
}
