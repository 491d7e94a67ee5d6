//! Backend access: the taxonomy query seam and its HTTP and in-memory
//! implementations.

mod client;
mod envelope;
mod memory;

use async_trait::async_trait;

use qbank_core::model::{CategoryId, Level, ParentPath};

use crate::error::ApiError;

pub use client::BackendClient;
pub use memory::InMemoryTaxonomy;

/// Source of valid children for a taxonomy node.
#[async_trait]
pub trait TaxonomyBackend: Send + Sync {
    /// Fetch the identifiers at `level` that exist beneath `parent`.
    ///
    /// `parent` must carry exactly the ancestors of `level`: nothing for
    /// subjects, a subject for topics, a subject and topic for subtopics.
    /// An empty result is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures and backend-reported errors.
    async fn query_children(
        &self,
        level: Level,
        parent: &ParentPath,
    ) -> Result<Vec<CategoryId>, ApiError>;
}
