use crate::embeddings::{cosine_similarity, product_embedding_text, Embedder};
use crate::keyword::KeywordQuery;
use crate::traits::{ProductStore, VectorIndex};
use crate::{PriceDirection, Product, SearchError, SearchHit, StoreError};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Product store over a catalog loaded once into memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Vec<Product>,
}

impl MemoryCatalog {
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Reads a JSON array of products. `_id` is accepted in place of `id`.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), products = products.len(), "catalog loaded");
        Ok(Self::from_products(products))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl ProductStore for MemoryCatalog {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .products
            .iter()
            .filter(|product| ids.contains(&product.id))
            .cloned()
            .collect())
    }

    async fn find_all(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.iter().take(limit).cloned().collect())
    }

    async fn find_sorted_by_price(
        &self,
        direction: PriceDirection,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError> {
        let mut sorted = self.products.clone();
        match direction {
            PriceDirection::Lowest => {
                sorted.sort_by(|left, right| left.price_or_zero().total_cmp(&right.price_or_zero()))
            }
            PriceDirection::Highest => {
                sorted.sort_by(|left, right| right.price_or_zero().total_cmp(&left.price_or_zero()))
            }
        }
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn find_by_keyword(
        &self,
        query: &KeywordQuery,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError> {
        let Some(pattern) = query.compile()? else {
            return Ok(Vec::new());
        };

        Ok(self
            .products
            .iter()
            .filter(|product| {
                pattern.is_match(&product.name)
                    || pattern.is_match(&product.description)
                    || pattern.is_match(&product.category)
                    || product.tags.iter().any(|tag| pattern.is_match(tag))
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Brute-force cosine index with one embedding per product.
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorIndex {
    entries: Vec<(String, Vec<f32>)>,
}

impl MemoryVectorIndex {
    pub fn build<E: Embedder + ?Sized>(products: &[Product], embedder: &E) -> Self {
        let entries = products
            .iter()
            .map(|product| (product.id.clone(), embedder.embed(&product_embedding_text(product))))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn ensure_ready(&self) -> Result<(), SearchError> {
        if self.entries.is_empty() {
            return Err(SearchError::NotReady("vector index is empty".to_string()));
        }
        Ok(())
    }

    async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|(id, vector)| SearchHit {
                id: id.clone(),
                score: cosine_similarity(query_vector, vector),
            })
            .collect();
        // stable: equal scores keep catalog order
        hits.sort_by(|left, right| right.score.total_cmp(&left.score));
        hits.truncate(k);
        Ok(hits)
    }
}
