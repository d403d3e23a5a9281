use crate::keyword::KeywordQuery;
use crate::{PriceDirection, Product, SearchError, SearchHit, StoreError};
use async_trait::async_trait;

#[async_trait]
pub trait VectorIndex {
    async fn ensure_ready(&self) -> Result<(), SearchError> {
        Ok(())
    }

    /// Nearest products for `query_vector`, best first. May return fewer than `k`.
    async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchHit>, SearchError>;
}

#[async_trait]
pub trait ProductStore {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Order of the returned products is unspecified.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, StoreError>;

    async fn find_all(&self, limit: usize) -> Result<Vec<Product>, StoreError>;

    /// Extreme first: most expensive for `Highest`, cheapest for `Lowest`.
    async fn find_sorted_by_price(
        &self,
        direction: PriceDirection,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError>;

    async fn find_by_keyword(
        &self,
        query: &KeywordQuery,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError>;
}
