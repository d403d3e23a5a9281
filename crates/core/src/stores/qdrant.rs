use crate::traits::VectorIndex;
use crate::{SearchError, SearchHit};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Vector index over a Qdrant collection holding one point per product.
pub struct QdrantIndex {
    endpoint: String,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantIndex {
    pub fn new(endpoint: impl Into<String>, collection: impl Into<String>, vector_size: usize) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_ready(&self) -> Result<(), SearchError> {
        let response = self
            .client
            .get(format!("{}/collections/{}", self.endpoint, self.collection))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(SearchError::NotReady(format!(
                "collection `{}` does not exist",
                self.collection
            ))),
            status => Err(SearchError::BackendResponse {
                backend: "qdrant".to_string(),
                details: status.to_string(),
            }),
        }
    }

    async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchHit>, SearchError> {
        if query_vector.len() != self.vector_size {
            return Err(SearchError::Request(format!(
                "query vector dim {} is not {}",
                query_vector.len(),
                self.vector_size
            )));
        }

        let response = self
            .client
            .post(format!(
                "{}/collections/{}/points/search",
                self.endpoint, self.collection
            ))
            .json(&json!({
                "vector": query_vector,
                "limit": k,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        Ok(hits_from_response(&parsed))
    }
}

/// Product id comes from the `product_id` payload field, else the point id.
fn hits_from_response(parsed: &Value) -> Vec<SearchHit> {
    let hits = parsed
        .pointer("/result")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    hits.iter()
        .filter_map(|hit| {
            let id = hit
                .pointer("/payload/product_id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| match hit.get("id")? {
                    Value::String(id) => Some(id.clone()),
                    Value::Number(id) => Some(id.to_string()),
                    _ => None,
                })?;
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
            Some(SearchHit { id, score })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ids_prefer_payload_product_id() {
        let parsed = json!({
            "result": [
                {"id": 7, "score": 0.91, "payload": {"product_id": "lamp-1"}},
                {"id": "5c3e0b2a-0000-0000-0000-000000000000", "score": 0.55, "payload": {}},
                {"id": 12, "score": 0.40}
            ]
        });

        let hits = hits_from_response(&parsed);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "lamp-1");
        assert_eq!(hits[1].id, "5c3e0b2a-0000-0000-0000-000000000000");
        assert_eq!(hits[2].id, "12");
        assert!((hits[0].score - 0.91).abs() < 1e-9);
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected_before_any_request() {
        let index = QdrantIndex::new("http://127.0.0.1:9", "products", 4);
        let error = index.search(&[0.1, 0.2], 3).await.expect_err("dimension mismatch");
        assert!(matches!(error, SearchError::Request(_)));
    }
}
