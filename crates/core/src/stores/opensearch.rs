use crate::keyword::{KeywordQuery, KEYWORD_FIELDS};
use crate::traits::ProductStore;
use crate::{PriceDirection, Product, StoreError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Product store over an OpenSearch index whose documents are products.
pub struct OpenSearchCatalog {
    client: Arc<Client>,
    endpoint: String,
    index_name: String,
}

impl OpenSearchCatalog {
    pub fn new(endpoint: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            index_name: index_name.into(),
        }
    }

    async fn search(&self, body: Value) -> Result<Vec<Product>, StoreError> {
        let response = self
            .client
            .post(format!("{}/{}/_search", self.endpoint, self.index_name))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "opensearch".to_string(),
                details: response.status().to_string(),
            });
        }

        let response_json: Value = response.json().await?;
        Ok(products_from_hits(&response_json))
    }
}

#[async_trait]
impl ProductStore for OpenSearchCatalog {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .head(format!("{}/{}", self.endpoint, self.index_name))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::NotReady(format!(
                "index `{}` does not exist",
                self.index_name
            ))),
            status => Err(StoreError::BackendResponse {
                backend: "opensearch".to_string(),
                details: status.to_string(),
            }),
        }
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.search(json!({
            "size": ids.len(),
            "query": {"ids": {"values": ids}}
        }))
        .await
    }

    async fn find_all(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        self.search(json!({
            "size": limit,
            "query": {"match_all": {}}
        }))
        .await
    }

    async fn find_sorted_by_price(
        &self,
        direction: PriceDirection,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError> {
        self.search(price_sort_body(direction, limit)).await
    }

    async fn find_by_keyword(
        &self,
        query: &KeywordQuery,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.search(keyword_body(query, limit)).await
    }
}

pub(crate) fn price_sort_body(direction: PriceDirection, limit: usize) -> Value {
    let order = match direction {
        PriceDirection::Highest => "desc",
        PriceDirection::Lowest => "asc",
    };
    json!({
        "size": limit,
        "query": {"match_all": {}},
        "sort": [{"price": {"order": order, "missing": 0}}]
    })
}

/// One case-insensitive wildcard clause per token and field, any may match.
pub(crate) fn keyword_body(query: &KeywordQuery, limit: usize) -> Value {
    let should: Vec<Value> = query
        .tokens()
        .iter()
        .flat_map(|token| {
            let pattern = format!("*{}*", escape_wildcard(&token.to_lowercase()));
            KEYWORD_FIELDS.iter().map(move |field| {
                json!({
                    "wildcard": {
                        (*field): {"value": pattern.clone(), "case_insensitive": true}
                    }
                })
            })
        })
        .collect();

    json!({
        "size": limit,
        "query": {"bool": {"should": should, "minimum_should_match": 1}}
    })
}

fn escape_wildcard(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for ch in token.chars() {
        if matches!(ch, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn products_from_hits(response_json: &Value) -> Vec<Product> {
    let hits = response_json
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut products = Vec::with_capacity(hits.len());
    for raw in hits {
        let id = raw
            .pointer("/_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let mut source = raw.get("_source").cloned().unwrap_or_else(|| json!({}));
        if let Some(fields) = source.as_object_mut() {
            fields.entry("id").or_insert_with(|| Value::String(id.clone()));
        }

        match serde_json::from_value::<Product>(source) {
            Ok(product) => products.push(product),
            Err(error) => warn!(%error, id = %id, "skipping malformed product document"),
        }
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_sort_treats_missing_price_as_zero() {
        let body = price_sort_body(PriceDirection::Highest, 5);
        assert_eq!(body["size"], 5);
        assert_eq!(body["sort"][0]["price"]["order"], "desc");
        assert_eq!(body["sort"][0]["price"]["missing"], 0);

        let lowest = price_sort_body(PriceDirection::Lowest, 1);
        assert_eq!(lowest["sort"][0]["price"]["order"], "asc");
        assert_eq!(lowest["sort"][0]["price"]["missing"], 0);
    }

    #[test]
    fn keyword_body_covers_every_token_and_field() {
        let body = keyword_body(&KeywordQuery::parse("Lamp de*sk"), 10);
        let should = body["query"]["bool"]["should"].as_array().expect("should clauses");

        assert_eq!(should.len(), 2 * KEYWORD_FIELDS.len());
        assert_eq!(should[0]["wildcard"]["name"]["value"], "*lamp*");
        assert_eq!(should[0]["wildcard"]["name"]["case_insensitive"], true);
        assert_eq!(should[7]["wildcard"]["tags"]["value"], "*de\\*sk*");
    }

    #[test]
    fn hits_fall_back_to_document_id() {
        let response = json!({
            "hits": {"hits": [
                {"_id": "p-1", "_source": {"name": "Desk Lamp", "price": 20}},
                {"_id": "p-2", "_source": {"id": "custom", "name": "Mug"}},
                {"_id": "p-3", "_source": {"name": ["not", "a", "string"]}}
            ]}
        });

        let products = products_from_hits(&response);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "p-1");
        assert_eq!(products[0].price, Some(20.0));
        assert_eq!(products[1].id, "custom");
    }
}
