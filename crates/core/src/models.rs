use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

/// A catalog product as returned by the product store.
///
/// Everything except `id` may be missing in the backing documents. Numeric
/// fields that fail to parse deserialize as `None` instead of failing the
/// whole record, and the `*_or_*` accessors supply display defaults.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub price: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub review_count: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "sku")]
    pub model: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    pub fn display_name(&self) -> &str {
        non_empty_or(&self.name, "Item")
    }

    pub fn display_category(&self) -> &str {
        non_empty_or(&self.category, "N/A")
    }

    pub fn price_or_zero(&self) -> f64 {
        self.price.filter(|value| value.is_finite()).unwrap_or(0.0)
    }

    pub fn rating_or_zero(&self) -> f64 {
        self.rating.filter(|value| value.is_finite()).unwrap_or(0.0)
    }

    pub fn stock_or_zero(&self) -> i64 {
        self.stock.unwrap_or(0)
    }

    pub fn is_in_stock(&self) -> bool {
        self.in_stock.unwrap_or(self.stock_or_zero() > 0)
    }

    pub fn formatted_price(&self) -> String {
        format_money(self.price)
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id.clone(),
            name: non_empty(&self.name),
            price: self.price,
            category: non_empty(&self.category),
            image: self.image.clone(),
        }
    }
}

/// Renders a price as `$` plus two decimals; missing or non-finite values render as `$0.00`.
pub fn format_money(value: Option<f64>) -> String {
    match value {
        Some(amount) if amount.is_finite() => format!("${amount:.2}"),
        _ => "$0.00".to_string(),
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Semantic,
    Keyword,
    Hybrid,
}

/// One `(id, similarity)` pair from the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub score: f64,
    pub source: CandidateSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedProduct {
    pub product: Product,
    pub score: f64,
    pub source: CandidateSource,
}

/// Products in rank order. Position in `items` is the rank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RankedResult {
    pub items: Vec<RankedProduct>,
}

impl RankedResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn products(&self) -> Vec<Product> {
        self.items.iter().map(|item| item.product.clone()).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.items.iter().map(|item| item.score).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Highest,
    Lowest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
}

/// Record of the single generation call made for a chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub model: String,
    pub prompt: String,
    pub result: Option<String>,
    pub error: Option<String>,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatDiagnostics {
    pub intent: String,
    pub llm_used: String,
    pub llm_model: String,
    pub llm_error: String,
    pub attempt: Option<ProviderAttempt>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub answer: String,
    pub products: Vec<ProductSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<ChatDiagnostics>,
}

impl ChatResponse {
    pub fn answer_only(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            products: Vec::new(),
            diagnostics: None,
        }
    }

    pub fn with_products(answer: impl Into<String>, products: &[Product]) -> Self {
        Self {
            answer: answer.into(),
            products: products.iter().map(Product::summary).collect(),
            diagnostics: None,
        }
    }
}
