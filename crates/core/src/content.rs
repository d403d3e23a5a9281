//! Draft listing content for a product: description, highlights, SEO title,
//! tags, FAQs, colors and category.
//!
//! The configured language model is asked for a JSON object first. Every key
//! it returns with the right shape replaces the template value; anything
//! missing, mistyped or unparseable keeps the template.

use crate::providers::TextGenerator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const DEFAULT_PRODUCT_NAME: &str = "This product";
pub const FALLBACK_CATEGORY: &str = "Other";

const CATEGORY_RULES: [(&[&str], &str); 4] = [
    (&["shoe", "sneaker", "boot"], "Shoes"),
    (&["shirt", "hoodie", "jacket"], "Clothing"),
    (&["watch", "belt", "bag"], "Accessories"),
    (&["phone", "laptop", "headphone"], "Electronics"),
];

const COLOR_SWATCHES: [(&str, &str); 11] = [
    ("black", "#111827"),
    ("white", "#f8fafc"),
    ("red", "#ef4444"),
    ("blue", "#2563eb"),
    ("green", "#22c55e"),
    ("yellow", "#facc15"),
    ("orange", "#f97316"),
    ("pink", "#ec4899"),
    ("gray", "#9ca3af"),
    ("grey", "#9ca3af"),
    ("brown", "#a16207"),
];

const DEFAULT_COLORS: [&str; 3] = ["#111827", "#2563eb", "#e5e7eb"];

/// What the admin typed so far. Every field may be blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentRequest {
    pub name: String,
    pub category: String,
    pub price: String,
    pub description: String,
    pub highlights: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductContent {
    pub description: String,
    pub highlights: Vec<String>,
    pub seo_title: String,
    pub tags: Vec<String>,
    pub faqs: Vec<String>,
    pub colors: Vec<String>,
    pub category: String,
}

/// Asks the generator for content and merges it over the template draft.
/// Generation failures are logged and the template is returned as-is.
pub async fn draft<G>(generator: &G, request: &ContentRequest) -> ProductContent
where
    G: TextGenerator + Send + Sync + ?Sized,
{
    let template = template(request);
    let prompt = content_prompt(request, &template.category);

    match generator.generate(&prompt, None).await {
        Ok(generation) => merge_generated(&generation.text, template),
        Err(error) => {
            debug!(%error, "content generation unavailable, using template");
            template
        }
    }
}

pub fn template(request: &ContentRequest) -> ProductContent {
    let name = non_blank(&request.name).unwrap_or(DEFAULT_PRODUCT_NAME);
    let category = guess_category(name, request.category.trim());
    let description = match non_blank(&request.description) {
        Some(description) => description.to_string(),
        None => format!(
            "{name} is a modern {} item designed for daily use. \
It balances comfort, durability, and value.",
            category.to_lowercase()
        ),
    };

    ProductContent {
        description,
        highlights: vec![
            format!("Premium {} build", category.to_lowercase()),
            "Comfort-focused design".to_string(),
            "Durable everyday materials".to_string(),
            format!("{name} ships fast"),
        ],
        seo_title: format!("Buy {name} Online | {category} at E-Shop"),
        tags: tags(name, &category),
        faqs: vec![
            format!("Is {name} good for gifting? Yes, it is a popular gift choice."),
            "How long is shipping? Standard delivery is 3-5 business days.".to_string(),
            "Can I return it? Returns are accepted within 30 days.".to_string(),
        ],
        colors: detect_colors(name),
        category,
    }
}

/// Keyword match on the name; otherwise the given category, else `Other`.
pub fn guess_category(name: &str, fallback: &str) -> String {
    let lowered = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(_, category)| category.to_string())
        .or_else(|| non_blank(fallback).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

/// Hex swatches for color words in the name, in swatch-table order.
pub fn detect_colors(name: &str) -> Vec<String> {
    let lowered = name.to_lowercase();
    let colors: Vec<String> = COLOR_SWATCHES
        .iter()
        .filter(|(word, _)| lowered.contains(word))
        .map(|(_, hex)| hex.to_string())
        .collect();
    if colors.is_empty() {
        DEFAULT_COLORS.iter().map(|hex| hex.to_string()).collect()
    } else {
        colors
    }
}

fn tags(name: &str, category: &str) -> Vec<String> {
    let base = [category.to_lowercase(), "gift".into(), "bestseller".into(), "new".into()];
    let name_words = name.split_whitespace().take(2).map(str::to_lowercase);

    let mut tags: Vec<String> = Vec::new();
    for tag in base.into_iter().chain(name_words) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

pub fn content_prompt(request: &ContentRequest, category: &str) -> String {
    let name = non_blank(&request.name).unwrap_or(DEFAULT_PRODUCT_NAME);
    format!(
        "Generate product content for this item. Return JSON only with keys: \
description (string), highlights (array), seoTitle (string), tags (array), \
faqs (array), colors (array of hex strings), category (string).\n\n\
Name: {name}\nCategory: {category}\nPrice: {}\nDescription: {}\nHighlights: {}\n",
        request.price, request.description, request.highlights
    )
}

/// Overlays the generated JSON object on `template`, key by key.
pub fn merge_generated(raw: &str, template: ProductContent) -> ProductContent {
    let Some(fields) = json_object(raw) else {
        debug!("generated content is not a JSON object, using template");
        return template;
    };

    ProductContent {
        description: string_field(&fields, "description").unwrap_or(template.description),
        highlights: list_field(&fields, "highlights").unwrap_or(template.highlights),
        seo_title: string_field(&fields, "seoTitle").unwrap_or(template.seo_title),
        tags: list_field(&fields, "tags").unwrap_or(template.tags),
        faqs: list_field(&fields, "faqs").unwrap_or(template.faqs),
        colors: list_field(&fields, "colors").unwrap_or(template.colors),
        category: string_field(&fields, "category").unwrap_or(template.category),
    }
}

/// Parses the text as a JSON object, tolerating prose or code fences around it.
fn json_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    if let Ok(Value::Object(fields)) = serde_json::from_str(trimmed) {
        return Some(fields);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&trimmed[start..=end]) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn list_field(fields: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = fields.get(key)?.as_array()?;
    let values: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Object(entry) => faq_text(entry),
            _ => None,
        })
        .filter(|value| !value.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Models often return FAQs as `{question, answer}` pairs.
fn faq_text(entry: &Map<String, Value>) -> Option<String> {
    let question = entry.get("question").and_then(Value::as_str)?;
    let answer = entry.get("answer").and_then(Value::as_str).unwrap_or_default();
    Some(format!("{} {}", question.trim(), answer.trim()).trim().to_string())
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
