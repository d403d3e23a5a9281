use crate::{PriceDirection, Product};
use serde::{Deserialize, Serialize};

const FULL_CATALOG_PHRASES: [&str; 9] = [
    "all products",
    "all items",
    "all your products",
    "full product list",
    "full catalog",
    "entire catalog",
    "every product",
    "whole catalog",
    "from my database",
];

const HIGHEST_PRICE_PHRASES: [&str; 5] = [
    "most expensive",
    "highest price",
    "highest priced",
    "priciest",
    "costliest",
];

const LOWEST_PRICE_PHRASES: [&str; 6] = [
    "cheapest",
    "lowest price",
    "lowest priced",
    "least expensive",
    "budget product",
    "most affordable",
];

/// Words that turn a bare product-name mention into a detail lookup.
pub const DETAIL_WORDS: [&str; 11] = [
    "spec",
    "model",
    "sku",
    "price",
    "stock",
    "rating",
    "feature",
    "highlight",
    "description",
    "detail",
    "color",
];

pub const GREETING_PHRASES: [&str; 7] = [
    "hi",
    "hello",
    "hey",
    "yo",
    "hiya",
    "good morning",
    "good evening",
];

pub const THANKS_PHRASES: [&str; 8] = [
    "thanks",
    "thank you",
    "thx",
    "ok",
    "okay",
    "great",
    "nice",
    "cool",
];

const GENERIC_HELP_PHRASES: [&str; 7] = [
    "help",
    "what can you do",
    "what u can do",
    "what u cn do",
    "what do you do",
    "how do you work",
    "who are you",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Intent {
    FullCatalog,
    PriceExtreme { direction: PriceDirection },
    NamedProductDetail { product: Box<Product> },
    Greeting,
    Thanks,
    GenericHelp,
    None,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::FullCatalog => "full_catalog",
            Intent::PriceExtreme {
                direction: PriceDirection::Highest,
            } => "price_extreme_max",
            Intent::PriceExtreme {
                direction: PriceDirection::Lowest,
            } => "price_extreme_min",
            Intent::NamedProductDetail { .. } => "named_product_detail",
            Intent::Greeting => "greeting",
            Intent::Thanks => "thanks",
            Intent::GenericHelp => "generic_help",
            Intent::None => "none",
        }
    }

    pub fn is_conversational(&self) -> bool {
        matches!(self, Intent::Greeting | Intent::Thanks | Intent::GenericHelp)
    }
}

/// True when the question asks about a product attribute and is worth a
/// catalog scan for a named-product match.
pub fn mentions_detail_word(question: &str) -> bool {
    let lowered = question.to_lowercase();
    contains_any(&lowered, &DETAIL_WORDS)
}

/// Classifies a question against fixed phrase sets, first match wins:
/// full catalog, price extreme, named product detail, then pleasantries.
///
/// `catalog` is only consulted for the named-product rule; pass an empty
/// slice when the question has no detail word.
pub fn classify(question: &str, catalog: &[Product]) -> Intent {
    let lowered = question.trim().to_lowercase();
    if lowered.is_empty() {
        return Intent::None;
    }

    if contains_any(&lowered, &FULL_CATALOG_PHRASES) {
        return Intent::FullCatalog;
    }

    if contains_any(&lowered, &HIGHEST_PRICE_PHRASES) {
        return Intent::PriceExtreme {
            direction: PriceDirection::Highest,
        };
    }
    if contains_any(&lowered, &LOWEST_PRICE_PHRASES) {
        return Intent::PriceExtreme {
            direction: PriceDirection::Lowest,
        };
    }

    if contains_any(&lowered, &DETAIL_WORDS) {
        if let Some(product) = longest_named_match(&lowered, catalog) {
            return Intent::NamedProductDetail {
                product: Box::new(product.clone()),
            };
        }
    }

    let phrase = strip_trailing_punctuation(&lowered);
    if GREETING_PHRASES.contains(&phrase) {
        return Intent::Greeting;
    }
    if THANKS_PHRASES.contains(&phrase) {
        return Intent::Thanks;
    }
    if GENERIC_HELP_PHRASES.contains(&phrase) {
        return Intent::GenericHelp;
    }

    Intent::None
}

fn longest_named_match<'a>(lowered_question: &str, catalog: &'a [Product]) -> Option<&'a Product> {
    catalog
        .iter()
        .filter_map(|product| {
            let name = product.name.trim().to_lowercase();
            if !name.is_empty() && lowered_question.contains(&name) {
                Some((name.chars().count(), product))
            } else {
                None
            }
        })
        .fold(None, |best: Option<(usize, &Product)>, current| match best {
            Some(existing) if existing.0 >= current.0 => Some(existing),
            _ => Some(current),
        })
        .map(|(_, product)| product)
}

pub(crate) fn strip_trailing_punctuation(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|ch: char| matches!(ch, '!' | '?' | '.' | ',' | '~'))
        .trim()
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
