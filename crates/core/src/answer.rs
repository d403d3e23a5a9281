//! Template answers built from catalog data alone.

use crate::intent::{contains_any, strip_trailing_punctuation, GREETING_PHRASES, THANKS_PHRASES};
use crate::{format_money, PriceDirection, Product};

pub const EMPTY_QUESTION_ANSWER: &str = "Ask me about products or pricing.";

pub const NO_MATCH_ANSWER: &str = "I could not find a close match. Try a category or budget, like \
\"headphones under $50\" or \"gift under $30\".";

pub const GREETING_ANSWER: &str = "Hi! I can help you find products, compare items, and suggest gifts. \
Try: \"gift under $50\" or \"cheaper than this\".";

pub const THANKS_ANSWER: &str =
    "You're welcome. Ask me about any product, price, model, or features.";

pub const CAPABILITIES_ANSWER: &str = "I can help you find products, compare items, suggest gifts, \
and recommend budget-friendly picks. Try asking: \"gift under $50\", \"cheaper than this\", or \"best for travel\".";

pub const NO_LAPTOPS_ANSWER: &str = "We do not have laptops in the catalog yet. \
Here are the closest electronics picks I can suggest.";

pub const GENERAL_UNAVAILABLE_ANSWER: &str = "Assistant is unavailable.";

pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.32;

const HELP_PHRASES: [&str; 6] = [
    "what can you do",
    "what u can do",
    "what u cn do",
    "help",
    "how do you work",
    "what do you do",
];

const LAPTOP_WORDS: [&str; 3] = ["laptop", "notebook", "macbook"];

/// Builds an answer from the ranked products, first matching rule wins.
///
/// `scores` runs parallel to `products`; only the top score is read, for the
/// low-confidence rule.
pub fn build(question: &str, products: &[Product], scores: &[f64]) -> String {
    if products.is_empty() {
        return NO_MATCH_ANSWER.to_string();
    }

    let lowered = question.trim().to_lowercase();
    let phrase = strip_trailing_punctuation(&lowered);
    let top_score = scores.first().copied().unwrap_or(0.0);

    if GREETING_PHRASES.contains(&phrase) {
        return GREETING_ANSWER.to_string();
    }
    if THANKS_PHRASES.contains(&phrase) {
        return THANKS_ANSWER.to_string();
    }
    if contains_any(&lowered, &HELP_PHRASES) {
        return CAPABILITIES_ANSWER.to_string();
    }
    if contains_any(&lowered, &LAPTOP_WORDS) {
        return NO_LAPTOPS_ANSWER.to_string();
    }

    if top_score < LOW_CONFIDENCE_THRESHOLD {
        return format!(
            "I do not see a close match. Closest items: {}. Want a different budget or category?",
            priced_list(&products[..products.len().min(3)])
        );
    }

    if lowered.contains("difference") && products.len() >= 2 {
        return comparison(&products[0], &products[1]);
    }

    if lowered.contains("cheaper") {
        let cheapest = products
            .iter()
            .skip(1)
            .fold(&products[0], |best, product| {
                if product.price_or_zero() < best.price_or_zero() {
                    product
                } else {
                    best
                }
            });
        return format!(
            "The most budget-friendly option I found is {} at {}.",
            cheapest.display_name(),
            format_money(Some(cheapest.price_or_zero()))
        );
    }

    if lowered.contains("gift") {
        let top_rated = products
            .iter()
            .skip(1)
            .fold(&products[0], |best, product| {
                if product.rating_or_zero() > best.rating_or_zero() {
                    product
                } else {
                    best
                }
            });
        return format!(
            "For gifting, {} stands out with a rating of {}. It is a safe pick.",
            top_rated.display_name(),
            rating_label(top_rated)
        );
    }

    format!(
        "Here are good options from the catalog: {}. Want me to narrow it by budget, color, or use?",
        priced_list(&products[..products.len().min(4)])
    )
}

/// Header plus one line each for price, category and stock of the top two.
pub fn comparison(first: &Product, second: &Product) -> String {
    [
        format!(
            "Here is a quick comparison between {} and {}:",
            first.display_name(),
            second.display_name()
        ),
        format!(
            "- Price: {} vs {}",
            first.formatted_price(),
            second.formatted_price()
        ),
        format!(
            "- Category: {} vs {}",
            first.display_category(),
            second.display_category()
        ),
        format!(
            "- Stock: {} vs {}",
            first.stock_or_zero(),
            second.stock_or_zero()
        ),
    ]
    .join("\n")
}

pub fn full_catalog(products: &[Product]) -> String {
    if products.is_empty() {
        return "The catalog is empty right now. Please check back soon.".to_string();
    }

    let mut lines = vec![format!(
        "Here is the full product list ({} items):",
        products.len()
    )];
    lines.extend(products.iter().enumerate().map(|(index, product)| {
        format!(
            "{}. {} - {} ({})",
            index + 1,
            product.display_name(),
            product.formatted_price(),
            product.display_category()
        )
    }));
    lines.join("\n")
}

pub fn price_extreme(direction: PriceDirection, products: &[Product]) -> String {
    let Some(extreme) = products.first() else {
        return "I could not find any priced products in the catalog yet.".to_string();
    };

    let (label, others) = match direction {
        PriceDirection::Highest => ("most expensive", "Other premium picks"),
        PriceDirection::Lowest => ("cheapest", "Other budget picks"),
    };
    let mut answer = format!(
        "The {label} product in the catalog is {} at {}.",
        extreme.display_name(),
        extreme.formatted_price()
    );

    let runners_up = &products[1..products.len().min(3)];
    if !runners_up.is_empty() {
        answer.push_str(&format!(" {others}: {}.", priced_list(runners_up)));
    }
    answer
}

/// Full product card for a named-product question.
pub fn product_detail(product: &Product) -> String {
    let mut lines = vec![format!("Here are the details for {}:", product.display_name())];
    lines.push(format!(
        "- Model/SKU: {}",
        product
            .model
            .as_deref()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or("N/A")
    ));
    lines.push(format!("- Price: {}", product.formatted_price()));
    lines.push(format!("- Category: {}", product.display_category()));
    lines.push(format!(
        "- Stock: {} ({})",
        product.stock_or_zero(),
        if product.is_in_stock() {
            "in stock"
        } else {
            "out of stock"
        }
    ));
    lines.push(format!(
        "- Rating: {} ({} reviews)",
        rating_label(product),
        product.review_count.unwrap_or(0)
    ));
    if !product.highlights.is_empty() {
        lines.push(format!("- Highlights: {}", product.highlights.join(", ")));
    }
    if !product.colors.is_empty() {
        lines.push(format!("- Colors: {}", product.colors.join(", ")));
    }
    if !product.description.trim().is_empty() {
        lines.push(format!("- Description: {}", product.description.trim()));
    }
    lines.join("\n")
}

fn priced_list(products: &[Product]) -> String {
    products
        .iter()
        .map(|product| format!("{} ({})", product.display_name(), product.formatted_price()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn rating_label(product: &Product) -> String {
    match product.rating {
        Some(rating) if rating.is_finite() => format!("{rating:.1}"),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: Option<f64>, rating: Option<f64>) -> Product {
        Product {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            category: "Accessories".to_string(),
            price,
            rating,
            stock: Some(4),
            ..Product::default()
        }
    }

    fn shelf() -> Vec<Product> {
        vec![
            product("Leather Belt", Some(25.0), Some(4.1)),
            product("Canvas Tote", None, Some(4.8)),
            product("Silk Scarf", Some(40.0), None),
            product("Wool Beanie", Some(15.0), Some(4.8)),
            product("Card Wallet", Some(30.0), Some(3.9)),
        ]
    }

    #[test]
    fn no_products_suggests_category_or_budget() {
        assert_eq!(build("anything", &[], &[]), NO_MATCH_ANSWER);
    }

    #[test]
    fn pleasantries_and_help_use_fixed_replies() {
        let products = shelf();
        let scores = [0.9];
        assert_eq!(build("Hey!", &products, &scores), GREETING_ANSWER);
        assert_eq!(build("thanks", &products, &scores), THANKS_ANSWER);
        assert_eq!(build("can you help me pick", &products, &scores), CAPABILITIES_ANSWER);
        assert_eq!(build("best macbook sleeve", &products, &scores), NO_LAPTOPS_ANSWER);
    }

    #[test]
    fn low_confidence_lists_three_closest() {
        let answer = build("something shiny", &shelf(), &[0.31]);
        assert!(answer.starts_with("I do not see a close match."));
        assert!(answer.contains("Leather Belt ($25.00), Canvas Tote ($0.00), Silk Scarf ($40.00)"));
        assert!(!answer.contains("Wool Beanie"));
    }

    #[test]
    fn difference_compares_price_category_stock_in_order() {
        let answer = build("what is the difference between them", &shelf(), &[0.8, 0.7]);
        let lines: Vec<&str> = answer.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Here is a quick comparison between Leather Belt and Canvas Tote:");
        assert_eq!(lines[1], "- Price: $25.00 vs $0.00");
        assert_eq!(lines[2], "- Category: Accessories vs Accessories");
        assert_eq!(lines[3], "- Stock: 4 vs 4");
    }

    #[test]
    fn cheaper_treats_missing_price_as_zero() {
        let answer = build("anything cheaper?", &shelf(), &[0.8]);
        assert_eq!(answer, "The most budget-friendly option I found is Canvas Tote at $0.00.");
    }

    #[test]
    fn gift_picks_first_highest_rating() {
        let answer = build("gift for my sister", &shelf(), &[0.8]);
        assert_eq!(
            answer,
            "For gifting, Canvas Tote stands out with a rating of 4.8. It is a safe pick."
        );
    }

    #[test]
    fn default_lists_four_with_prices() {
        let answer = build("accessories for work", &shelf(), &[0.8]);
        assert!(answer.starts_with("Here are good options from the catalog:"));
        assert!(answer.contains("Wool Beanie ($15.00)"));
        assert!(!answer.contains("Card Wallet"));
    }

    #[test]
    fn full_catalog_names_every_product_once() {
        let products = shelf();
        let answer = full_catalog(&products);
        for product in &products {
            assert_eq!(answer.matches(product.name.as_str()).count(), 1);
        }
        assert!(answer.starts_with("Here is the full product list (5 items):"));
    }

    #[test]
    fn price_extreme_states_name_and_price() {
        let sorted = vec![
            product("Wool Beanie", Some(5.0), None),
            product("Leather Belt", Some(10.0), None),
        ];
        let answer = price_extreme(PriceDirection::Lowest, &sorted);
        assert!(answer.starts_with("The cheapest product in the catalog is Wool Beanie at $5.00."));
        assert!(answer.contains("Leather Belt ($10.00)"));

        let answer = price_extreme(PriceDirection::Highest, &sorted[..1]);
        assert_eq!(answer, "The most expensive product in the catalog is Wool Beanie at $5.00.");
    }

    #[test]
    fn detail_card_degrades_missing_fields() {
        let bare = Product {
            id: "p-9".to_string(),
            name: "Mystery Box".to_string(),
            ..Product::default()
        };
        let card = product_detail(&bare);
        assert!(card.contains("- Model/SKU: N/A"));
        assert!(card.contains("- Price: $0.00"));
        assert!(card.contains("- Category: N/A"));
        assert!(card.contains("- Stock: 0 (out of stock)"));
        assert!(card.contains("- Rating: N/A (0 reviews)"));
        assert!(!card.contains("Highlights"));
    }
}
