use crate::Product;

pub const PROMPT_PRODUCT_LIMIT: usize = 6;

pub const SHOPPING_SYSTEM_PROMPT: &str = "You are an ecommerce shopping assistant. Use ONLY the provided product list. \
If the request is unclear, ask one short clarifying question. \
When possible, mention 1-2 product names with prices. \
Be friendly, concise, and end with a short question.";

pub const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Answer the user's question directly and clearly. \
If you are unsure, say so briefly.";

/// User prompt for a grounded shopping answer over at most six products.
pub fn chat_prompt(question: &str, products: &[Product]) -> String {
    let lines: Vec<String> = products
        .iter()
        .take(PROMPT_PRODUCT_LIMIT)
        .enumerate()
        .map(|(index, product)| {
            let highlights = product
                .highlights
                .iter()
                .take(3)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let rating = product
                .rating
                .map(|rating| format!("{rating:.1}"))
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "{}. {} | {} | {} | rating {} | stock {} | highlights: {}",
                index + 1,
                product.display_name(),
                product.formatted_price(),
                product.display_category(),
                rating,
                product.stock_or_zero(),
                highlights
            )
        })
        .collect();

    let context = if lines.is_empty() {
        "No products found.".to_string()
    } else {
        lines.join("\n")
    };

    format!(
        "{SHOPPING_SYSTEM_PROMPT}\n\nCustomer question: {question}\n\nProducts:\n{context}\n\nRespond in 2-4 sentences."
    )
}

pub fn general_prompt(question: &str) -> String {
    format!(
        "You are a helpful, concise assistant. Answer the user's question directly. \
If you are unsure, say so briefly.\n\nUser: {question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_at_most_six_products() {
        let products: Vec<Product> = (1..=8)
            .map(|index| Product {
                id: format!("p-{index}"),
                name: format!("Item {index}"),
                price: Some(index as f64),
                ..Product::default()
            })
            .collect();

        let prompt = chat_prompt("gift ideas", &products);
        assert!(prompt.contains("Customer question: gift ideas"));
        assert!(prompt.contains("6. Item 6 | $6.00 | N/A | rating N/A | stock 0 | highlights: "));
        assert!(!prompt.contains("Item 7"));
        assert!(prompt.ends_with("Respond in 2-4 sentences."));
    }

    #[test]
    fn empty_product_list_is_stated() {
        let prompt = chat_prompt("anything", &[]);
        assert!(prompt.contains("Products:\nNo products found."));
    }

    #[test]
    fn highlights_are_capped_at_three() {
        let product = Product {
            id: "p-1".to_string(),
            name: "Trail Boot".to_string(),
            rating: Some(4.5),
            highlights: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ..Product::default()
        };
        let prompt = chat_prompt("boots", &[product]);
        assert!(prompt.contains("rating 4.5 | stock 0 | highlights: a, b, c\n"));
    }
}
