use crate::intent::contains_any;
use crate::providers::ProviderKind;
use crate::Product;

pub const REFUSAL_PHRASES: [&str; 10] = [
    "can't assist",
    "cannot assist",
    "can't help",
    "cannot help",
    "i'm sorry, but",
    "i cannot",
    "i can't",
    "as an ai",
    "as a language model",
    "unable to",
];

pub const GENERIC_PHRASES: [&str; 5] = [
    "how can i help",
    "happy to help",
    "feel free to ask",
    "i can assist",
    "let me know if you have any questions",
];

pub const MIN_SPECIFIC_CHARS: usize = 25;
pub const GROUNDING_WINDOW: usize = 5;

/// Decides whether generated text may be shown instead of the template answer.
///
/// Empty and refusal answers are always rejected. The generic-text and
/// product-mention checks apply only to the local model.
pub fn accept(answer: &str, products: &[Product], provider: ProviderKind) -> bool {
    if answer.trim().is_empty() || looks_like_refusal(answer) {
        return false;
    }
    if provider.requires_grounding_checks()
        && (looks_generic(answer) || !mentions_product(answer, products))
    {
        return false;
    }
    true
}

pub fn looks_like_refusal(answer: &str) -> bool {
    contains_any(&answer.to_lowercase(), &REFUSAL_PHRASES)
}

pub fn looks_generic(answer: &str) -> bool {
    let lowered = answer.trim().to_lowercase();
    lowered.chars().count() < MIN_SPECIFIC_CHARS || contains_any(&lowered, &GENERIC_PHRASES)
}

/// True when one of the top candidates is named literally, or when there is
/// nothing to ground against.
pub fn mentions_product(answer: &str, products: &[Product]) -> bool {
    if products.is_empty() {
        return true;
    }
    let lowered = answer.to_lowercase();
    products.iter().take(GROUNDING_WINDOW).any(|product| {
        let name = product.name.trim().to_lowercase();
        !name.is_empty() && lowered.contains(&name)
    })
}
